// alnreads: Compact multi-condition aligned read records and their codec.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//

/// Default number of conditions above which counts are stored sparsely.
pub const DEFAULT_SPARSE_THRESHOLD: usize = 5;

/// Decides whether counts of a dataset are stored densely or sparsely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SparsePolicy {
    /// Datasets with more conditions than this are sparse.
    pub threshold: usize,
}

impl SparsePolicy {
    pub fn new(threshold: usize) -> Self {
        SparsePolicy { threshold }
    }

    /// Never store counts sparsely.
    pub fn always_dense() -> Self {
        SparsePolicy { threshold: usize::MAX }
    }

    /// Always store counts sparsely.
    pub fn always_sparse() -> Self {
        SparsePolicy { threshold: 0 }
    }

    pub fn is_sparse(&self, num_conditions: usize) -> bool {
        num_conditions > self.threshold
    }
}

impl Default for SparsePolicy {
    fn default() -> Self {
        SparsePolicy { threshold: DEFAULT_SPARSE_THRESHOLD }
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn default_threshold() {
        use super::SparsePolicy;

        let policy = SparsePolicy::default();
        assert!(!policy.is_sparse(5));
        assert!(policy.is_sparse(6));
        assert!(SparsePolicy::always_sparse().is_sparse(1));
        assert!(!SparsePolicy::always_dense().is_sparse(1_000_000));
    }
}
