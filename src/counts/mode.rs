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

//! How raw counts turn into the numbers downstream consumers see.
//!
//! ## Usage
//!
//! ```rust
//! use alnreads::counts::mode::ReadCountMode;
//!
//! // 4 reads with 2 equally good placements
//! assert_eq!(ReadCountMode::DIVIDE.apply(4, 2, 0.5), 2.0);
//! assert_eq!(ReadCountMode::UNIQUE.apply(4, 2, 0.5), 0.0);
//!
//! // Halve the weighted count, then take the square root
//! let mode = ReadCountMode::WEIGHT.scaled(0.5).transformed(f64::sqrt);
//! assert_eq!(mode.apply(8, 2, 1.0), 2.0);
//! ```

use std::fmt;
use std::sync::Arc;

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CountBase {
    /// Raw count.
    #[default]
    All,
    /// Count times the weight.
    Weight,
    /// Count divided by the multiplicity.
    Divide,
    /// Count if the read maps uniquely, else 0.
    Unique,
    /// 1 if there is any read.
    CollapseAll,
    /// 1 if there is any uniquely mapping read.
    CollapseUnique,
}

impl std::str::FromStr for CountBase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(CountBase::All),
            "weight" => Ok(CountBase::Weight),
            "divide" => Ok(CountBase::Divide),
            "unique" => Ok(CountBase::Unique),
            "collapse-all" => Ok(CountBase::CollapseAll),
            "collapse-unique" => Ok(CountBase::CollapseUnique),
            _ => Err(format!("'{}' is not a valid CountBase", s)),
        }
    }
}

#[derive(Clone)]
enum Step {
    Scale(f64),
    Map(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

/// A [CountBase] followed by any number of rescalings and transforms.
#[derive(Clone)]
pub struct ReadCountMode {
    base: CountBase,
    steps: Vec<Step>,
}

impl ReadCountMode {
    pub const ALL: ReadCountMode = ReadCountMode::new(CountBase::All);
    pub const WEIGHT: ReadCountMode = ReadCountMode::new(CountBase::Weight);
    pub const DIVIDE: ReadCountMode = ReadCountMode::new(CountBase::Divide);
    pub const UNIQUE: ReadCountMode = ReadCountMode::new(CountBase::Unique);
    pub const COLLAPSE_ALL: ReadCountMode = ReadCountMode::new(CountBase::CollapseAll);
    pub const COLLAPSE_UNIQUE: ReadCountMode = ReadCountMode::new(CountBase::CollapseUnique);

    pub const fn new(base: CountBase) -> Self {
        ReadCountMode { base, steps: Vec::new() }
    }

    pub fn base(&self) -> CountBase {
        self.base
    }

    /// Multiplies every value by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        let mut mode = self.clone();
        mode.steps.push(Step::Scale(factor));
        mode
    }

    /// Applies `f` to every value.
    pub fn transformed<F>(&self, f: F) -> Self
    where F: Fn(f64) -> f64 + Send + Sync + 'static {
        let mut mode = self.clone();
        mode.steps.push(Step::Map(Arc::new(f)));
        mode
    }

    /// Value of a single count. A multiplicity of 0 (unknown) counts as 1.
    pub fn apply(&self, count: u32, multiplicity: u32, weight: f32) -> f64 {
        let unique = multiplicity <= 1;
        let count_f = count as f64;
        let mut value = match self.base {
            CountBase::All => count_f,
            CountBase::Weight => count_f * weight as f64,
            CountBase::Divide => count_f / multiplicity.max(1) as f64,
            CountBase::Unique => if unique { count_f } else { 0.0 },
            CountBase::CollapseAll => if count > 0 { 1.0 } else { 0.0 },
            CountBase::CollapseUnique => if count > 0 && unique { 1.0 } else { 0.0 },
        };
        for step in self.steps.iter() {
            value = match step {
                Step::Scale(factor) => value * factor,
                Step::Map(f) => f(value),
            };
        }
        value
    }
}

impl Default for ReadCountMode {
    fn default() -> Self {
        ReadCountMode::ALL
    }
}

impl From<CountBase> for ReadCountMode {
    fn from(base: CountBase) -> Self {
        ReadCountMode::new(base)
    }
}

impl fmt::Debug for ReadCountMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let steps: Vec<String> = self.steps.iter().map(|step| match step {
            Step::Scale(factor) => format!("x{}", factor),
            Step::Map(_) => "fn".to_string(),
        }).collect();
        f.debug_struct("ReadCountMode").field("base", &self.base).field("steps", &steps).finish()
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn bases() {
        use super::ReadCountMode;

        assert_eq!(ReadCountMode::ALL.apply(6, 3, 0.25), 6.0);
        assert_eq!(ReadCountMode::WEIGHT.apply(6, 3, 0.25), 1.5);
        assert_eq!(ReadCountMode::DIVIDE.apply(6, 3, 0.25), 2.0);
        assert_eq!(ReadCountMode::DIVIDE.apply(6, 0, 0.25), 6.0);
        assert_eq!(ReadCountMode::UNIQUE.apply(6, 3, 0.25), 0.0);
        assert_eq!(ReadCountMode::UNIQUE.apply(6, 1, 0.25), 6.0);
        assert_eq!(ReadCountMode::COLLAPSE_ALL.apply(6, 3, 0.25), 1.0);
        assert_eq!(ReadCountMode::COLLAPSE_ALL.apply(0, 3, 0.25), 0.0);
        assert_eq!(ReadCountMode::COLLAPSE_UNIQUE.apply(6, 3, 0.25), 0.0);
        assert_eq!(ReadCountMode::COLLAPSE_UNIQUE.apply(6, 0, 0.25), 1.0);
    }

    #[test]
    fn steps_apply_in_order() {
        use super::ReadCountMode;

        let scale_then_add = ReadCountMode::ALL.scaled(2.0).transformed(|x| x + 1.0);
        let add_then_scale = ReadCountMode::ALL.transformed(|x| x + 1.0).scaled(2.0);
        assert_eq!(scale_then_add.apply(3, 1, 1.0), 7.0);
        assert_eq!(add_then_scale.apply(3, 1, 1.0), 8.0);
    }

    #[test]
    fn from_str() {
        use super::CountBase;

        assert_eq!("collapse-unique".parse::<CountBase>().unwrap(), CountBase::CollapseUnique);
        assert!("most".parse::<CountBase>().is_err());
    }
}
