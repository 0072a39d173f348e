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

//! Per-distinct, per-condition read counts.
//!
//! A [CountTable] stores its counts either densely (one array per distinct
//! sequence) or sparsely (ascending condition indices with their nonzero
//! counts). Both answer [count](CountTable::count) identically and compare
//! equal when their logical contents are equal; the storage itself is never
//! exposed. The third, supersparse, layout only exists in the codec.

pub mod mode;

use crate::error::ReadsError;
use crate::error::Result;

use std::hash::Hash;
use std::hash::Hasher;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SparseRow {
    pub(crate) indices: Vec<u32>,
    pub(crate) values: Vec<u32>,
}

impl SparseRow {
    fn get(&self, condition: u32) -> u32 {
        match self.indices.binary_search(&condition) {
            Ok(pos) => self.values[pos],
            Err(_) => 0,
        }
    }

    fn check_order(&self, condition: u32) -> Result<()> {
        match self.indices.last() {
            Some(last) if *last > condition => Err(ReadsError::sequencing(format!(
                "sparse counts must be written in condition order, got {} after {}", condition, last,
            ))),
            _ => Ok(()),
        }
    }

    // Linear merge-join summing counts of coincident conditions.
    fn merge(&self, other: &SparseRow) -> SparseRow {
        let mut merged = SparseRow {
            indices: Vec::with_capacity(self.indices.len() + other.indices.len()),
            values: Vec::with_capacity(self.values.len() + other.values.len()),
        };
        let (mut i, mut j) = (0, 0);
        while i < self.indices.len() || j < other.indices.len() {
            let left = self.indices.get(i).copied().unwrap_or(u32::MAX);
            let right = other.indices.get(j).copied().unwrap_or(u32::MAX);
            if left == right {
                merged.indices.push(left);
                merged.values.push(self.values[i] + other.values[j]);
                i += 1;
                j += 1;
            } else if left < right {
                merged.indices.push(left);
                merged.values.push(self.values[i]);
                i += 1;
            } else {
                merged.indices.push(right);
                merged.values.push(other.values[j]);
                j += 1;
            }
        }
        merged
    }
}

/// Counts of a single distinct sequence while it is being built.
#[derive(Clone, Debug)]
pub(crate) enum CountRow {
    Dense(Vec<u32>),
    Sparse(SparseRow),
}

impl CountRow {
    pub(crate) fn new(num_conditions: usize, sparse: bool) -> Self {
        if sparse {
            CountRow::Sparse(SparseRow::default())
        } else {
            CountRow::Dense(vec![0; num_conditions])
        }
    }

    pub(crate) fn get(&self, condition: u32) -> u32 {
        match self {
            CountRow::Dense(counts) => counts.get(condition as usize).copied().unwrap_or(0),
            CountRow::Sparse(row) => row.get(condition),
        }
    }

    /// Overwrites the count of `condition`.
    pub(crate) fn set(&mut self, condition: u32, count: u32) -> Result<()> {
        match self {
            CountRow::Dense(counts) => counts[condition as usize] = count,
            CountRow::Sparse(row) => {
                row.check_order(condition)?;
                if row.indices.last() == Some(&condition) {
                    let last = row.values.len() - 1;
                    if count == 0 {
                        row.indices.pop();
                        row.values.pop();
                    } else {
                        row.values[last] = count;
                    }
                } else if count > 0 {
                    row.indices.push(condition);
                    row.values.push(count);
                }
            },
        }
        Ok(())
    }

    pub(crate) fn increment(&mut self, condition: u32, count: u32) -> Result<()> {
        if let CountRow::Sparse(row) = self {
            row.check_order(condition)?;
        }
        let current = self.get(condition);
        self.set(condition, current + count)
    }

    pub(crate) fn merge(&mut self, other: &CountRow) {
        match (&mut *self, other) {
            (CountRow::Dense(left), CountRow::Dense(right)) => {
                left.iter_mut().zip(right.iter()).for_each(|(x, y)| *x += *y);
            },
            (CountRow::Sparse(left), CountRow::Sparse(right)) => {
                *left = left.merge(right);
            },
            (CountRow::Dense(left), CountRow::Sparse(right)) => {
                right.indices.iter().zip(right.values.iter()).for_each(|(c, x)| left[*c as usize] += *x);
            },
            (CountRow::Sparse(left), CountRow::Dense(right)) => {
                let right = SparseRow::from_dense(right);
                *left = left.merge(&right);
            },
        }
    }

    /// `(condition, count)` of the nonzero counts, ascending.
    pub(crate) fn nonzero(&self) -> Vec<(u32, u32)> {
        match self {
            CountRow::Dense(counts) => {
                counts.iter().enumerate().filter(|(_, x)| **x > 0).map(|(c, x)| (c as u32, *x)).collect()
            },
            CountRow::Sparse(row) => row.indices.iter().copied().zip(row.values.iter().copied()).collect(),
        }
    }

    pub(crate) fn total(&self) -> u64 {
        match self {
            CountRow::Dense(counts) => counts.iter().map(|x| *x as u64).sum(),
            CountRow::Sparse(row) => row.values.iter().map(|x| *x as u64).sum(),
        }
    }
}

impl SparseRow {
    fn from_dense(counts: &[u32]) -> SparseRow {
        let mut row = SparseRow::default();
        counts.iter().enumerate().filter(|(_, x)| **x > 0).for_each(|(c, x)| {
            row.indices.push(c as u32);
            row.values.push(*x);
        });
        row
    }
}

#[derive(Clone, Debug)]
enum CountStorage {
    Dense(Vec<Vec<u32>>),
    Sparse(Vec<SparseRow>),
}

/// Counts of every distinct sequence in a record.
#[derive(Clone, Debug)]
pub struct CountTable {
    num_conditions: usize,
    storage: CountStorage,
}

impl CountTable {
    /// Dense table, one row of `num_conditions` counts per distinct sequence.
    pub fn dense(num_conditions: usize, rows: Vec<Vec<u32>>) -> Result<Self> {
        if let Some(row) = rows.iter().find(|row| row.len() != num_conditions) {
            return Err(ReadsError::consistency(format!(
                "count row has {} conditions, expected {}", row.len(), num_conditions,
            )));
        }
        Ok(CountTable { num_conditions, storage: CountStorage::Dense(rows) })
    }

    /// Sparse table from `(condition, count)` pairs per distinct sequence.
    ///
    /// Conditions must be strictly increasing. Zero counts are dropped.
    pub fn sparse(num_conditions: usize, rows: Vec<Vec<(u32, u32)>>) -> Result<Self> {
        let mut sparse_rows: Vec<SparseRow> = Vec::with_capacity(rows.len());
        for row in rows {
            if row.windows(2).any(|x| x[0].0 >= x[1].0) {
                return Err(ReadsError::consistency("sparse condition indices must be strictly increasing"));
            }
            if let Some((condition, _)) = row.iter().find(|(c, _)| *c as usize >= num_conditions) {
                return Err(ReadsError::consistency(format!(
                    "condition {} out of range for {} conditions", condition, num_conditions,
                )));
            }
            let mut sparse_row = SparseRow::default();
            row.into_iter().filter(|(_, x)| *x > 0).for_each(|(c, x)| {
                sparse_row.indices.push(c);
                sparse_row.values.push(x);
            });
            sparse_rows.push(sparse_row);
        }
        Ok(CountTable { num_conditions, storage: CountStorage::Sparse(sparse_rows) })
    }

    pub(crate) fn from_rows(num_conditions: usize, rows: Vec<CountRow>) -> Self {
        let all_sparse = rows.iter().all(|row| matches!(row, CountRow::Sparse(_)));
        let storage = if all_sparse && !rows.is_empty() {
            CountStorage::Sparse(rows.into_iter().map(|row| match row {
                CountRow::Sparse(row) => row,
                CountRow::Dense(counts) => SparseRow::from_dense(&counts),
            }).collect())
        } else {
            CountStorage::Dense(rows.into_iter().map(|row| match row {
                CountRow::Dense(counts) => counts,
                CountRow::Sparse(row) => {
                    let mut counts = vec![0; num_conditions];
                    row.indices.iter().zip(row.values.iter()).for_each(|(c, x)| counts[*c as usize] = *x);
                    counts
                },
            }).collect())
        };
        CountTable { num_conditions, storage }
    }

    pub(crate) fn row(&self, distinct: usize) -> CountRow {
        match &self.storage {
            CountStorage::Dense(rows) => CountRow::Dense(rows[distinct].clone()),
            CountStorage::Sparse(rows) => CountRow::Sparse(rows[distinct].clone()),
        }
    }

    pub fn num_distinct(&self) -> usize {
        match &self.storage {
            CountStorage::Dense(rows) => rows.len(),
            CountStorage::Sparse(rows) => rows.len(),
        }
    }

    pub fn num_conditions(&self) -> usize {
        self.num_conditions
    }

    pub fn count(&self, distinct: usize, condition: usize) -> u32 {
        match &self.storage {
            CountStorage::Dense(rows) => rows[distinct][condition],
            CountStorage::Sparse(rows) => rows[distinct].get(condition as u32),
        }
    }

    /// True if the table knows its nonzero entries without scanning.
    pub fn has_nonzero_information(&self) -> bool {
        matches!(self.storage, CountStorage::Sparse(_))
    }

    /// `(condition, count)` of every nonzero count of `distinct`, ascending.
    pub fn nonzero_counts(&self, distinct: usize) -> Vec<(usize, u32)> {
        match &self.storage {
            CountStorage::Dense(rows) => {
                rows[distinct].iter().enumerate().filter(|(_, x)| **x > 0).map(|(c, x)| (c, *x)).collect()
            },
            CountStorage::Sparse(rows) => {
                rows[distinct].indices.iter().zip(rows[distinct].values.iter()).map(|(c, x)| (*c as usize, *x)).collect()
            },
        }
    }

    pub fn counts(&self, distinct: usize) -> Vec<u32> {
        let mut counts = vec![0; self.num_conditions];
        self.nonzero_counts(distinct).into_iter().for_each(|(c, x)| counts[c] = x);
        counts
    }
}

impl PartialEq for CountTable {
    fn eq(&self, other: &Self) -> bool {
        self.num_conditions == other.num_conditions
            && self.num_distinct() == other.num_distinct()
            && (0..self.num_distinct()).all(|d| self.nonzero_counts(d) == other.nonzero_counts(d))
    }
}

impl Eq for CountTable {}

impl Hash for CountTable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.num_conditions.hash(state);
        for d in 0..self.num_distinct() {
            self.nonzero_counts(d).hash(state);
        }
    }
}
