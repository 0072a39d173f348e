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

//! Subread structure of a distinct sequence.
//!
//! A read realization is split into consecutive subreads, each tagged with a
//! semantic id. Subread `i` ends at `end(i)`; the last subread always ends at
//! the read length, which is why only the inner ends are stored. Gap positions
//! mark induced positions not covered by any read.

use crate::error::ReadsError;
use crate::error::Result;

use std::fmt;

/// Conventional semantic id of a segment covered by the first read only.
pub const FIRST_READ: u8 = 0;
/// Conventional semantic id of a segment covered by both reads.
pub const OVERLAP: u8 = 1;
/// Conventional semantic id of a segment covered by the second read only.
pub const SECOND_READ: u8 = 2;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Subreads {
    ids: Vec<u8>,
    ends: Vec<u32>,
    gaps: Vec<u32>,
}

impl Subreads {
    /// `ends` holds the end offset of every subread except the last one.
    pub fn new(ids: Vec<u8>, ends: Vec<u32>, gaps: Vec<u32>) -> Result<Self> {
        if ids.is_empty() {
            return Err(ReadsError::consistency("subread structure without subreads"));
        }
        if ends.len() + 1 != ids.len() {
            return Err(ReadsError::consistency(format!(
                "{} subreads need {} end offsets, got {}", ids.len(), ids.len() - 1, ends.len(),
            )));
        }
        if ends.windows(2).any(|x| x[0] >= x[1]) || ends.first() == Some(&0) {
            return Err(ReadsError::consistency("subread ends must be positive and strictly increasing"));
        }
        if gaps.windows(2).any(|x| x[0] >= x[1]) {
            return Err(ReadsError::consistency("gap positions must be strictly increasing"));
        }
        Ok(Subreads { ids, ends, gaps })
    }

    pub fn num_subreads(&self) -> usize {
        self.ids.len()
    }

    pub fn id(&self, subread: usize) -> u8 {
        self.ids[subread]
    }

    pub fn ids(&self) -> &[u8] {
        &self.ids
    }

    /// Inner end offsets, one fewer than [num_subreads](Subreads::num_subreads).
    pub fn inner_ends(&self) -> &[u32] {
        &self.ends
    }

    /// End of `subread`; the last one ends at `read_length`.
    pub fn end(&self, subread: usize, read_length: u32) -> u32 {
        self.ends.get(subread).copied().unwrap_or(read_length)
    }

    pub fn gaps(&self) -> &[u32] {
        &self.gaps
    }

    /// Structure of the window `[start, end)`, re-induced to start at 0.
    ///
    /// Returns None if the window is empty.
    pub fn restrict(&self, start: u32, end: u32) -> Option<Subreads> {
        if start >= end {
            return None
        }
        let mut ids: Vec<u8> = Vec::new();
        let mut ends: Vec<u32> = Vec::new();
        let mut sub_start = 0_u32;
        for (idx, id) in self.ids.iter().enumerate() {
            let sub_end = self.end(idx, u32::MAX);
            if sub_end > start && sub_start < end {
                ids.push(*id);
                ends.push(sub_end.min(end) - start);
            }
            sub_start = sub_end;
        }
        // the last end is implicit
        ends.pop();

        let gaps: Vec<u32> = self.gaps.iter().filter(|x| **x >= start && **x < end).map(|x| *x - start).collect();
        Some(Subreads { ids, ends, gaps })
    }
}

impl fmt::Display for Subreads {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "sub=")?;
        for (idx, id) in self.ids.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", id)?;
            if let Some(end) = self.ends.get(idx) {
                write!(f, ":{}", end)?;
            }
        }
        if !self.gaps.is_empty() {
            let gaps: Vec<String> = self.gaps.iter().map(|x| x.to_string()).collect();
            write!(f, " gaps={}", gaps.join(","))?;
        }
        Ok(())
    }
}
