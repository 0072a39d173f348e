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

//! Read-only access to aligned read records.
//!
//! [ReadsAccess] is implemented by [AlignedReads](crate::record::AlignedReads)
//! and by every view in [views](crate::views), so consumers, the codec and the
//! builder's reconstruction interface never need to know which one they hold.
//! What a record can do beyond the common accessors is described by its
//! [Capabilities].
//!
//! Distinct sequences are stable within one record but consumers must not
//! assume any other ordering.

use crate::barcode::Barcode;
use crate::counts::mode::ReadCountMode;
use crate::geometry::Geometry;
use crate::subreads::Subreads;
use crate::variation::Variation;
use crate::variation::VariationType;

use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

/// Optional features of a record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// Barcodes are stored for every (distinct, condition) pair.
    pub barcodes: bool,
    /// Every distinct sequence carries a subread structure.
    pub subreads: bool,
    /// Counts are presence bits.
    pub digital: bool,
    /// The record wraps another record.
    pub view: bool,
}

pub trait ReadsAccess: Send + Sync + fmt::Debug {
    fn num_distinct(&self) -> usize;

    fn num_conditions(&self) -> usize;

    fn count(&self, distinct: usize, condition: usize) -> u32;

    /// Sorted, duplicate-free variations of `distinct`.
    fn variations(&self, distinct: usize) -> Cow<'_, [Variation]>;

    /// Number of equally good placements, 0 if unknown.
    fn multiplicity(&self, distinct: usize) -> u32;

    fn id(&self, distinct: usize) -> Option<u32>;

    /// Weight as stored, None if the record carries no weights.
    fn stored_weight(&self, distinct: usize) -> Option<f32>;

    fn geometry(&self, distinct: usize) -> Option<Geometry>;

    fn capabilities(&self) -> Capabilities;

    /// Barcodes observed for `(distinct, condition)`, one per unit of count.
    fn barcodes(&self, _distinct: usize, _condition: usize) -> Option<Cow<'_, [Barcode]>> {
        None
    }

    fn subreads(&self, _distinct: usize) -> Option<Cow<'_, Subreads>> {
        None
    }

    /// Weight of `distinct`, `1 / multiplicity` if none is stored.
    ///
    /// The default splits a read evenly over its placements, so it is 1 for
    /// reads with a multiplicity of 0 (unknown) or 1, and smaller only for
    /// reads that map to several locations. Use
    /// [stored_weight](ReadsAccess::stored_weight) to tell a stored weight
    /// from the default.
    fn weight(&self, distinct: usize) -> f32 {
        self.stored_weight(distinct)
            .unwrap_or_else(|| 1.0 / self.multiplicity(distinct).max(1) as f32)
    }

    fn has_ids(&self) -> bool {
        self.num_distinct() > 0 && self.id(0).is_some()
    }

    fn has_weights(&self) -> bool {
        self.num_distinct() > 0 && self.stored_weight(0).is_some()
    }

    fn has_geometry(&self) -> bool {
        self.num_distinct() > 0 && self.geometry(0).is_some()
    }

    /// True if [nonzero_counts](ReadsAccess::nonzero_counts) does not scan.
    fn has_nonzero_information(&self) -> bool {
        false
    }

    /// `(condition, count)` of the nonzero counts of `distinct`, ascending.
    fn nonzero_counts(&self, distinct: usize) -> Vec<(usize, u32)> {
        (0..self.num_conditions())
            .map(|c| (c, self.count(distinct, c)))
            .filter(|(_, x)| *x > 0)
            .collect()
    }

    /// Length of the read realization of `distinct` on a region of `mapped_length`.
    fn read_length(&self, distinct: usize, mapped_length: u32) -> u32 {
        let mut length = mapped_length as i64;
        for var in self.variations(distinct).iter() {
            match var.variation_type() {
                VariationType::Deletion => length -= var.genomic_length() as i64,
                VariationType::Insertion | VariationType::Softclip => {
                    length += var.read_sequence().len() as i64
                },
                VariationType::Mismatch => (),
            }
        }
        length.max(0) as u32
    }

    /// Counts of `distinct` under `mode`, one per condition.
    fn distinct_counts(&self, distinct: usize, mode: &ReadCountMode) -> Vec<f64> {
        let multiplicity = self.multiplicity(distinct);
        let weight = self.weight(distinct);
        (0..self.num_conditions()).map(|c| mode.apply(self.count(distinct, c), multiplicity, weight)).collect()
    }

    fn distinct_total(&self, distinct: usize, mode: &ReadCountMode) -> f64 {
        self.distinct_counts(distinct, mode).iter().sum()
    }

    fn condition_total(&self, condition: usize, mode: &ReadCountMode) -> f64 {
        (0..self.num_distinct())
            .map(|d| mode.apply(self.count(d, condition), self.multiplicity(d), self.weight(d)))
            .sum()
    }

    /// Per condition totals under `mode`.
    fn condition_totals(&self, mode: &ReadCountMode) -> Vec<f64> {
        (0..self.num_conditions()).map(|c| self.condition_total(c, mode)).collect()
    }

    fn total(&self, mode: &ReadCountMode) -> f64 {
        (0..self.num_distinct()).map(|d| self.distinct_total(d, mode)).sum()
    }
}

/// True if `a` and `b` hold the same logical content.
///
/// Storage layouts, record kinds and views are not compared, only what the
/// accessors return.
pub fn same_content(a: &dyn ReadsAccess, b: &dyn ReadsAccess) -> bool {
    if a.num_distinct() != b.num_distinct() || a.num_conditions() != b.num_conditions() {
        return false
    }
    let with_barcodes = a.capabilities().barcodes;
    if with_barcodes != b.capabilities().barcodes {
        return false
    }
    (0..a.num_distinct()).all(|d| {
        a.nonzero_counts(d) == b.nonzero_counts(d)
            && a.variations(d) == b.variations(d)
            && a.multiplicity(d) == b.multiplicity(d)
            && a.id(d) == b.id(d)
            && a.stored_weight(d).map(f32::to_bits) == b.stored_weight(d).map(f32::to_bits)
            && a.geometry(d) == b.geometry(d)
            && a.subreads(d) == b.subreads(d)
            && (!with_barcodes || (0..a.num_conditions()).all(|c| a.barcodes(d, c) == b.barcodes(d, c)))
    })
}

/// Hash of the logical content, consistent with [same_content].
pub fn content_hash(reads: &dyn ReadsAccess) -> u64 {
    let mut hasher = DefaultHasher::new();
    reads.num_conditions().hash(&mut hasher);
    reads.num_distinct().hash(&mut hasher);
    for d in 0..reads.num_distinct() {
        reads.nonzero_counts(d).hash(&mut hasher);
        reads.variations(d).hash(&mut hasher);
        reads.multiplicity(d).hash(&mut hasher);
        reads.id(d).hash(&mut hasher);
        reads.stored_weight(d).map(f32::to_bits).hash(&mut hasher);
        reads.geometry(d).hash(&mut hasher);
        reads.subreads(d).hash(&mut hasher);
    }
    hasher.finish()
}

/// Writes the debug text form, one line per distinct sequence.
///
/// Counts are written as `[c:n,...]` if the record knows its nonzero counts
/// and as `[n,n,...]` otherwise.
pub fn write_debug_text(reads: &dyn ReadsAccess, f: &mut fmt::Formatter) -> fmt::Result {
    let with_barcodes = reads.capabilities().barcodes;
    for d in 0..reads.num_distinct() {
        if d > 0 {
            writeln!(f)?;
        }
        if let Some(id) = reads.id(d) {
            write!(f, "{}: ", id)?;
        }
        if reads.has_nonzero_information() {
            let counts: Vec<String> = reads.nonzero_counts(d).iter().map(|(c, x)| format!("{}:{}", c, x)).collect();
            write!(f, "[{}]", counts.join(","))?;
        } else {
            let counts: Vec<String> = (0..reads.num_conditions()).map(|c| reads.count(d, c).to_string()).collect();
            write!(f, "[{}]", counts.join(","))?;
        }
        write!(f, " x{}", reads.multiplicity(d))?;
        if let Some(weight) = reads.stored_weight(d) {
            write!(f, " w={}", weight)?;
        }
        if let Some(geometry) = reads.geometry(d) {
            write!(f, " g={}", geometry)?;
        }
        if let Some(subreads) = reads.subreads(d) {
            write!(f, " {}", subreads)?;
        }
        if with_barcodes {
            let mut per_condition: Vec<String> = Vec::new();
            for (c, _) in reads.nonzero_counts(d) {
                if let Some(barcodes) = reads.barcodes(d, c) {
                    let barcodes: Vec<String> = barcodes.iter().map(|x| x.to_string()).collect();
                    per_condition.push(format!("{}:{}", c, barcodes.join(",")));
                }
            }
            write!(f, " bc={}", per_condition.join(";"))?;
        }
        for var in reads.variations(d).iter() {
            write!(f, " {}", var)?;
        }
    }
    Ok(())
}
