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

//! Trimming bases off the ends of the reads in a record.
//!
//! Each distinct sequence is cut on its own, so one record can turn into
//! several records on different sub-regions. The trimmers return a
//! [Trimmed] iterator that builds one record per retained sub-region when
//! it is advanced; trimming again starts over from the input record.
//!
//! Distinct sequences that are trimmed away entirely are left out, which may
//! leave nothing to iterate over.

pub mod paired;
pub mod single;

pub use paired::trim_paired;
pub use paired::PairedTrim;
pub use single::trim;

use crate::access::ReadsAccess;
use crate::builder::AlignedReadsBuilder;
use crate::error::Result;
use crate::geometry::Geometry;
use crate::region::ReadRegion;
use crate::record::AlignedReads;
use crate::variation::Variation;
use crate::variation::VariationType;

use indexmap::IndexMap;

/// Retained `[start, end)` of a read and whether either end was moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: u32,
    pub(crate) end: u32,
    pub(crate) cut_start: bool,
    pub(crate) cut_end: bool,
}

impl Span {
    /// `[start, end)` cut out of the untrimmed `original`.
    pub(crate) fn new(
        start: u32,
        end: u32,
        original: (u32, u32),
    ) -> Self {
        Span { start, end, cut_start: start != original.0, cut_end: end != original.1 }
    }

    /// A read that was trimmed away, ending up at `at`.
    pub(crate) fn empty(
        at: u32,
    ) -> Self {
        Span { start: at, end: at, cut_start: true, cut_end: true }
    }

    fn holds(
        &self,
        pos: u32,
    ) -> bool {
        self.start <= pos && pos < self.end
    }

    // An insertion on a moved boundary belongs to the removed bases.
    fn holds_insertion(
        &self,
        pos: u32,
    ) -> bool {
        let after_start = self.start < pos || (pos == self.start && !self.cut_start);
        let before_end = pos < self.end || (pos == self.end && !self.cut_end);
        after_start && before_end
    }
}

/// Retained part of one distinct sequence in the input's induced coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Cut {
    pub(crate) distinct: usize,
    // Union of the retained reads
    pub(crate) window: Span,
    // Retained mates if paired, variations of each mate must fall inside its own span
    pub(crate) first: Option<Span>,
    pub(crate) second: Option<Span>,
    pub(crate) geometry: Option<Geometry>,
}

impl Cut {
    // Variation of the retained window, None if it was cut off.
    fn rederive(
        &self,
        var: &Variation,
    ) -> Result<Option<Variation>> {
        if var.is_softclip() {
            return Ok(None)
        }
        let offset = self.window.start;
        let mate = if var.from_second_read() { self.second } else { self.first };
        let span = mate.unwrap_or(self.window);
        if var.is_deletion() {
            return match var.truncate_deletion(span.start, span.end) {
                Some(deletion) => Ok(Some(deletion.reposition(deletion.position() - offset)?)),
                None => Ok(None),
            }
        }
        let pos = var.position();
        let inside = match var.variation_type() {
            VariationType::Insertion => span.holds_insertion(pos),
            _ => span.holds(pos),
        };
        if inside {
            Ok(Some(var.reposition(pos - offset)?))
        } else {
            Ok(None)
        }
    }
}

/// Induced `[start, end)` of every deletion of `distinct`.
pub(crate) fn deletion_spans(
    reads: &dyn ReadsAccess,
    distinct: usize,
) -> Vec<(u32, u32)> {
    reads.variations(distinct).iter()
        .filter(|x| x.is_deletion())
        .map(|x| (x.position(), x.position() + x.genomic_length()))
        .collect()
}

/// Softclipped bases at the 5' and 3' ends of one read of `distinct`.
pub(crate) fn softclip_lengths(
    reads: &dyn ReadsAccess,
    distinct: usize,
    second_read: Option<bool>,
) -> (u32, u32) {
    let mut five_prime = 0_u32;
    let mut three_prime = 0_u32;
    for var in reads.variations(distinct).iter() {
        if second_read.is_some_and(|x| x != var.from_second_read()) {
            continue
        }
        match var.softclip_side() {
            Some(true) => three_prime += var.read_sequence().len() as u32,
            Some(false) => five_prime += var.read_sequence().len() as u32,
            None => (),
        }
    }
    (five_prime, three_prime)
}

/// Moves a start boundary inside a deletion past its end.
pub(crate) fn snap_start(
    deletions: &[(u32, u32)],
    at: u32,
) -> u32 {
    deletions.iter().find(|(start, end)| *start < at && at < *end).map_or(at, |(_, end)| *end)
}

/// Moves an end boundary inside a deletion back to its start.
pub(crate) fn snap_end(
    deletions: &[(u32, u32)],
    at: u32,
) -> u32 {
    deletions.iter().find(|(start, end)| *start < at && at < *end).map_or(at, |(start, _)| *start)
}

/// Records of the retained sub-regions, in the order they first appear.
pub struct Trimmed<'a, R: ReadRegion> {
    // Inputs
    reads: &'a dyn ReadsAccess,
    region: &'a R,

    // Internals
    groups: indexmap::map::IntoIter<(u32, u32), Vec<Cut>>,
    builder: AlignedReadsBuilder,
}

impl<'a, R: ReadRegion> Trimmed<'a, R> {
    pub(crate) fn new(
        reads: &'a dyn ReadsAccess,
        region: &'a R,
        cuts: Vec<Cut>,
    ) -> Self {
        let mut groups: IndexMap<(u32, u32), Vec<Cut>> = IndexMap::new();
        for cut in cuts {
            groups.entry((cut.window.start, cut.window.end)).or_default().push(cut);
        }
        Trimmed {
            reads, region,
            groups: groups.into_iter(),
            builder: AlignedReadsBuilder::new(reads.num_conditions()),
        }
    }

    /// Number of sub-regions not yet built.
    pub fn remaining(&self) -> usize {
        self.groups.len()
    }

    fn build(
        &mut self,
        window: (u32, u32),
        cuts: &[Cut],
    ) -> Result<(R, AlignedReads)> {
        let region = self.region.induced_sub_region(window.0, window.1)?;

        self.builder.start();
        for cut in cuts {
            self.builder.add_distinct(self.reads, cut.distinct, |var| cut.rederive(var), true)?;
            if let Some(geometry) = cut.geometry {
                self.builder.set_geometry(geometry)?;
            }
            if let Some(subreads) = self.reads.subreads(cut.distinct) {
                if let Some(subreads) = subreads.restrict(window.0, window.1) {
                    self.builder.set_subreads(subreads)?;
                }
            }
        }
        self.builder.make_distinct()?;
        let record = self.builder.create()?;
        log::trace!("trimmed {} distinct sequences to [{}, {})", cuts.len(), window.0, window.1);
        Ok((region, record))
    }
}

impl<R: ReadRegion> Iterator for Trimmed<'_, R> {
    type Item = Result<(R, AlignedReads)>;

    fn next(
        &mut self,
    ) -> Option<Result<(R, AlignedReads)>> {
        let (window, cuts) = self.groups.next()?;
        Some(self.build(window, &cuts))
    }
}
