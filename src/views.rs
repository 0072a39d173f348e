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

//! Views that wrap a record without copying it.
//!
//! Each view holds a shared reference to its parent and implements
//! [ReadsAccess] itself, so views compose:
//!
//! ```rust
//! use alnreads::access::ReadsAccess;
//! use alnreads::builder::AlignedReadsBuilder;
//! use alnreads::variation::Variation;
//! use alnreads::views::{ConditionMapped, SelectDistinct, VariationDropped};
//! use std::sync::Arc;
//!
//! let mut builder = AlignedReadsBuilder::new(3);
//! builder.start();
//! builder.new_distinct_sequence().unwrap();
//! builder.set_count(0, 2).unwrap();
//! builder.set_count(2, 1).unwrap();
//! builder.new_distinct_sequence().unwrap();
//! builder.set_count(1, 4).unwrap();
//! builder.add_variation(Variation::mismatch(3, b'A', b'G', false)).unwrap();
//! let record = Arc::new(builder.create().unwrap());
//!
//! // Second distinct sequence, conditions 1 and 2 pooled, without variations
//! let selected = Arc::new(SelectDistinct::new(record, vec![1]).unwrap());
//! let pooled = Arc::new(ConditionMapped::new(selected, vec![vec![1, 2]]).unwrap());
//! let plain = VariationDropped::all(pooled);
//!
//! assert_eq!(plain.num_distinct(), 1);
//! assert_eq!(plain.count(0, 0), 4);
//! assert!(plain.variations(0).is_empty());
//! ```

use crate::access::Capabilities;
use crate::access::ReadsAccess;
use crate::access::write_debug_text;
use crate::barcode::Barcode;
use crate::error::ReadsError;
use crate::error::Result;
use crate::geometry::Geometry;
use crate::subreads::Subreads;
use crate::variation::Variation;

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A subset of the distinct sequences of a record, in the given order.
#[derive(Debug)]
pub struct SelectDistinct {
    parent: Arc<dyn ReadsAccess>,
    selected: Vec<usize>,
}

impl SelectDistinct {
    pub fn new(parent: Arc<dyn ReadsAccess>, selected: Vec<usize>) -> Result<Self> {
        if let Some(d) = selected.iter().find(|d| **d >= parent.num_distinct()) {
            return Err(ReadsError::consistency(format!(
                "distinct sequence {} out of range for {} distinct sequences", d, parent.num_distinct(),
            )));
        }
        Ok(SelectDistinct { parent, selected })
    }
}

impl ReadsAccess for SelectDistinct {
    fn num_distinct(&self) -> usize {
        self.selected.len()
    }

    fn num_conditions(&self) -> usize {
        self.parent.num_conditions()
    }

    fn count(&self, distinct: usize, condition: usize) -> u32 {
        self.parent.count(self.selected[distinct], condition)
    }

    fn variations(&self, distinct: usize) -> Cow<'_, [Variation]> {
        self.parent.variations(self.selected[distinct])
    }

    fn multiplicity(&self, distinct: usize) -> u32 {
        self.parent.multiplicity(self.selected[distinct])
    }

    fn id(&self, distinct: usize) -> Option<u32> {
        self.parent.id(self.selected[distinct])
    }

    fn stored_weight(&self, distinct: usize) -> Option<f32> {
        self.parent.stored_weight(self.selected[distinct])
    }

    fn geometry(&self, distinct: usize) -> Option<Geometry> {
        self.parent.geometry(self.selected[distinct])
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { view: true, ..self.parent.capabilities() }
    }

    fn barcodes(&self, distinct: usize, condition: usize) -> Option<Cow<'_, [Barcode]>> {
        self.parent.barcodes(self.selected[distinct], condition)
    }

    fn subreads(&self, distinct: usize) -> Option<Cow<'_, Subreads>> {
        self.parent.subreads(self.selected[distinct])
    }

    fn has_nonzero_information(&self) -> bool {
        self.parent.has_nonzero_information()
    }

    fn nonzero_counts(&self, distinct: usize) -> Vec<(usize, u32)> {
        self.parent.nonzero_counts(self.selected[distinct])
    }
}

/// Conditions remapped onto a new set of conditions.
///
/// New condition `i` is the sum of the parent conditions listed in
/// `mapping[i]`. A parent condition may appear under several new conditions or
/// under none.
#[derive(Debug)]
pub struct ConditionMapped {
    parent: Arc<dyn ReadsAccess>,
    mapping: Vec<Vec<usize>>,
}

impl ConditionMapped {
    pub fn new(parent: Arc<dyn ReadsAccess>, mapping: Vec<Vec<usize>>) -> Result<Self> {
        let num_conditions = parent.num_conditions();
        if let Some(c) = mapping.iter().flatten().find(|c| **c >= num_conditions) {
            return Err(ReadsError::consistency(format!(
                "condition {} out of range for {} conditions", c, num_conditions,
            )));
        }
        Ok(ConditionMapped { parent, mapping })
    }

    /// Keeps `conditions` of the parent, in the given order.
    pub fn select(parent: Arc<dyn ReadsAccess>, conditions: &[usize]) -> Result<Self> {
        ConditionMapped::new(parent, conditions.iter().map(|c| vec![*c]).collect())
    }
}

impl ReadsAccess for ConditionMapped {
    fn num_distinct(&self) -> usize {
        self.parent.num_distinct()
    }

    fn num_conditions(&self) -> usize {
        self.mapping.len()
    }

    fn count(&self, distinct: usize, condition: usize) -> u32 {
        self.mapping[condition].iter().map(|c| self.parent.count(distinct, *c)).sum()
    }

    fn variations(&self, distinct: usize) -> Cow<'_, [Variation]> {
        self.parent.variations(distinct)
    }

    fn multiplicity(&self, distinct: usize) -> u32 {
        self.parent.multiplicity(distinct)
    }

    fn id(&self, distinct: usize) -> Option<u32> {
        self.parent.id(distinct)
    }

    fn stored_weight(&self, distinct: usize) -> Option<f32> {
        self.parent.stored_weight(distinct)
    }

    fn geometry(&self, distinct: usize) -> Option<Geometry> {
        self.parent.geometry(distinct)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { view: true, ..self.parent.capabilities() }
    }

    fn barcodes(&self, distinct: usize, condition: usize) -> Option<Cow<'_, [Barcode]>> {
        let mut pooled: Vec<Barcode> = Vec::new();
        for c in self.mapping[condition].iter() {
            pooled.extend(self.parent.barcodes(distinct, *c)?.iter().cloned());
        }
        Some(Cow::Owned(pooled))
    }

    fn subreads(&self, distinct: usize) -> Option<Cow<'_, Subreads>> {
        self.parent.subreads(distinct)
    }
}

/// Variations removed, either all of them or those a predicate rejects.
///
/// Distinct sequences are not merged even if they become identical.
pub struct VariationDropped {
    parent: Arc<dyn ReadsAccess>,
    keep: Option<Arc<dyn Fn(&Variation) -> bool + Send + Sync>>,
}

impl VariationDropped {
    pub fn all(parent: Arc<dyn ReadsAccess>) -> Self {
        VariationDropped { parent, keep: None }
    }

    /// Keeps the variations for which `keep` returns true.
    pub fn filtered<F>(parent: Arc<dyn ReadsAccess>, keep: F) -> Self
    where F: Fn(&Variation) -> bool + Send + Sync + 'static {
        VariationDropped { parent, keep: Some(Arc::new(keep)) }
    }
}

impl fmt::Debug for VariationDropped {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("VariationDropped")
            .field("parent", &self.parent)
            .field("filtered", &self.keep.is_some())
            .finish()
    }
}

impl ReadsAccess for VariationDropped {
    fn num_distinct(&self) -> usize {
        self.parent.num_distinct()
    }

    fn num_conditions(&self) -> usize {
        self.parent.num_conditions()
    }

    fn count(&self, distinct: usize, condition: usize) -> u32 {
        self.parent.count(distinct, condition)
    }

    fn variations(&self, distinct: usize) -> Cow<'_, [Variation]> {
        match &self.keep {
            None => Cow::Owned(Vec::new()),
            Some(keep) => Cow::Owned(self.parent.variations(distinct).iter().filter(|x| keep(*x)).cloned().collect()),
        }
    }

    fn multiplicity(&self, distinct: usize) -> u32 {
        self.parent.multiplicity(distinct)
    }

    fn id(&self, distinct: usize) -> Option<u32> {
        self.parent.id(distinct)
    }

    fn stored_weight(&self, distinct: usize) -> Option<f32> {
        self.parent.stored_weight(distinct)
    }

    fn geometry(&self, distinct: usize) -> Option<Geometry> {
        self.parent.geometry(distinct)
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { view: true, ..self.parent.capabilities() }
    }

    fn barcodes(&self, distinct: usize, condition: usize) -> Option<Cow<'_, [Barcode]>> {
        self.parent.barcodes(distinct, condition)
    }

    fn subreads(&self, distinct: usize) -> Option<Cow<'_, Subreads>> {
        self.parent.subreads(distinct)
    }

    fn has_nonzero_information(&self) -> bool {
        self.parent.has_nonzero_information()
    }

    fn nonzero_counts(&self, distinct: usize) -> Vec<(usize, u32)> {
        self.parent.nonzero_counts(distinct)
    }
}

impl fmt::Display for SelectDistinct {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_debug_text(self, f)
    }
}

impl fmt::Display for ConditionMapped {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_debug_text(self, f)
    }
}

impl fmt::Display for VariationDropped {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_debug_text(self, f)
    }
}
