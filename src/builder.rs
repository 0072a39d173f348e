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

//! Stateful construction of [AlignedReads] records.
//!
//! A builder is reset with [start](AlignedReadsBuilder::start), receives one
//! distinct sequence at a time through
//! [new_distinct_sequence](AlignedReadsBuilder::new_distinct_sequence) and the
//! setters that follow it, optionally merges equivalent distinct sequences
//! with [make_distinct](AlignedReadsBuilder::make_distinct) and is frozen into
//! a record by [create](AlignedReadsBuilder::create). The setters always act
//! on the most recently opened distinct sequence.
//!
//! A builder is owned by one thread at a time. Parallel pipelines use one
//! builder per worker.
//!
//! ## Usage
//!
//! ```rust
//! use alnreads::access::ReadsAccess;
//! use alnreads::builder::AlignedReadsBuilder;
//! use alnreads::variation::Variation;
//!
//! let mut builder = AlignedReadsBuilder::new(2);
//! builder.start();
//!
//! builder.new_distinct_sequence().unwrap();
//! builder.set_count(0, 3).unwrap();
//! builder.add_variation(Variation::mismatch(12, b'A', b'G', false)).unwrap();
//! builder.set_multiplicity(1).unwrap();
//!
//! builder.new_distinct_sequence().unwrap();
//! builder.set_count(1, 2).unwrap();
//! builder.add_variation(Variation::mismatch(12, b'A', b'G', false)).unwrap();
//! builder.set_multiplicity(1).unwrap();
//!
//! builder.make_distinct().unwrap();
//! let record = builder.create().unwrap();
//!
//! assert_eq!(record.num_distinct(), 1);
//! assert_eq!(record.to_string(), "[3,2] x1 M12AG");
//! ```

use crate::access::ReadsAccess;
use crate::barcode::Barcode;
use crate::config::SparsePolicy;
use crate::counts::CountRow;
use crate::counts::CountTable;
use crate::error::ReadsError;
use crate::error::Result;
use crate::geometry::Geometry;
use crate::record::AlignedReads;
use crate::record::RecordParts;
use crate::subreads::Subreads;
use crate::variation::MAX_POSITION;
use crate::variation::Variation;

use indexmap::IndexMap;
use roaring::RoaringBitmap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Building,
}

#[derive(Clone, Debug)]
struct OpenDistinct {
    counts: CountRow,
    variations: Vec<Variation>,
    multiplicity: u32,
    id: Option<u32>,
    weight: Option<f32>,
    geometry: Option<Geometry>,
    barcodes: Option<Vec<Vec<Barcode>>>,
    subreads: Option<Subreads>,
}

impl OpenDistinct {
    fn new(num_conditions: usize, sparse: bool) -> Self {
        OpenDistinct {
            counts: CountRow::new(num_conditions, sparse),
            variations: Vec::new(),
            multiplicity: 0,
            id: None,
            weight: None,
            geometry: None,
            barcodes: None,
            subreads: None,
        }
    }

    fn absorb(&mut self, other: &OpenDistinct) {
        self.counts.merge(&other.counts);
        if let (Some(lists), Some(other_lists)) = (self.barcodes.as_mut(), other.barcodes.as_ref()) {
            lists.iter_mut().zip(other_lists.iter()).for_each(|(x, y)| x.extend(y.iter().cloned()));
        }
        self.id = match (self.id, other.id) {
            (Some(x), Some(y)) => Some(x.min(y)),
            (x, _) => x,
        };
    }
}

// Equivalence of distinct sequences for merging.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Fingerprint {
    variations: Vec<Variation>,
    geometry: Option<Geometry>,
    subreads: Option<Subreads>,
}

fn all_or_none<T>(what: &str, values: Vec<Option<T>>) -> Result<Option<Vec<T>>> {
    let present = values.iter().filter(|x| x.is_some()).count();
    if present == 0 {
        return Ok(None)
    }
    if present != values.len() {
        return Err(ReadsError::sequencing(format!(
            "{} set for {} of {} distinct sequences, set it for all or none", what, present, values.len(),
        )));
    }
    Ok(Some(values.into_iter().flatten().collect()))
}

#[derive(Clone, Debug)]
pub struct AlignedReadsBuilder {
    num_conditions: usize,
    sparse: bool,
    state: State,
    distinct: Vec<OpenDistinct>,
}

impl AlignedReadsBuilder {
    /// Builder for records with `num_conditions` conditions under the default [SparsePolicy].
    pub fn new(num_conditions: usize) -> Self {
        AlignedReadsBuilder::with_policy(num_conditions, &SparsePolicy::default())
    }

    pub fn with_policy(num_conditions: usize, policy: &SparsePolicy) -> Self {
        AlignedReadsBuilder {
            num_conditions,
            sparse: policy.is_sparse(num_conditions),
            state: State::Idle,
            distinct: Vec::new(),
        }
    }

    pub fn num_conditions(&self) -> usize {
        self.num_conditions
    }

    /// True if counts are stored sparsely.
    pub fn is_sparse(&self) -> bool {
        self.sparse
    }

    /// Number of distinct sequences added since [start](AlignedReadsBuilder::start).
    pub fn num_distinct(&self) -> usize {
        self.distinct.len()
    }

    /// Discards everything added so far and starts a new record.
    pub fn start(&mut self) {
        self.state = State::Building;
        self.distinct.clear();
    }

    fn check_building(&self) -> Result<()> {
        match self.state {
            State::Building => Ok(()),
            State::Idle => Err(ReadsError::sequencing("builder used before start()")),
        }
    }

    fn check_condition(&self, condition: usize) -> Result<()> {
        if condition >= self.num_conditions {
            return Err(ReadsError::consistency(format!(
                "condition {} out of range for {} conditions", condition, self.num_conditions,
            )));
        }
        Ok(())
    }

    fn open(&mut self) -> Result<&mut OpenDistinct> {
        self.check_building()?;
        self.distinct.last_mut().ok_or_else(|| ReadsError::sequencing("no distinct sequence is open"))
    }

    pub fn new_distinct_sequence(&mut self) -> Result<()> {
        self.check_building()?;
        self.distinct.push(OpenDistinct::new(self.num_conditions, self.sparse));
        Ok(())
    }

    /// Sets the count of `condition`. Zero counts are written by omission.
    pub fn set_count(&mut self, condition: usize, count: u32) -> Result<()> {
        if count == 0 {
            return Err(ReadsError::consistency("counts must be positive, omit zero counts"));
        }
        self.check_condition(condition)?;
        let distinct = self.open()?;
        if distinct.barcodes.is_some() {
            return Err(ReadsError::consistency("count without barcodes for a barcoded distinct sequence"));
        }
        distinct.counts.set(condition as u32, count)
    }

    pub fn increment_count(&mut self, condition: usize, count: u32) -> Result<()> {
        self.check_condition(condition)?;
        let distinct = self.open()?;
        if count > 0 && distinct.barcodes.is_some() {
            return Err(ReadsError::consistency("count without barcodes for a barcoded distinct sequence"));
        }
        distinct.counts.increment(condition as u32, count)
    }

    fn open_barcoded(&mut self, condition: usize, count: u32, barcodes: &[Barcode]) -> Result<&mut OpenDistinct> {
        if barcodes.len() != count as usize {
            return Err(ReadsError::consistency(format!(
                "{} barcodes given for a count of {}", barcodes.len(), count,
            )));
        }
        self.check_condition(condition)?;
        let num_conditions = self.num_conditions;
        let distinct = self.open()?;
        if distinct.barcodes.is_none() {
            if distinct.counts.total() > 0 {
                return Err(ReadsError::consistency("barcodes for a distinct sequence with counts without barcodes"));
            }
            distinct.barcodes = Some(vec![Vec::new(); num_conditions]);
        }
        Ok(distinct)
    }

    /// Sets the count of `condition` together with one barcode per read.
    pub fn set_count_barcoded(&mut self, condition: usize, count: u32, barcodes: &[Barcode]) -> Result<()> {
        if count == 0 {
            return Err(ReadsError::consistency("counts must be positive, omit zero counts"));
        }
        let distinct = self.open_barcoded(condition, count, barcodes)?;
        distinct.counts.set(condition as u32, count)?;
        if let Some(lists) = distinct.barcodes.as_mut() {
            lists[condition] = barcodes.to_vec();
        }
        Ok(())
    }

    pub fn increment_count_barcoded(&mut self, condition: usize, count: u32, barcodes: &[Barcode]) -> Result<()> {
        let distinct = self.open_barcoded(condition, count, barcodes)?;
        distinct.counts.increment(condition as u32, count)?;
        if let Some(lists) = distinct.barcodes.as_mut() {
            lists[condition].extend(barcodes.iter().cloned());
        }
        Ok(())
    }

    /// Adds `variation`, ignoring exact duplicates.
    pub fn add_variation(&mut self, variation: Variation) -> Result<()> {
        if !variation.is_softclip() && variation.position() > MAX_POSITION {
            return Err(ReadsError::range("variation position", variation.position(), MAX_POSITION));
        }
        let distinct = self.open()?;
        if let Err(pos) = distinct.variations.binary_search(&variation) {
            distinct.variations.insert(pos, variation);
        }
        Ok(())
    }

    pub fn set_multiplicity(&mut self, multiplicity: u32) -> Result<()> {
        self.open()?.multiplicity = multiplicity;
        Ok(())
    }

    pub fn set_id(&mut self, id: u32) -> Result<()> {
        self.open()?.id = Some(id);
        Ok(())
    }

    pub fn set_weight(&mut self, weight: f32) -> Result<()> {
        self.open()?.weight = Some(weight);
        Ok(())
    }

    pub fn set_geometry(&mut self, geometry: Geometry) -> Result<()> {
        self.open()?.geometry = Some(geometry);
        Ok(())
    }

    pub fn set_subreads(&mut self, subreads: Subreads) -> Result<()> {
        self.open()?.subreads = Some(subreads);
        Ok(())
    }

    /// Adds distinct sequence `distinct` of `reads` as a new distinct sequence.
    ///
    /// `filter` maps every variation to its replacement, or None to drop it.
    /// Geometry is not copied if `drop_geometry` is set. The new distinct
    /// sequence stays open, so its fields can still be overwritten.
    pub fn add_distinct<F>(&mut self, reads: &dyn ReadsAccess, distinct: usize, mut filter: F, drop_geometry: bool) -> Result<()>
    where F: FnMut(&Variation) -> Result<Option<Variation>> {
        if reads.num_conditions() != self.num_conditions {
            return Err(ReadsError::consistency(format!(
                "record has {} conditions, the builder {}", reads.num_conditions(), self.num_conditions,
            )));
        }
        self.new_distinct_sequence()?;

        let with_barcodes = reads.capabilities().barcodes;
        for (condition, count) in reads.nonzero_counts(distinct) {
            match reads.barcodes(distinct, condition) {
                Some(barcodes) if with_barcodes => self.set_count_barcoded(condition, count, &barcodes)?,
                _ => self.set_count(condition, count)?,
            }
        }
        for var in reads.variations(distinct).iter() {
            if let Some(var) = filter(var)? {
                self.add_variation(var)?;
            }
        }
        self.set_multiplicity(reads.multiplicity(distinct))?;
        if let Some(id) = reads.id(distinct) {
            self.set_id(id)?;
        }
        if let Some(weight) = reads.stored_weight(distinct) {
            self.set_weight(weight)?;
        }
        if !drop_geometry {
            if let Some(geometry) = reads.geometry(distinct) {
                self.set_geometry(geometry)?;
            }
        }
        if let Some(subreads) = reads.subreads(distinct) {
            self.set_subreads(subreads.into_owned())?;
        }
        Ok(())
    }

    /// Adds every distinct sequence of `reads` unchanged.
    pub fn add(&mut self, reads: &dyn ReadsAccess) -> Result<()> {
        for distinct in 0..reads.num_distinct() {
            self.add_distinct(reads, distinct, |x| Ok(Some(x.clone())), false)?;
        }
        Ok(())
    }

    /// Merges distinct sequences with equal variations and geometry.
    ///
    /// If any distinct sequence has a subread structure, the subread
    /// structure is compared instead of the geometry. Counts are summed,
    /// barcode lists concatenated and the smallest id kept. Multiplicity and
    /// weight come from the first distinct sequence of each group, and groups
    /// keep the order in which they first appeared.
    pub fn make_distinct(&mut self) -> Result<()> {
        self.check_building()?;
        let by_subreads = self.distinct.iter().any(|x| x.subreads.is_some());

        let before = self.distinct.len();
        let mut groups: IndexMap<Fingerprint, OpenDistinct> = IndexMap::with_capacity(before);
        for distinct in self.distinct.drain(..) {
            let key = Fingerprint {
                variations: distinct.variations.clone(),
                geometry: if by_subreads { None } else { distinct.geometry },
                subreads: if by_subreads { distinct.subreads.clone() } else { None },
            };
            match groups.get_mut(&key) {
                Some(first) => first.absorb(&distinct),
                None => {
                    groups.insert(key, distinct);
                },
            }
        }
        self.distinct = groups.into_values().collect();

        log::trace!("merged {} distinct sequences into {}", before, self.distinct.len());
        Ok(())
    }

    /// Freezes the distinct sequences into a record and returns to the idle state.
    pub fn create(&mut self) -> Result<AlignedReads> {
        self.check_building()?;
        if self.distinct.is_empty() {
            return Err(ReadsError::sequencing("cannot create a record without distinct sequences"));
        }
        let distinct = std::mem::take(&mut self.distinct);
        self.state = State::Idle;

        let num_distinct = distinct.len();
        let with_barcodes = distinct.iter().any(|x| x.barcodes.is_some());

        let mut rows: Vec<CountRow> = Vec::with_capacity(num_distinct);
        let mut parts = RecordParts::default();
        let mut ids: Vec<Option<u32>> = Vec::with_capacity(num_distinct);
        let mut weights: Vec<Option<f32>> = Vec::with_capacity(num_distinct);
        let mut geometries: Vec<Option<Geometry>> = Vec::with_capacity(num_distinct);
        let mut subreads: Vec<Option<Subreads>> = Vec::with_capacity(num_distinct);
        let mut barcodes: Vec<Vec<Vec<Barcode>>> = Vec::new();

        for x in distinct {
            if with_barcodes {
                match x.barcodes {
                    Some(lists) => barcodes.push(lists),
                    None if x.counts.total() == 0 => barcodes.push(vec![Vec::new(); self.num_conditions]),
                    None => return Err(ReadsError::sequencing("barcodes set for some distinct sequences only")),
                }
            }
            rows.push(x.counts);
            parts.variations.push(x.variations);
            parts.multiplicities.push(x.multiplicity);
            ids.push(x.id);
            weights.push(x.weight);
            geometries.push(x.geometry);
            subreads.push(x.subreads);
        }
        parts.ids = all_or_none("ids", ids)?;
        parts.weights = all_or_none("weights", weights)?;
        parts.geometries = all_or_none("geometries", geometries)?;
        parts.subreads = all_or_none("subread structures", subreads)?;
        parts.barcodes = if with_barcodes { Some(barcodes) } else { None };

        AlignedReads::from_table(CountTable::from_rows(self.num_conditions, rows), parts)
    }

    /// Freezes a single distinct sequence without variations into a digital
    /// record that only keeps which conditions have reads.
    pub fn create_digital(&mut self) -> Result<AlignedReads> {
        self.check_building()?;
        if self.distinct.len() != 1 {
            return Err(ReadsError::consistency(format!(
                "digital records have exactly one distinct sequence, got {}", self.distinct.len(),
            )));
        }
        if !self.distinct[0].variations.is_empty() {
            return Err(ReadsError::consistency("digital records have no variations"));
        }
        if self.distinct[0].barcodes.is_some() {
            return Err(ReadsError::consistency("digital records carry no barcodes"));
        }
        let distinct = std::mem::take(&mut self.distinct);
        self.state = State::Idle;

        let x = distinct.into_iter().next().ok_or_else(|| ReadsError::sequencing("no distinct sequence is open"))?;
        let present: RoaringBitmap = x.counts.nonzero().into_iter().map(|(c, _)| c).collect();
        let parts = RecordParts {
            variations: vec![Vec::new()],
            multiplicities: vec![x.multiplicity],
            ids: x.id.map(|id| vec![id]),
            weights: x.weight.map(|w| vec![w]),
            geometries: x.geometry.map(|g| vec![g]),
            barcodes: None,
            subreads: x.subreads.map(|s| vec![s]),
        };
        AlignedReads::from_presence(self.num_conditions, present, parts)
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn setters_need_open_distinct() {
        use super::AlignedReadsBuilder;
        use crate::error::ReadsError;

        let mut builder = AlignedReadsBuilder::new(2);
        assert!(matches!(builder.new_distinct_sequence(), Err(ReadsError::Sequencing(_))));

        builder.start();
        assert!(matches!(builder.set_count(0, 1), Err(ReadsError::Sequencing(_))));
        assert!(matches!(builder.set_multiplicity(1), Err(ReadsError::Sequencing(_))));
        assert!(matches!(builder.create(), Err(ReadsError::Sequencing(_))));
    }

    #[test]
    fn set_count_checks() {
        use super::AlignedReadsBuilder;
        use crate::error::ReadsError;

        let mut builder = AlignedReadsBuilder::new(2);
        builder.start();
        builder.new_distinct_sequence().unwrap();
        assert!(matches!(builder.set_count(0, 0), Err(ReadsError::Consistency(_))));
        assert!(builder.set_count(2, 1).is_err());
        assert!(builder.increment_count(1, 0).is_ok());
    }

    #[test]
    fn sparse_writes_in_order() {
        use super::AlignedReadsBuilder;
        use crate::access::ReadsAccess;
        use crate::error::ReadsError;

        let mut builder = AlignedReadsBuilder::new(10);
        assert!(builder.is_sparse());
        builder.start();
        builder.new_distinct_sequence().unwrap();
        builder.set_count(2, 1).unwrap();
        builder.increment_count(7, 3).unwrap();
        assert!(matches!(builder.set_count(4, 1), Err(ReadsError::Sequencing(_))));

        let record = builder.create().unwrap();
        assert!(record.has_nonzero_information());
        assert_eq!(record.nonzero_counts(0), vec![(2, 1), (7, 3)]);
    }

    #[test]
    fn all_or_none_fields() {
        use super::AlignedReadsBuilder;
        use crate::error::ReadsError;
        use crate::geometry::Geometry;

        let mut builder = AlignedReadsBuilder::new(1);
        builder.start();
        builder.new_distinct_sequence().unwrap();
        builder.set_count(0, 1).unwrap();
        builder.set_id(1).unwrap();
        builder.new_distinct_sequence().unwrap();
        builder.set_count(0, 1).unwrap();
        assert!(matches!(builder.create(), Err(ReadsError::Sequencing(_))));

        builder.start();
        builder.new_distinct_sequence().unwrap();
        builder.set_count(0, 1).unwrap();
        builder.set_geometry(Geometry::new(1, 2, 3).unwrap()).unwrap();
        builder.new_distinct_sequence().unwrap();
        builder.set_count(0, 1).unwrap();
        assert!(matches!(builder.create(), Err(ReadsError::Sequencing(_))));
    }

    #[test]
    fn variations_sorted_without_duplicates() {
        use super::AlignedReadsBuilder;
        use crate::access::ReadsAccess;
        use crate::variation::Variation;

        let mut builder = AlignedReadsBuilder::new(1);
        builder.start();
        builder.new_distinct_sequence().unwrap();
        builder.set_count(0, 1).unwrap();
        builder.add_variation(Variation::deletion(20, "AC", false)).unwrap();
        builder.add_variation(Variation::softclip(true, "GG", false)).unwrap();
        builder.add_variation(Variation::mismatch(4, b'A', b'C', false)).unwrap();
        builder.add_variation(Variation::deletion(20, "AC", false)).unwrap();
        assert!(builder.add_variation(Variation::mismatch(2048, b'A', b'C', false)).is_err());

        let record = builder.create().unwrap();
        let got: Vec<String> = record.variations(0).iter().map(|x| x.to_string()).collect();
        assert_eq!(got, vec!["3pGG", "M4AC", "D20AC"]);
    }

    #[test]
    fn make_distinct_merges() {
        use super::AlignedReadsBuilder;
        use crate::access::ReadsAccess;
        use crate::variation::Variation;

        let mut builder = AlignedReadsBuilder::new(10);
        builder.start();
        for (id, (condition, count)) in [(1, 2), (3, 1), (1, 5)].into_iter().enumerate() {
            builder.new_distinct_sequence().unwrap();
            builder.set_count(condition, count).unwrap();
            builder.set_id(id as u32 + 10).unwrap();
            builder.set_multiplicity(id as u32 + 1).unwrap();
            if id == 1 {
                builder.add_variation(Variation::insertion(5, "A", false)).unwrap();
            }
        }
        builder.make_distinct().unwrap();
        let once = builder.clone().create().unwrap();
        builder.make_distinct().unwrap();
        let twice = builder.create().unwrap();

        assert_eq!(once, twice);
        assert_eq!(once.num_distinct(), 2);
        assert_eq!(once.nonzero_counts(0), vec![(1, 7)]);
        assert_eq!(once.id(0), Some(10));
        assert_eq!(once.multiplicity(0), 1);
        assert_eq!(once.nonzero_counts(1), vec![(3, 1)]);
        assert_eq!(once.id(1), Some(11));
    }

    #[test]
    fn make_distinct_by_geometry() {
        use super::AlignedReadsBuilder;
        use crate::access::ReadsAccess;
        use crate::geometry::Geometry;

        let mut builder = AlignedReadsBuilder::new(2);
        builder.start();
        for geometry in [Geometry::new(10, 5, 10).unwrap(), Geometry::new(5, 15, 5).unwrap(), Geometry::new(10, 5, 10).unwrap()] {
            builder.new_distinct_sequence().unwrap();
            builder.set_count(0, 1).unwrap();
            builder.set_geometry(geometry).unwrap();
        }
        builder.make_distinct().unwrap();
        let record = builder.create().unwrap();
        assert_eq!(record.num_distinct(), 2);
        assert_eq!(record.count(0, 0), 2);
        assert_eq!(record.geometry(1), Some(Geometry::new(5, 15, 5).unwrap()));
    }

    #[test]
    fn make_distinct_by_subreads_ignores_geometry() {
        use super::AlignedReadsBuilder;
        use crate::access::ReadsAccess;
        use crate::geometry::Geometry;
        use crate::subreads::Subreads;

        let mut builder = AlignedReadsBuilder::new(1);
        builder.start();
        for before in [10, 12] {
            builder.new_distinct_sequence().unwrap();
            builder.set_count(0, 1).unwrap();
            builder.set_geometry(Geometry::new(before, 5, 10).unwrap()).unwrap();
            builder.set_subreads(Subreads::new(vec![0, 1], vec![10], vec![]).unwrap()).unwrap();
        }
        builder.make_distinct().unwrap();
        let record = builder.create().unwrap();
        assert_eq!(record.num_distinct(), 1);
        assert_eq!(record.count(0, 0), 2);
        assert!(record.capabilities().subreads);
    }

    #[test]
    fn barcodes_concatenate_on_merge() {
        use super::AlignedReadsBuilder;
        use crate::access::ReadsAccess;
        use crate::barcode::Barcode;
        use crate::error::ReadsError;

        let bc = |x: &str| Barcode::new(x).unwrap();

        let mut builder = AlignedReadsBuilder::new(2);
        builder.start();
        builder.new_distinct_sequence().unwrap();
        assert!(matches!(builder.set_count_barcoded(0, 2, &[bc("AA")]), Err(ReadsError::Consistency(_))));
        builder.set_count_barcoded(0, 2, &[bc("AA"), bc("AC")]).unwrap();
        builder.new_distinct_sequence().unwrap();
        builder.increment_count_barcoded(0, 1, &[bc("GG")]).unwrap();
        builder.increment_count_barcoded(1, 1, &[bc("TT")]).unwrap();
        assert!(builder.set_count(1, 2).is_err());

        builder.make_distinct().unwrap();
        let record = builder.create().unwrap();
        assert_eq!(record.num_distinct(), 1);
        assert_eq!(record.count(0, 0), 3);
        assert_eq!(record.barcodes(0, 0).unwrap().to_vec(), vec![bc("AA"), bc("AC"), bc("GG")]);
        assert_eq!(record.barcodes(0, 1).unwrap().to_vec(), vec![bc("TT")]);
    }

    #[test]
    fn create_digital() {
        use super::AlignedReadsBuilder;
        use crate::access::ReadsAccess;
        use crate::error::ReadsError;
        use crate::variation::Variation;

        let mut builder = AlignedReadsBuilder::new(4);
        builder.start();
        builder.new_distinct_sequence().unwrap();
        builder.set_count(1, 5).unwrap();
        builder.set_count(3, 2).unwrap();
        builder.set_multiplicity(1).unwrap();
        let record = builder.create_digital().unwrap();
        assert!(record.is_digital());
        assert_eq!(record.count(0, 1), 1);
        assert_eq!(record.count(0, 3), 1);
        assert_eq!(record.count(0, 0), 0);

        builder.start();
        builder.new_distinct_sequence().unwrap();
        builder.set_count(1, 5).unwrap();
        builder.add_variation(Variation::mismatch(1, b'A', b'C', false)).unwrap();
        assert!(matches!(builder.create_digital(), Err(ReadsError::Consistency(_))));

        builder.start();
        builder.new_distinct_sequence().unwrap();
        builder.new_distinct_sequence().unwrap();
        assert!(matches!(builder.create_digital(), Err(ReadsError::Consistency(_))));
    }

    #[test]
    fn add_distinct_with_filter() {
        use super::AlignedReadsBuilder;
        use crate::access::ReadsAccess;
        use crate::geometry::Geometry;
        use crate::variation::Variation;

        let mut builder = AlignedReadsBuilder::new(2);
        builder.start();
        builder.new_distinct_sequence().unwrap();
        builder.set_count(1, 3).unwrap();
        builder.set_geometry(Geometry::new(3, 4, 5).unwrap()).unwrap();
        builder.add_variation(Variation::mismatch(4, b'A', b'C', false)).unwrap();
        builder.add_variation(Variation::softclip(false, "TT", false)).unwrap();
        let record = builder.create().unwrap();

        builder.start();
        builder.add_distinct(&record, 0, |x| {
            if x.is_softclip() { Ok(None) } else { x.reposition(x.position() + 1).map(Some) }
        }, true).unwrap();
        let got = builder.create().unwrap();

        assert_eq!(got.count(0, 1), 3);
        assert_eq!(got.geometry(0), None);
        assert_eq!(got.variations(0).to_vec(), vec![Variation::mismatch(5, b'A', b'C', false)]);
    }
}
