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

//! Immutable aligned read records.
//!
//! An [AlignedReads] is produced by the
//! [AlignedReadsBuilder](crate::builder::AlignedReadsBuilder) or by the
//! [codec](crate::codec) and never changes afterwards. Its hash is computed
//! once when it is created. Equality is logical: a dense and a sparse record
//! with the same counts are equal, and so are a digital record and a plain
//! record with all counts at 1.

use crate::access::Capabilities;
use crate::access::ReadsAccess;
use crate::access::content_hash;
use crate::access::same_content;
use crate::access::write_debug_text;
use crate::barcode::Barcode;
use crate::counts::CountTable;
use crate::error::ReadsError;
use crate::error::Result;
use crate::geometry::Geometry;
use crate::subreads::Subreads;
use crate::variation::Variation;

use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

use roaring::RoaringBitmap;

#[derive(Clone, Debug)]
enum Counts {
    Table(CountTable),
    Digital { num_conditions: usize, present: RoaringBitmap },
}

/// Contents of a record before validation.
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordParts {
    pub(crate) variations: Vec<Vec<Variation>>,
    pub(crate) multiplicities: Vec<u32>,
    pub(crate) ids: Option<Vec<u32>>,
    pub(crate) weights: Option<Vec<f32>>,
    pub(crate) geometries: Option<Vec<Geometry>>,
    /// Indexed by distinct, then condition.
    pub(crate) barcodes: Option<Vec<Vec<Vec<Barcode>>>>,
    pub(crate) subreads: Option<Vec<Subreads>>,
}

#[derive(Clone, Debug)]
pub struct AlignedReads {
    counts: Counts,
    variations: Vec<Vec<Variation>>,
    multiplicities: Vec<u32>,
    ids: Option<Vec<u32>>,
    weights: Option<Vec<f32>>,
    geometries: Option<Vec<Geometry>>,
    barcodes: Option<Vec<Vec<Vec<Barcode>>>>,
    subreads: Option<Vec<Subreads>>,
    hash: u64,
}

fn check_len<T>(what: &str, field: &Option<Vec<T>>, num_distinct: usize) -> Result<()> {
    match field {
        Some(values) if values.len() != num_distinct => Err(ReadsError::consistency(format!(
            "{} {} for {} distinct sequences", values.len(), what, num_distinct,
        ))),
        _ => Ok(()),
    }
}

impl AlignedReads {
    pub(crate) fn from_table(counts: CountTable, parts: RecordParts) -> Result<Self> {
        let num_distinct = counts.num_distinct();
        check_len("barcode lists", &parts.barcodes, num_distinct)?;
        if let Some(barcodes) = &parts.barcodes {
            for (d, per_condition) in barcodes.iter().enumerate() {
                if per_condition.len() != counts.num_conditions() {
                    return Err(ReadsError::consistency(format!(
                        "barcodes of distinct sequence {} cover {} conditions, expected {}",
                        d, per_condition.len(), counts.num_conditions(),
                    )));
                }
                for (c, list) in per_condition.iter().enumerate() {
                    if list.len() != counts.count(d, c) as usize {
                        return Err(ReadsError::consistency(format!(
                            "{} barcodes for a count of {} in distinct sequence {}, condition {}",
                            list.len(), counts.count(d, c), d, c,
                        )));
                    }
                }
            }
        }
        AlignedReads::assemble(Counts::Table(counts), num_distinct, parts)
    }

    pub(crate) fn from_presence(num_conditions: usize, present: RoaringBitmap, parts: RecordParts) -> Result<Self> {
        if let Some(max) = present.max() {
            if max as usize >= num_conditions {
                return Err(ReadsError::consistency(format!(
                    "condition {} out of range for {} conditions", max, num_conditions,
                )));
            }
        }
        if parts.barcodes.is_some() {
            return Err(ReadsError::consistency("digital records carry no barcodes"));
        }
        AlignedReads::assemble(Counts::Digital { num_conditions, present }, 1, parts)
    }

    fn assemble(counts: Counts, num_distinct: usize, parts: RecordParts) -> Result<Self> {
        if num_distinct == 0 {
            return Err(ReadsError::consistency("record without distinct sequences"));
        }
        if parts.variations.len() != num_distinct || parts.multiplicities.len() != num_distinct {
            return Err(ReadsError::consistency(format!(
                "{} variation lists and {} multiplicities for {} distinct sequences",
                parts.variations.len(), parts.multiplicities.len(), num_distinct,
            )));
        }
        check_len("ids", &parts.ids, num_distinct)?;
        check_len("weights", &parts.weights, num_distinct)?;
        check_len("geometries", &parts.geometries, num_distinct)?;
        check_len("barcode lists", &parts.barcodes, num_distinct)?;
        check_len("subread structures", &parts.subreads, num_distinct)?;
        if let Some(d) = parts.variations.iter().position(|vars| vars.windows(2).any(|x| x[0] >= x[1])) {
            return Err(ReadsError::consistency(format!(
                "variations of distinct sequence {} are not sorted or contain duplicates", d,
            )));
        }

        let mut record = AlignedReads {
            counts,
            variations: parts.variations,
            multiplicities: parts.multiplicities,
            ids: parts.ids,
            weights: parts.weights,
            geometries: parts.geometries,
            barcodes: parts.barcodes,
            subreads: parts.subreads,
            hash: 0,
        };
        record.hash = content_hash(&record);
        Ok(record)
    }

    pub fn is_digital(&self) -> bool {
        matches!(self.counts, Counts::Digital { .. })
    }

    /// Count table, None for digital records.
    pub fn count_table(&self) -> Option<&CountTable> {
        match &self.counts {
            Counts::Table(table) => Some(table),
            Counts::Digital { .. } => None,
        }
    }

    /// Conditions with at least one read, None for count table records.
    pub fn presence(&self) -> Option<&RoaringBitmap> {
        match &self.counts {
            Counts::Table(_) => None,
            Counts::Digital { present, .. } => Some(present),
        }
    }

    pub fn content_hash(&self) -> u64 {
        self.hash
    }
}

impl ReadsAccess for AlignedReads {
    fn num_distinct(&self) -> usize {
        self.variations.len()
    }

    fn num_conditions(&self) -> usize {
        match &self.counts {
            Counts::Table(table) => table.num_conditions(),
            Counts::Digital { num_conditions, .. } => *num_conditions,
        }
    }

    fn count(&self, distinct: usize, condition: usize) -> u32 {
        match &self.counts {
            Counts::Table(table) => table.count(distinct, condition),
            Counts::Digital { present, .. } => present.contains(condition as u32) as u32,
        }
    }

    fn variations(&self, distinct: usize) -> Cow<'_, [Variation]> {
        Cow::Borrowed(&self.variations[distinct])
    }

    fn multiplicity(&self, distinct: usize) -> u32 {
        self.multiplicities[distinct]
    }

    fn id(&self, distinct: usize) -> Option<u32> {
        self.ids.as_ref().map(|ids| ids[distinct])
    }

    fn stored_weight(&self, distinct: usize) -> Option<f32> {
        self.weights.as_ref().map(|weights| weights[distinct])
    }

    fn geometry(&self, distinct: usize) -> Option<Geometry> {
        self.geometries.as_ref().map(|geometries| geometries[distinct])
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            barcodes: self.barcodes.is_some(),
            subreads: self.subreads.is_some(),
            digital: self.is_digital(),
            view: false,
        }
    }

    fn barcodes(&self, distinct: usize, condition: usize) -> Option<Cow<'_, [Barcode]>> {
        self.barcodes.as_ref().map(|barcodes| Cow::Borrowed(barcodes[distinct][condition].as_slice()))
    }

    fn subreads(&self, distinct: usize) -> Option<Cow<'_, Subreads>> {
        self.subreads.as_ref().map(|subreads| Cow::Borrowed(&subreads[distinct]))
    }

    fn has_ids(&self) -> bool {
        self.ids.is_some()
    }

    fn has_weights(&self) -> bool {
        self.weights.is_some()
    }

    fn has_geometry(&self) -> bool {
        self.geometries.is_some()
    }

    fn has_nonzero_information(&self) -> bool {
        match &self.counts {
            Counts::Table(table) => table.has_nonzero_information(),
            Counts::Digital { .. } => true,
        }
    }

    fn nonzero_counts(&self, distinct: usize) -> Vec<(usize, u32)> {
        match &self.counts {
            Counts::Table(table) => table.nonzero_counts(distinct),
            Counts::Digital { present, .. } => present.iter().map(|c| (c as usize, 1)).collect(),
        }
    }
}

impl PartialEq for AlignedReads {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && same_content(self, other)
    }
}

impl Eq for AlignedReads {}

impl Hash for AlignedReads {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Display for AlignedReads {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_debug_text(self, f)
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn dense_and_sparse_records_are_equal() {
        use super::AlignedReads;
        use super::RecordParts;
        use crate::counts::CountTable;
        use crate::variation::Variation;

        let parts = RecordParts {
            variations: vec![vec![Variation::mismatch(3, b'A', b'C', false)], vec![]],
            multiplicities: vec![1, 2],
            ..Default::default()
        };
        let dense = CountTable::dense(3, vec![vec![1, 0, 2], vec![0, 4, 0]]).unwrap();
        let sparse = CountTable::sparse(3, vec![vec![(0, 1), (2, 2)], vec![(1, 4)]]).unwrap();

        let x = AlignedReads::from_table(dense, parts.clone()).unwrap();
        let y = AlignedReads::from_table(sparse, parts).unwrap();
        assert_eq!(x, y);
        assert_eq!(x.content_hash(), y.content_hash());
    }

    #[test]
    fn rejects_unsorted_variations() {
        use super::AlignedReads;
        use super::RecordParts;
        use crate::counts::CountTable;
        use crate::error::ReadsError;
        use crate::variation::Variation;

        let parts = RecordParts {
            variations: vec![vec![Variation::mismatch(9, b'A', b'C', false), Variation::mismatch(3, b'A', b'C', false)]],
            multiplicities: vec![1],
            ..Default::default()
        };
        let counts = CountTable::dense(1, vec![vec![1]]).unwrap();
        assert!(matches!(AlignedReads::from_table(counts, parts), Err(ReadsError::Consistency(_))));
    }

    #[test]
    fn rejects_barcode_count_mismatch() {
        use super::AlignedReads;
        use super::RecordParts;
        use crate::barcode::Barcode;
        use crate::counts::CountTable;

        let parts = RecordParts {
            variations: vec![vec![]],
            multiplicities: vec![1],
            barcodes: Some(vec![vec![vec![Barcode::new("ACGT").unwrap()], vec![]]]),
            ..Default::default()
        };
        let counts = CountTable::dense(2, vec![vec![2, 0]]).unwrap();
        assert!(AlignedReads::from_table(counts, parts).is_err());
    }

    #[test]
    fn digital_counts() {
        use super::AlignedReads;
        use super::RecordParts;
        use crate::access::ReadsAccess;
        use roaring::RoaringBitmap;

        let parts = RecordParts { variations: vec![vec![]], multiplicities: vec![1], ..Default::default() };
        let present: RoaringBitmap = [1_u32, 4].into_iter().collect();
        let record = AlignedReads::from_presence(6, present, parts).unwrap();

        assert!(record.is_digital());
        assert!(record.capabilities().digital);
        assert_eq!(record.count(0, 1), 1);
        assert_eq!(record.count(0, 2), 0);
        assert_eq!(record.nonzero_counts(0), vec![(1, 1), (4, 1)]);
        assert_eq!(record.to_string(), "[1:1,4:1] x1");
    }

    #[test]
    fn debug_text() {
        use super::AlignedReads;
        use super::RecordParts;
        use crate::counts::CountTable;
        use crate::geometry::Geometry;
        use crate::variation::Variation;

        let parts = RecordParts {
            variations: vec![vec![Variation::mismatch(3, b'A', b'C', false), Variation::deletion(8, "TT", true)]],
            multiplicities: vec![2],
            ids: Some(vec![7]),
            weights: Some(vec![0.5]),
            geometries: Some(vec![Geometry::new(10, 5, 10).unwrap()]),
            ..Default::default()
        };
        let counts = CountTable::dense(3, vec![vec![1, 0, 2]]).unwrap();
        let record = AlignedReads::from_table(counts, parts).unwrap();
        assert_eq!(record.to_string(), "7: [1,0,2] x2 w=0.5 g=10/5/10 M3AC D8TTr");
    }
}
