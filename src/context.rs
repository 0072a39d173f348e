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

//! Dataset-wide context shared by every record of a dataset.
//!
//! The [codec](crate::codec) writes a field only if the [GlobalInfo] says the
//! dataset has it, so the same context must be used to encode and to decode.
//! How the context itself is stored is up to the storage engine.

use crate::access::ReadsAccess;
use crate::config::SparsePolicy;
use crate::error::ReadsError;
use crate::error::Result;

/// Layout of the counts in the byte stream.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SparseMode {
    /// Every count, row by row.
    #[default]
    Dense,
    /// Nonzero counts of the whole record indexed by `distinct * conditions + condition`.
    SparseGlobal,
    /// Nonzero counts of each distinct sequence.
    Supersparse,
}

impl std::str::FromStr for SparseMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dense" => Ok(SparseMode::Dense),
            "sparse" => Ok(SparseMode::SparseGlobal),
            "supersparse" => Ok(SparseMode::Supersparse),
            _ => Err(format!("'{}' is not a valid SparseMode", s)),
        }
    }
}

impl SparseMode {
    /// True for the modes that decode into sparse count storage.
    pub fn is_sparse(&self) -> bool {
        !matches!(self, SparseMode::Dense)
    }
}

/// Whether records carry barcodes and how long they are.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BarcodeLayout {
    #[default]
    None,
    /// Every barcode of the dataset has this length.
    Fixed(usize),
    /// The length is written with each record.
    PerRecord,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlobalInfo {
    pub has_id: bool,
    pub has_weight: bool,
    pub has_geometry: bool,
    pub has_subreads: bool,
    /// Number of conditions of every record, None if written per record.
    pub num_conditions: Option<usize>,
    pub sparse_mode: SparseMode,
    pub barcodes: BarcodeLayout,
    /// Number of records in the dataset, None if unknown.
    pub record_count: Option<u64>,
}

impl GlobalInfo {
    /// Context for `num_conditions` conditions with the count layout chosen by `policy`.
    pub fn new(num_conditions: usize, policy: &SparsePolicy) -> Self {
        GlobalInfo {
            num_conditions: Some(num_conditions),
            sparse_mode: if policy.is_sparse(num_conditions) { SparseMode::SparseGlobal } else { SparseMode::Dense },
            ..Default::default()
        }
    }

    /// Context that writes every field `reads` carries.
    pub fn describe(reads: &dyn ReadsAccess, policy: &SparsePolicy) -> Self {
        let capabilities = reads.capabilities();
        let barcodes = if capabilities.barcodes { BarcodeLayout::PerRecord } else { BarcodeLayout::None };
        GlobalInfo {
            has_id: reads.has_ids(),
            has_weight: reads.has_weights(),
            has_geometry: reads.has_geometry(),
            has_subreads: capabilities.subreads,
            barcodes,
            ..GlobalInfo::new(reads.num_conditions(), policy)
        }
    }

    /// Checks that a record with `num_conditions` conditions fits the context.
    pub fn check_conditions(&self, num_conditions: usize) -> Result<()> {
        match self.num_conditions {
            Some(expected) if expected != num_conditions => Err(ReadsError::consistency(format!(
                "record has {} conditions, the dataset {}", num_conditions, expected,
            ))),
            _ => Ok(()),
        }
    }
}
