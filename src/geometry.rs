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

//! Paired-end geometry.
//!
//! A fragment covered by two reads is described by three lengths: the bases
//! covered by the first read only (`before`), by both reads (`overlap`) and by
//! the second read only (`after`). In induced coordinates the first read spans
//! `[0, before + overlap)` and the second read spans `[before, total)`.

use crate::error::ReadsError;
use crate::error::Result;

use std::fmt;

/// Largest value of a single geometry field.
pub const MAX_GEOMETRY_FIELD: u32 = 1023;

const FIELD_BITS: u32 = 10;
const FIELD_MASK: u32 = 0x3FF;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Geometry {
    before: u32,
    overlap: u32,
    after: u32,
}

impl Geometry {
    pub fn new(before: u32, overlap: u32, after: u32) -> Result<Self> {
        for (what, value) in [("geometry before", before), ("geometry overlap", overlap), ("geometry after", after)] {
            if value > MAX_GEOMETRY_FIELD {
                return Err(ReadsError::range(what, value, MAX_GEOMETRY_FIELD));
            }
        }
        Ok(Geometry { before, overlap, after })
    }

    /// Like [new](Geometry::new) but also checks that the fields sum to `mapped_length`.
    pub fn checked(before: u32, overlap: u32, after: u32, mapped_length: u32) -> Result<Self> {
        let geometry = Geometry::new(before, overlap, after)?;
        if geometry.total_length() != mapped_length {
            return Err(ReadsError::consistency(format!(
                "geometry {} sums to {} but the mapped length is {}", geometry, geometry.total_length(), mapped_length,
            )));
        }
        Ok(geometry)
    }

    pub fn before(&self) -> u32 {
        self.before
    }

    pub fn overlap(&self) -> u32 {
        self.overlap
    }

    pub fn after(&self) -> u32 {
        self.after
    }

    pub fn total_length(&self) -> u32 {
        self.before + self.overlap + self.after
    }

    /// Induced span `[start, end)` of the first read.
    pub fn first_read_span(&self) -> (u32, u32) {
        (0, self.before + self.overlap)
    }

    /// Induced span `[start, end)` of the second read.
    pub fn second_read_span(&self) -> (u32, u32) {
        (self.before, self.total_length())
    }

    pub fn encode(&self) -> u32 {
        (self.after << (2 * FIELD_BITS)) | (self.overlap << FIELD_BITS) | self.before
    }

    pub fn decode(packed: u32) -> Result<Self> {
        if packed >> (3 * FIELD_BITS) != 0 {
            return Err(ReadsError::consistency(format!("packed geometry {:#x} has stray high bits", packed)));
        }
        Ok(Geometry {
            before: packed & FIELD_MASK,
            overlap: (packed >> FIELD_BITS) & FIELD_MASK,
            after: (packed >> (2 * FIELD_BITS)) & FIELD_MASK,
        })
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}/{}", self.before, self.overlap, self.after)
    }
}
