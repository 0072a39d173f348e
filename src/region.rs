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

//! Placement of a record on the genome.
//!
//! A record only knows induced coordinates, i.e. offsets into the gapless
//! concatenation of the parts of the region it is mapped to. Trimming needs
//! to turn an induced window back into a region, which is all [ReadRegion]
//! asks for.

use crate::error::ReadsError;
use crate::error::Result;

use std::fmt;
use std::str::FromStr;

pub trait ReadRegion: Sized {
    /// Number of covered positions.
    fn induced_length(&self) -> u32;

    /// Region covering the induced window `[start, end)`.
    fn induced_sub_region(&self, start: u32, end: u32) -> Result<Self>;
}

/// Sorted, non-overlapping half-open parts, e.g. the exons of a spliced read.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GenomicRegion {
    parts: Vec<(u32, u32)>,
}

impl GenomicRegion {
    pub fn new(parts: Vec<(u32, u32)>) -> Result<Self> {
        if parts.is_empty() {
            return Err(ReadsError::consistency("region without parts"));
        }
        if parts.iter().any(|(start, end)| start >= end) {
            return Err(ReadsError::consistency("region parts must not be empty"));
        }
        if parts.windows(2).any(|x| x[0].1 > x[1].0) {
            return Err(ReadsError::consistency("region parts must be sorted and disjoint"));
        }
        Ok(GenomicRegion { parts })
    }

    pub fn parts(&self) -> &[(u32, u32)] {
        &self.parts
    }

    pub fn start(&self) -> u32 {
        self.parts[0].0
    }

    pub fn end(&self) -> u32 {
        self.parts[self.parts.len() - 1].1
    }
}

impl ReadRegion for GenomicRegion {
    fn induced_length(&self) -> u32 {
        self.parts.iter().map(|(start, end)| end - start).sum()
    }

    fn induced_sub_region(&self, start: u32, end: u32) -> Result<Self> {
        if start >= end || end > self.induced_length() {
            return Err(ReadsError::consistency(format!(
                "window [{}, {}) does not fit a region of length {}", start, end, self.induced_length(),
            )));
        }
        let mut parts: Vec<(u32, u32)> = Vec::new();
        let mut offset = 0_u32;
        for (part_start, part_end) in self.parts.iter() {
            let len = part_end - part_start;
            let from = start.max(offset);
            let to = end.min(offset + len);
            if from < to {
                parts.push((part_start + from - offset, part_start + to - offset));
            }
            offset += len;
        }
        GenomicRegion::new(parts)
    }
}

impl fmt::Display for GenomicRegion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, (start, end)) in self.parts.iter().enumerate() {
            if idx > 0 {
                write!(f, "|")?;
            }
            write!(f, "{}-{}", start, end)?;
        }
        Ok(())
    }
}

impl FromStr for GenomicRegion {
    type Err = ReadsError;

    fn from_str(s: &str) -> Result<Self> {
        let parse_error = |reason: &'static str| ReadsError::Parse { input: s.to_string(), reason };

        let mut parts: Vec<(u32, u32)> = Vec::new();
        for part in s.split('|') {
            let (start, end) = part.split_once('-').ok_or_else(|| parse_error("expected start-end"))?;
            let start: u32 = start.trim().parse().map_err(|_| parse_error("invalid start"))?;
            let end: u32 = end.trim().parse().map_err(|_| parse_error("invalid end"))?;
            parts.push((start, end));
        }
        GenomicRegion::new(parts)
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn induced_sub_region_spans_parts() {
        use super::GenomicRegion;
        use super::ReadRegion;

        let region: GenomicRegion = "100-120|200-220".parse().unwrap();
        assert_eq!(region.induced_length(), 40);

        let got = region.induced_sub_region(10, 30).unwrap();
        assert_eq!(got.to_string(), "110-120|200-210");
        assert_eq!(got.induced_length(), 20);

        let got = region.induced_sub_region(25, 40).unwrap();
        assert_eq!(got.parts(), &[(205, 220)]);

        assert!(region.induced_sub_region(30, 41).is_err());
        assert!(region.induced_sub_region(12, 12).is_err());
    }

    #[test]
    fn rejects_malformed_regions() {
        use super::GenomicRegion;

        assert!("10-5".parse::<GenomicRegion>().is_err());
        assert!("10-20|15-30".parse::<GenomicRegion>().is_err());
        assert!("10:20".parse::<GenomicRegion>().is_err());
        assert!(GenomicRegion::new(Vec::new()).is_err());
    }
}
