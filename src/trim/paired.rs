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
use crate::access::ReadsAccess;
use crate::error::ReadsError;
use crate::error::Result;
use crate::geometry::Geometry;
use crate::region::ReadRegion;
use crate::trim::Cut;
use crate::trim::Span;
use crate::trim::Trimmed;
use crate::trim::deletion_spans;
use crate::trim::snap_end;
use crate::trim::snap_start;
use crate::trim::softclip_lengths;

/// Bases to remove from both ends of both mates, in induced orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PairedTrim {
    pub first_start: u32,
    pub first_end: u32,
    pub second_start: u32,
    pub second_end: u32,
}

/// Trims the two mates of every read pair independently.
///
/// The mates are located with the geometry, so every distinct sequence must
/// have one. After cutting, the first mate is pulled back so it never starts
/// after the second, the second never ends before the first, and a gap
/// between the mates is closed by extending the first. If only one mate is
/// left the new geometry describes a single read.
pub fn trim_paired<'a, R: ReadRegion>(
    reads: &'a dyn ReadsAccess,
    region: &'a R,
    trim: &PairedTrim,
) -> Result<Trimmed<'a, R>> {
    let length = region.induced_length();

    let mut cuts: Vec<Cut> = Vec::with_capacity(reads.num_distinct());
    for distinct in 0..reads.num_distinct() {
        let geometry = reads.geometry(distinct).ok_or_else(|| {
            ReadsError::consistency(format!("distinct sequence {} has no geometry to trim read pairs", distinct))
        })?;
        if geometry.total_length() != length {
            return Err(ReadsError::consistency(format!(
                "geometry {} does not cover a region of length {}", geometry, length,
            )));
        }
        let deletions = deletion_spans(reads, distinct);

        let (clip_start, clip_end) = softclip_lengths(reads, distinct, Some(false));
        let first_read = geometry.first_read_span();
        let s1 = snap_start(&deletions, first_read.0 + trim.first_start.saturating_sub(clip_start));
        let e1 = snap_end(&deletions, first_read.1.saturating_sub(trim.first_end.saturating_sub(clip_end)));

        let (clip_start, clip_end) = softclip_lengths(reads, distinct, Some(true));
        let second_read = geometry.second_read_span();
        let s2 = snap_start(&deletions, second_read.0 + trim.second_start.saturating_sub(clip_start));
        let e2 = snap_end(&deletions, second_read.1.saturating_sub(trim.second_end.saturating_sub(clip_end)));

        let cut = match (s1 < e1, s2 < e2) {
            (false, false) => {
                log::debug!("read pair {} was trimmed away", distinct);
                continue
            },
            (true, false) => Cut {
                distinct,
                window: Span::new(s1, e1, (0, length)),
                first: Some(Span::new(s1, e1, first_read)),
                second: Some(Span::empty(e1)),
                geometry: Some(Geometry::new(e1 - s1, 0, 0)?),
            },
            (false, true) => Cut {
                distinct,
                window: Span::new(s2, e2, (0, length)),
                first: Some(Span::empty(s2)),
                second: Some(Span::new(s2, e2, second_read)),
                geometry: Some(Geometry::new(0, 0, e2 - s2)?),
            },
            (true, true) => {
                let s1 = s1.min(s2);
                let e2 = e2.max(e1);
                let e1 = e1.max(s2);
                Cut {
                    distinct,
                    window: Span::new(s1, e2, (0, length)),
                    first: Some(Span::new(s1, e1, first_read)),
                    second: Some(Span::new(s2, e2, second_read)),
                    geometry: Some(Geometry::new(s2 - s1, e1 - s2, e2 - e1)?),
                }
            },
        };
        cuts.push(cut);
    }

    Ok(Trimmed::new(reads, region, cuts))
}

// Tests
#[cfg(test)]
mod tests {
    use crate::builder::AlignedReadsBuilder;
    use crate::geometry::Geometry;
    use crate::record::AlignedReads;
    use crate::variation::Variation;

    fn record(variations: &[Variation]) -> AlignedReads {
        let mut builder = AlignedReadsBuilder::new(2);
        builder.start();
        builder.new_distinct_sequence().unwrap();
        builder.set_count(0, 3).unwrap();
        builder.set_count(1, 1).unwrap();
        builder.set_geometry(Geometry::new(10, 5, 10).unwrap()).unwrap();
        for var in variations {
            builder.add_variation(var.clone()).unwrap();
        }
        builder.create().unwrap()
    }

    #[test]
    fn first_mate_clamped_to_second() {
        use super::{trim_paired, PairedTrim};
        use crate::access::ReadsAccess;
        use crate::region::GenomicRegion;
        use crate::region::ReadRegion;

        let reads = record(&[]);
        let region: GenomicRegion = "0-25".parse().unwrap();
        let trim = PairedTrim { first_start: 12, ..Default::default() };

        let got: Vec<_> = trim_paired(&reads, &region, &trim).unwrap().map(|x| x.unwrap()).collect();
        assert_eq!(got.len(), 1);
        let (region, record) = &got[0];
        assert_eq!(region.parts(), &[(10, 25)]);

        let geometry = record.geometry(0).unwrap();
        assert_eq!((geometry.before(), geometry.overlap(), geometry.after()), (0, 5, 10));
        assert_eq!(geometry.total_length(), region.induced_length());
        assert_eq!(record.count(0, 0), 3);
        assert_eq!(record.count(0, 1), 1);
    }

    #[test]
    fn gap_between_mates_is_closed() {
        use super::{trim_paired, PairedTrim};
        use crate::access::ReadsAccess;
        use crate::region::GenomicRegion;

        let reads = record(&[]);
        let region: GenomicRegion = "0-25".parse().unwrap();
        let trim = PairedTrim { first_end: 10, ..Default::default() };

        let got: Vec<_> = trim_paired(&reads, &region, &trim).unwrap().map(|x| x.unwrap()).collect();
        let geometry = got[0].1.geometry(0).unwrap();
        assert_eq!((geometry.before(), geometry.overlap(), geometry.after()), (10, 0, 10));
    }

    #[test]
    fn single_mate_left() {
        use super::{trim_paired, PairedTrim};
        use crate::access::ReadsAccess;
        use crate::region::GenomicRegion;

        let reads = record(&[]);
        let region: GenomicRegion = "0-25".parse().unwrap();

        let trim = PairedTrim { first_start: 15, ..Default::default() };
        let got: Vec<_> = trim_paired(&reads, &region, &trim).unwrap().map(|x| x.unwrap()).collect();
        assert_eq!(got[0].0.parts(), &[(10, 25)]);
        let geometry = got[0].1.geometry(0).unwrap();
        assert_eq!((geometry.before(), geometry.overlap(), geometry.after()), (0, 0, 15));

        let trim = PairedTrim { second_end: 15, first_start: 2, ..Default::default() };
        let got: Vec<_> = trim_paired(&reads, &region, &trim).unwrap().map(|x| x.unwrap()).collect();
        assert_eq!(got[0].0.parts(), &[(2, 15)]);
        let geometry = got[0].1.geometry(0).unwrap();
        assert_eq!((geometry.before(), geometry.overlap(), geometry.after()), (13, 0, 0));

        let trim = PairedTrim { first_start: 15, second_end: 15, ..Default::default() };
        assert_eq!(trim_paired(&reads, &region, &trim).unwrap().count(), 0);
    }

    #[test]
    fn variations_follow_their_mate() {
        use super::{trim_paired, PairedTrim};
        use crate::access::ReadsAccess;
        use crate::region::GenomicRegion;

        let reads = record(&[
            Variation::mismatch(12, b'A', b'C', false),
            Variation::mismatch(12, b'A', b'G', true),
            Variation::mismatch(20, b'T', b'C', true),
        ]);
        let region: GenomicRegion = "0-25".parse().unwrap();
        let trim = PairedTrim { second_start: 5, ..Default::default() };

        let got: Vec<_> = trim_paired(&reads, &region, &trim).unwrap().map(|x| x.unwrap()).collect();
        let (region, record) = &got[0];
        assert_eq!(region.parts(), &[(0, 25)]);
        assert_eq!(
            record.variations(0).into_owned(),
            vec![Variation::mismatch(12, b'A', b'C', false), Variation::mismatch(20, b'T', b'C', true)],
        );
        let geometry = record.geometry(0).unwrap();
        assert_eq!((geometry.before(), geometry.overlap(), geometry.after()), (15, 0, 10));
    }

    #[test]
    fn first_mate_variations_stay_in_the_first_mate() {
        use super::{trim_paired, PairedTrim};
        use crate::access::ReadsAccess;
        use crate::region::GenomicRegion;

        let reads = record(&[
            Variation::mismatch(13, b'A', b'C', false),
            Variation::mismatch(13, b'A', b'G', true),
        ]);
        let region: GenomicRegion = "0-25".parse().unwrap();

        let trim = PairedTrim { first_end: 3, ..Default::default() };
        let got: Vec<_> = trim_paired(&reads, &region, &trim).unwrap().map(|x| x.unwrap()).collect();
        let (got_region, got_record) = &got[0];
        assert_eq!(got_region.parts(), &[(0, 25)]);
        assert_eq!(got_record.variations(0).into_owned(), vec![Variation::mismatch(13, b'A', b'G', true)]);
        let geometry = got_record.geometry(0).unwrap();
        assert_eq!((geometry.before(), geometry.overlap(), geometry.after()), (10, 2, 13));

        // the first mate is gone entirely
        let reads = record(&[Variation::mismatch(12, b'A', b'C', false)]);
        let trim = PairedTrim { first_start: 15, ..Default::default() };
        let got: Vec<_> = trim_paired(&reads, &region, &trim).unwrap().map(|x| x.unwrap()).collect();
        let (got_region, got_record) = &got[0];
        assert_eq!(got_region.parts(), &[(10, 25)]);
        assert!(got_record.variations(0).is_empty());
        let geometry = got_record.geometry(0).unwrap();
        assert_eq!((geometry.before(), geometry.overlap(), geometry.after()), (0, 0, 15));
    }

    #[test]
    fn needs_geometry() {
        use super::{trim_paired, PairedTrim};
        use crate::error::ReadsError;
        use crate::region::GenomicRegion;

        let mut builder = AlignedReadsBuilder::new(1);
        builder.start();
        builder.new_distinct_sequence().unwrap();
        builder.set_count(0, 1).unwrap();
        let reads = builder.create().unwrap();
        let region: GenomicRegion = "0-25".parse().unwrap();

        let got = trim_paired(&reads, &region, &PairedTrim::default());
        assert!(matches!(got, Err(ReadsError::Consistency(_))));

        // geometry must cover the region
        let reads = record(&[]);
        let region: GenomicRegion = "0-30".parse().unwrap();
        assert!(trim_paired(&reads, &region, &PairedTrim::default()).is_err());
    }
}
