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
use crate::region::ReadRegion;
use crate::trim::Cut;
use crate::trim::Span;
use crate::trim::Trimmed;
use crate::trim::deletion_spans;
use crate::trim::snap_end;
use crate::trim::snap_start;
use crate::trim::softclip_lengths;

/// Removes `start` bases from the 5' end and `end` bases from the 3' end of every read.
///
/// Softclipped bases of the first read count towards the trimmed amount and
/// a cut never splits a deletion. Geometry is not carried over.
///
/// ## Usage
/// ```rust
/// use alnreads::builder::AlignedReadsBuilder;
/// use alnreads::region::GenomicRegion;
/// use alnreads::trim::trim;
///
/// let mut builder = AlignedReadsBuilder::new(1);
/// builder.start();
/// builder.new_distinct_sequence().unwrap();
/// builder.set_count(0, 5).unwrap();
/// let reads = builder.create().unwrap();
///
/// let region: GenomicRegion = "100-140".parse().unwrap();
/// let got: Vec<_> = trim(&reads, &region, 10, 10).map(|x| x.unwrap()).collect();
///
/// assert_eq!(got.len(), 1);
/// assert_eq!(got[0].0.to_string(), "110-130");
/// assert_eq!(got[0].1.to_string(), "[5] x0");
/// ```
pub fn trim<'a, R: ReadRegion>(
    reads: &'a dyn ReadsAccess,
    region: &'a R,
    start: u32,
    end: u32,
) -> Trimmed<'a, R> {
    let length = region.induced_length();

    let mut cuts: Vec<Cut> = Vec::with_capacity(reads.num_distinct());
    for distinct in 0..reads.num_distinct() {
        let (clip_start, clip_end) = softclip_lengths(reads, distinct, Some(false));
        let deletions = deletion_spans(reads, distinct);

        let from = snap_start(&deletions, start.saturating_sub(clip_start));
        let to = snap_end(&deletions, length.saturating_sub(end.saturating_sub(clip_end)));
        if to <= from {
            log::debug!("distinct sequence {} was trimmed away", distinct);
            continue
        }
        let window = Span::new(from, to, (0, length));
        cuts.push(Cut { distinct, window, first: None, second: None, geometry: None });
    }

    Trimmed::new(reads, region, cuts)
}
