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

//! alnreads is a library and a command-line client for storing the reads
//! aligned to one genomic location across many conditions.
//!
//! Reads with the same sequence relative to the reference are collapsed into
//! one distinct sequence that carries:
//!
//!   - a count per condition, stored densely or sparsely,
//!   - the sorted list of its [variations](variation::Variation) (mismatches, insertions, deletions and softclips),
//!   - a multiplicity, i.e. the number of locations the reads map to,
//!   - and optionally an id, a weight, a paired-end [geometry](geometry::Geometry),
//!     per condition [barcodes](barcode::Barcode) and a [subread structure](subreads::Subreads).
//!
//! All distinct sequences of one location form an [AlignedReads] record.
//!
//! ## Usage
//!
//! ### Command line
//!
//! The alnreads CLI supports the following subcommands:
//!   - `alnreads inspect` print encoded records in their text form.
//!   - `alnreads recode` re-encode records with a different count layout, optionally gzipped.
//!
//! The records do not describe themselves, so the dataset context (number of
//! conditions, which optional fields are present and the count layout) must
//! be given on the command line.
//!
//! ### Rust API
//!
//! Records are created with an [AlignedReadsBuilder] and read through the
//! [ReadsAccess] trait, which is also implemented by the lazy
//! [views](views) over a record.
//!
//! For use cases requiring access to a single record at a time, the following
//! structs are provided:
//!
//!   - [RecordEncoder](encoder::RecordEncoder): takes an iterator over [AlignedReads] and encodes each into a Vec<u8>.
//!   - [RecordDecoder](decoder::RecordDecoder): takes a [BufRead] containing the encoded bytes and decodes them into [AlignedReads].
//!
//! The functions in this module process an entire stream. Gzip compressed
//! streams can be read and written with the [compression] module.
//!
//! Records can be cut to a shorter region with [trim::trim] and
//! [trim::trim_paired].
//!
//! ## Format specification
//!
//! A stream is the concatenation of its encoded records with no header. The
//! encoding of one record is documented in [codec].
//!

use std::io::BufRead;
use std::io::Write;

pub mod access;
pub mod barcode;
pub mod builder;
pub mod codec;
pub mod compression;
pub mod config;
pub mod context;
pub mod counts;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod geometry;
pub mod record;
pub mod region;
pub mod subreads;
pub mod trim;
pub mod variation;
pub mod views;

pub use access::ReadsAccess;
pub use builder::AlignedReadsBuilder;
pub use context::GlobalInfo;
pub use error::ReadsError;
pub use error::Result;
pub use record::AlignedReads;

use decoder::RecordDecoder;
use encoder::RecordEncoder;

/// Encode from memory to something that implements [Write](std::io::Write).
///
/// Returns the number of bytes written.
///
/// ## Usage
/// ```rust
/// use alnreads::{decode_from_read, encode_to_write};
/// use alnreads::{AlignedReadsBuilder, GlobalInfo};
/// use alnreads::variation::Variation;
/// use std::io::{Cursor, Seek};
///
/// let mut builder = AlignedReadsBuilder::new(2);
/// builder.start();
/// builder.new_distinct_sequence().unwrap();
/// builder.set_count(0, 3).unwrap();
/// builder.add_variation(Variation::mismatch(12, b'A', b'G', false)).unwrap();
/// builder.new_distinct_sequence().unwrap();
/// builder.set_count(1, 1).unwrap();
/// let data = vec![builder.create().unwrap()];
///
/// let info = GlobalInfo { num_conditions: Some(2), ..Default::default() };
///
/// // Encode to `output`
/// let mut output: Cursor<Vec<u8>> = Cursor::new(Vec::new());
/// encode_to_write(&info, &data, &mut output).unwrap();
///
/// // `output` can be decoded with the same context to get the original data back
/// output.rewind().unwrap();
/// let decoded_data = decode_from_read(&info, &mut output).unwrap();
///
/// assert_eq!(decoded_data, data);
/// ```
///
pub fn encode_to_write<W: Write>(
    info: &GlobalInfo,
    records: &[AlignedReads],
    conn_out: &mut W,
) -> Result<usize> {
    let mut iter = records.iter().cloned();
    let mut encoder = RecordEncoder::new(&mut iter, info);
    for bytes in encoder.by_ref() {
        conn_out.write_all(&bytes?)?;
    }
    conn_out.flush()?;
    log::debug!("encoded {} records in {} bytes", encoder.records_written(), encoder.bytes_written());
    Ok(encoder.bytes_written())
}

/// Decode every record from something that implements [BufRead](std::io::BufRead).
///
/// Reads until the end of the input, or `info.record_count` records if set.
///
/// ## Usage
/// See [encode_to_write].
///
pub fn decode_from_read<R: BufRead>(
    info: &GlobalInfo,
    conn_in: &mut R,
) -> Result<Vec<AlignedReads>> {
    let records = RecordDecoder::new(conn_in, info).collect::<Result<Vec<AlignedReads>>>()?;
    log::debug!("decoded {} records", records.len());
    Ok(records)
}

/// Decode records with `info_in` and write them back encoded with `info_out`.
///
/// Records are processed one at a time. Returns the number of records.
///
/// ## Usage
/// ```rust
/// use alnreads::{decode_from_read, encode_to_write, recode_from_read_to_write};
/// use alnreads::{AlignedReadsBuilder, GlobalInfo};
/// use alnreads::context::SparseMode;
/// use std::io::Cursor;
///
/// let mut builder = AlignedReadsBuilder::new(8);
/// builder.start();
/// builder.new_distinct_sequence().unwrap();
/// builder.set_count(6, 2).unwrap();
/// let data = vec![builder.create().unwrap()];
///
/// let dense = GlobalInfo { num_conditions: Some(8), ..Default::default() };
/// let sparse = GlobalInfo { sparse_mode: SparseMode::Supersparse, ..dense.clone() };
///
/// let mut input: Vec<u8> = Vec::new();
/// encode_to_write(&dense, &data, &mut input).unwrap();
///
/// let mut output: Vec<u8> = Vec::new();
/// recode_from_read_to_write(&dense, &sparse, &mut Cursor::new(input.clone()), &mut output).unwrap();
///
/// // only the nonzero count is written
/// assert!(output.len() < input.len());
/// assert_eq!(decode_from_read(&sparse, &mut Cursor::new(output)).unwrap(), data);
/// ```
///
pub fn recode_from_read_to_write<R: BufRead, W: Write>(
    info_in: &GlobalInfo,
    info_out: &GlobalInfo,
    conn_in: &mut R,
    conn_out: &mut W,
) -> Result<u64> {
    let mut decoder = RecordDecoder::new(conn_in, info_in);
    for record in decoder.by_ref() {
        codec::serialize(&record?, info_out, conn_out)?;
    }
    conn_out.flush()?;
    Ok(decoder.records_read())
}
