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

//! Binary encoding of a single record.
//!
//! The fields of a record are written in this order, each only if the
//! [GlobalInfo] says the dataset has it:
//!
//!   1. number of distinct sequences
//!   2. number of conditions, unless fixed by the context
//!   3. counts, laid out according to [SparseMode]
//!   4. per distinct: number of variations, then each variation's 16 bit tag
//!      and payload (length prefixed except for mismatches, which always
//!      have 2 bytes)
//!   5. multiplicities
//!   6. ids
//!   7. weights as f32
//!   8. packed geometries
//!   9. barcode length unless fixed by the context, then one 2 bit packed
//!      barcode per read, ordered by distinct and condition
//!  10. subread structures: number of subreads, each id and all but the last
//!      end, then the number of gaps and their positions
//!
//! Integers are [bincode] standard varints. The variation tag is always
//! written in 2 bytes.
//!
//! ## Usage
//!
//! ```rust
//! use alnreads::builder::AlignedReadsBuilder;
//! use alnreads::codec::{deserialize, serialize};
//! use alnreads::config::SparsePolicy;
//! use alnreads::context::GlobalInfo;
//! use alnreads::variation::Variation;
//! use std::io::Cursor;
//!
//! let mut builder = AlignedReadsBuilder::new(3);
//! builder.start();
//! builder.new_distinct_sequence().unwrap();
//! builder.set_count(1, 4).unwrap();
//! builder.set_multiplicity(1).unwrap();
//! builder.add_variation(Variation::deletion(10, "AC", false)).unwrap();
//! let record = builder.create().unwrap();
//!
//! let info = GlobalInfo::new(3, &SparsePolicy::default());
//! let mut bytes: Vec<u8> = Vec::new();
//! serialize(&record, &info, &mut bytes).unwrap();
//!
//! let got = deserialize(&info, &mut Cursor::new(bytes)).unwrap();
//! assert_eq!(got, record);
//! ```

use crate::access::ReadsAccess;
use crate::barcode::Barcode;
use crate::barcode::MAX_BARCODE_LENGTH;
use crate::context::BarcodeLayout;
use crate::context::GlobalInfo;
use crate::context::SparseMode;
use crate::counts::CountTable;
use crate::error::ReadsError;
use crate::error::Result;
use crate::geometry::Geometry;
use crate::record::AlignedReads;
use crate::record::RecordParts;
use crate::subreads::Subreads;
use crate::variation::Variation;
use crate::variation::VariationType;

use std::io::Read;
use std::io::Write;

use bincode::decode_from_std_read;
use bincode::encode_into_std_write;

fn write_int<W: Write>(value: u64, conn: &mut W) -> Result<usize> {
    Ok(encode_into_std_write(value, conn, bincode::config::standard())?)
}

fn read_int<R: Read>(conn: &mut R) -> Result<u64> {
    Ok(decode_from_std_read(conn, bincode::config::standard())?)
}

fn read_usize<R: Read>(conn: &mut R) -> Result<usize> {
    let value = read_int(conn)?;
    usize::try_from(value).map_err(|_| ReadsError::consistency(format!("{} does not fit in usize", value)))
}

fn read_u32<R: Read>(conn: &mut R, what: &'static str) -> Result<u32> {
    let value = read_int(conn)?;
    u32::try_from(value).map_err(|_| ReadsError::range(what, value, u32::MAX))
}

fn write_tag<W: Write>(tag: u16, conn: &mut W) -> Result<usize> {
    Ok(encode_into_std_write(tag, conn, bincode::config::standard().with_fixed_int_encoding())?)
}

fn read_tag<R: Read>(conn: &mut R) -> Result<u16> {
    Ok(decode_from_std_read(conn, bincode::config::standard().with_fixed_int_encoding())?)
}

fn write_bytes<W: Write>(bytes: &[u8], conn: &mut W) -> Result<usize> {
    Ok(encode_into_std_write(bytes, conn, bincode::config::standard())?)
}

fn read_bytes<R: Read>(conn: &mut R) -> Result<Vec<u8>> {
    Ok(decode_from_std_read(conn, bincode::config::standard())?)
}

fn missing(what: &str, distinct: usize) -> ReadsError {
    ReadsError::consistency(format!("the dataset has {} but distinct sequence {} does not", what, distinct))
}

/// Writes `reads` to `conn` as laid out by `info`.
///
/// Returns the number of bytes written. Fields the record carries but the
/// context does not ask for are not written. Ids, geometries, barcodes and
/// subread structures the context asks for but the record lacks are an
/// error; missing weights are written as [weight](ReadsAccess::weight).
pub fn serialize<W: Write>(
    reads: &dyn ReadsAccess,
    info: &GlobalInfo,
    conn: &mut W,
) -> Result<usize> {
    let num_distinct = reads.num_distinct();
    let num_conditions = reads.num_conditions();
    if num_distinct == 0 {
        return Err(ReadsError::consistency("record without distinct sequences"));
    }
    info.check_conditions(num_conditions)?;

    let mut nbytes = write_int(num_distinct as u64, conn)?;
    if info.num_conditions.is_none() {
        nbytes += write_int(num_conditions as u64, conn)?;
    }

    // Counts
    match info.sparse_mode {
        SparseMode::Dense => {
            for d in 0..num_distinct {
                for c in 0..num_conditions {
                    nbytes += write_int(reads.count(d, c) as u64, conn)?;
                }
            }
        },
        SparseMode::SparseGlobal => {
            let nonzero: Vec<(u64, u32)> = (0..num_distinct).flat_map(|d| {
                reads.nonzero_counts(d).into_iter().map(move |(c, x)| ((d * num_conditions + c) as u64, x))
            }).collect();
            nbytes += write_int(nonzero.len() as u64, conn)?;
            for (index, count) in nonzero {
                nbytes += write_int(index, conn)?;
                nbytes += write_int(count as u64, conn)?;
            }
        },
        SparseMode::Supersparse => {
            for d in 0..num_distinct {
                let nonzero = reads.nonzero_counts(d);
                nbytes += write_int(nonzero.len() as u64, conn)?;
                for (condition, count) in nonzero {
                    nbytes += write_int(condition as u64, conn)?;
                    nbytes += write_int(count as u64, conn)?;
                }
            }
        },
    }

    // Variations
    for d in 0..num_distinct {
        let variations = reads.variations(d);
        nbytes += write_int(variations.len() as u64, conn)?;
        for var in variations.iter() {
            let (tag, payload) = var.encode()?;
            nbytes += write_tag(tag, conn)?;
            if var.variation_type() == VariationType::Mismatch {
                conn.write_all(&payload)?;
                nbytes += payload.len();
            } else {
                nbytes += write_bytes(&payload, conn)?;
            }
        }
    }

    for d in 0..num_distinct {
        nbytes += write_int(reads.multiplicity(d) as u64, conn)?;
    }

    if info.has_id {
        for d in 0..num_distinct {
            let id = reads.id(d).ok_or_else(|| missing("ids", d))?;
            nbytes += write_int(id as u64, conn)?;
        }
    }

    if info.has_weight {
        for d in 0..num_distinct {
            nbytes += encode_into_std_write(reads.weight(d), conn, bincode::config::standard())?;
        }
    }

    if info.has_geometry {
        for d in 0..num_distinct {
            let geometry = reads.geometry(d).ok_or_else(|| missing("geometries", d))?;
            nbytes += write_int(geometry.encode() as u64, conn)?;
        }
    }

    if info.barcodes != BarcodeLayout::None {
        nbytes += serialize_barcodes(reads, info, conn)?;
    }

    if info.has_subreads {
        for d in 0..num_distinct {
            let subreads = reads.subreads(d).ok_or_else(|| missing("subread structures", d))?;
            nbytes += write_int(subreads.num_subreads() as u64, conn)?;
            for (idx, id) in subreads.ids().iter().enumerate() {
                nbytes += write_int(*id as u64, conn)?;
                if let Some(end) = subreads.inner_ends().get(idx) {
                    nbytes += write_int(*end as u64, conn)?;
                }
            }
            nbytes += write_int(subreads.gaps().len() as u64, conn)?;
            for gap in subreads.gaps() {
                nbytes += write_int(*gap as u64, conn)?;
            }
        }
    }

    Ok(nbytes)
}

fn serialize_barcodes<W: Write>(
    reads: &dyn ReadsAccess,
    info: &GlobalInfo,
    conn: &mut W,
) -> Result<usize> {
    if !reads.capabilities().barcodes {
        return Err(missing("barcodes", 0));
    }

    let mut lists: Vec<Vec<Barcode>> = Vec::new();
    for d in 0..reads.num_distinct() {
        for (c, _) in reads.nonzero_counts(d) {
            let list = reads.barcodes(d, c).ok_or_else(|| missing("barcodes", d))?;
            lists.push(list.into_owned());
        }
    }
    let length = match info.barcodes {
        BarcodeLayout::Fixed(length) => length,
        _ => lists.iter().flatten().next().map(|x| x.len()).unwrap_or(0),
    };
    if let Some(barcode) = lists.iter().flatten().find(|x| x.len() != length) {
        return Err(ReadsError::consistency(format!(
            "barcode {} does not have the dataset's length {}", barcode, length,
        )));
    }

    let mut nbytes = 0;
    if info.barcodes == BarcodeLayout::PerRecord {
        nbytes += write_int(length as u64, conn)?;
    }
    for barcode in lists.iter().flatten() {
        let packed = barcode.pack();
        conn.write_all(&packed)?;
        nbytes += packed.len();
    }
    Ok(nbytes)
}

// Counts as read. Rows are laid out only after the distinct sequences
// themselves have been read, so a corrupt length cannot size an allocation.
enum WireCounts {
    Dense(Vec<u32>),
    Flat(Vec<(u64, u32)>),
    Rows(Vec<Vec<(u32, u32)>>),
}

impl WireCounts {
    fn into_table(
        self,
        num_distinct: usize,
        num_conditions: usize,
    ) -> Result<CountTable> {
        match self {
            WireCounts::Dense(flat) => {
                let rows: Vec<Vec<u32>> = if num_conditions == 0 {
                    (0..num_distinct).map(|_| Vec::new()).collect()
                } else {
                    flat.chunks(num_conditions).map(|row| row.to_vec()).collect()
                };
                CountTable::dense(num_conditions, rows)
            },
            WireCounts::Flat(entries) => {
                let mut rows: Vec<Vec<(u32, u32)>> = (0..num_distinct).map(|_| Vec::new()).collect();
                for (index, count) in entries {
                    let d = index.checked_div(num_conditions as u64).unwrap_or(u64::MAX);
                    if d >= num_distinct as u64 {
                        return Err(ReadsError::consistency(format!(
                            "count index {} out of range for {} distinct sequences and {} conditions",
                            index, num_distinct, num_conditions,
                        )));
                    }
                    rows[d as usize].push(((index % num_conditions as u64) as u32, count));
                }
                CountTable::sparse(num_conditions, rows)
            },
            WireCounts::Rows(rows) => CountTable::sparse(num_conditions, rows),
        }
    }
}

fn deserialize_counts<R: Read>(
    info: &GlobalInfo,
    num_distinct: usize,
    num_conditions: usize,
    conn: &mut R,
) -> Result<WireCounts> {
    match info.sparse_mode {
        SparseMode::Dense => {
            let num_counts = num_distinct.checked_mul(num_conditions).ok_or_else(|| {
                ReadsError::range("number of counts", u64::MAX, usize::MAX as u64)
            })?;
            let mut flat: Vec<u32> = Vec::new();
            for _ in 0..num_counts {
                flat.push(read_u32(conn, "count")?);
            }
            Ok(WireCounts::Dense(flat))
        },
        SparseMode::SparseGlobal => {
            let num_nonzero = read_usize(conn)?;
            let mut entries: Vec<(u64, u32)> = Vec::new();
            for _ in 0..num_nonzero {
                let index = read_int(conn)?;
                let count = read_u32(conn, "count")?;
                entries.push((index, count));
            }
            Ok(WireCounts::Flat(entries))
        },
        SparseMode::Supersparse => {
            let mut rows: Vec<Vec<(u32, u32)>> = Vec::new();
            for _ in 0..num_distinct {
                let num_nonzero = read_usize(conn)?;
                let mut row: Vec<(u32, u32)> = Vec::new();
                for _ in 0..num_nonzero {
                    let condition = read_u32(conn, "condition")?;
                    let count = read_u32(conn, "count")?;
                    row.push((condition, count));
                }
                rows.push(row);
            }
            Ok(WireCounts::Rows(rows))
        },
    }
}

fn deserialize_barcodes<R: Read>(
    info: &GlobalInfo,
    counts: &CountTable,
    conn: &mut R,
) -> Result<Vec<Vec<Vec<Barcode>>>> {
    let length = match info.barcodes {
        BarcodeLayout::Fixed(length) => length,
        _ => read_usize(conn)?,
    };
    if length > MAX_BARCODE_LENGTH {
        return Err(ReadsError::range("barcode length", length as u64, MAX_BARCODE_LENGTH as u64));
    }
    let mut packed: Vec<u8> = vec![0; Barcode::packed_len(length)];

    let mut barcodes: Vec<Vec<Vec<Barcode>>> = Vec::new();
    for d in 0..counts.num_distinct() {
        let mut observed: Vec<(usize, Vec<Barcode>)> = Vec::new();
        for (c, count) in counts.nonzero_counts(d) {
            let mut list: Vec<Barcode> = Vec::new();
            for _ in 0..count {
                conn.read_exact(&mut packed)?;
                list.push(Barcode::unpack(&packed, length)?);
            }
            observed.push((c, list));
        }

        let mut per_condition: Vec<Vec<Barcode>> = Vec::new();
        per_condition.try_reserve_exact(counts.num_conditions()).map_err(|_| {
            ReadsError::consistency(format!("cannot hold barcodes for {} conditions", counts.num_conditions()))
        })?;
        per_condition.resize_with(counts.num_conditions(), Vec::new);
        for (c, list) in observed {
            per_condition[c] = list;
        }
        barcodes.push(per_condition);
    }
    Ok(barcodes)
}

/// Reads one record written by [serialize] with the same `info`.
///
/// Lengths read from the input are checked against their bounds before they
/// size anything; the number of distinct sequences and of conditions must fit
/// in 32 bits.
pub fn deserialize<R: Read>(
    info: &GlobalInfo,
    conn: &mut R,
) -> Result<AlignedReads> {
    let num_distinct = read_u32(conn, "number of distinct sequences")? as usize;
    if num_distinct == 0 {
        return Err(ReadsError::consistency("record without distinct sequences"));
    }
    let num_conditions = match info.num_conditions {
        Some(num_conditions) => num_conditions,
        None => read_u32(conn, "number of conditions")? as usize,
    };

    let counts = deserialize_counts(info, num_distinct, num_conditions, conn)?;

    let mut parts = RecordParts::default();
    for _ in 0..num_distinct {
        let num_variations = read_usize(conn)?;
        let mut variations: Vec<Variation> = Vec::new();
        for _ in 0..num_variations {
            let tag = read_tag(conn)?;
            let payload = match VariationType::from_code(tag >> 13)? {
                VariationType::Mismatch => {
                    let mut payload: Vec<u8> = vec![0; 2];
                    conn.read_exact(&mut payload)?;
                    payload
                },
                _ => read_bytes(conn)?,
            };
            variations.push(Variation::decode(tag, &payload)?);
        }
        parts.variations.push(variations);
    }

    for _ in 0..num_distinct {
        parts.multiplicities.push(read_u32(conn, "multiplicity")?);
    }
    let counts = counts.into_table(num_distinct, num_conditions)?;

    if info.has_id {
        let mut ids: Vec<u32> = Vec::new();
        for _ in 0..num_distinct {
            ids.push(read_u32(conn, "id")?);
        }
        parts.ids = Some(ids);
    }

    if info.has_weight {
        let mut weights: Vec<f32> = Vec::new();
        for _ in 0..num_distinct {
            weights.push(decode_from_std_read(conn, bincode::config::standard())?);
        }
        parts.weights = Some(weights);
    }

    if info.has_geometry {
        let mut geometries: Vec<Geometry> = Vec::new();
        for _ in 0..num_distinct {
            geometries.push(Geometry::decode(read_u32(conn, "geometry")?)?);
        }
        parts.geometries = Some(geometries);
    }

    if info.barcodes != BarcodeLayout::None {
        parts.barcodes = Some(deserialize_barcodes(info, &counts, conn)?);
    }

    if info.has_subreads {
        let mut subreads: Vec<Subreads> = Vec::new();
        for _ in 0..num_distinct {
            let num_subreads = read_usize(conn)?;
            let mut ids: Vec<u8> = Vec::new();
            let mut ends: Vec<u32> = Vec::new();
            for idx in 0..num_subreads {
                let id = read_int(conn)?;
                ids.push(u8::try_from(id).map_err(|_| ReadsError::range("subread id", id, u8::MAX))?);
                if idx + 1 < num_subreads {
                    ends.push(read_u32(conn, "subread end")?);
                }
            }
            let num_gaps = read_usize(conn)?;
            let mut gaps: Vec<u32> = Vec::new();
            for _ in 0..num_gaps {
                gaps.push(read_u32(conn, "gap position")?);
            }
            subreads.push(Subreads::new(ids, ends, gaps)?);
        }
        parts.subreads = Some(subreads);
    }

    AlignedReads::from_table(counts, parts)
}

// Tests
#[cfg(test)]
mod tests {
    use crate::barcode::Barcode;
    use crate::builder::AlignedReadsBuilder;
    use crate::geometry::Geometry;
    use crate::record::AlignedReads;
    use crate::variation::Variation;

    fn record(num_conditions: usize) -> AlignedReads {
        let mut builder = AlignedReadsBuilder::new(num_conditions);
        builder.start();

        builder.new_distinct_sequence().unwrap();
        builder.set_count(0, 3).unwrap();
        builder.set_count(num_conditions - 1, 1).unwrap();
        builder.add_variation(Variation::mismatch(4, b'N', b'N', false)).unwrap();
        builder.add_variation(Variation::softclip(false, "ACG", false)).unwrap();
        builder.add_variation(Variation::insertion(2047, "T", true)).unwrap();
        builder.set_multiplicity(2).unwrap();
        builder.set_id(5).unwrap();
        builder.set_weight(0.25).unwrap();
        builder.set_geometry(Geometry::new(10, 5, 10).unwrap()).unwrap();

        builder.new_distinct_sequence().unwrap();
        builder.set_count(1, 7).unwrap();
        builder.add_variation(Variation::deletion(12, "GGA", false)).unwrap();
        builder.set_multiplicity(1).unwrap();
        builder.set_id(9).unwrap();
        builder.set_weight(1.0).unwrap();
        builder.set_geometry(Geometry::new(0, 25, 0).unwrap()).unwrap();

        builder.create().unwrap()
    }

    #[test]
    fn round_trip_every_sparse_mode() {
        use super::{deserialize, serialize};
        use crate::access::ReadsAccess;
        use crate::context::{GlobalInfo, SparseMode};
        use std::io::Cursor;

        for num_conditions in [2, 8] {
            let expected = record(num_conditions);
            for sparse_mode in [SparseMode::Dense, SparseMode::SparseGlobal, SparseMode::Supersparse] {
                for fixed in [true, false] {
                    let info = GlobalInfo {
                        has_id: true, has_weight: true, has_geometry: true,
                        num_conditions: if fixed { Some(num_conditions) } else { None },
                        sparse_mode,
                        ..Default::default()
                    };
                    let mut bytes: Vec<u8> = Vec::new();
                    let nbytes = serialize(&expected, &info, &mut bytes).unwrap();
                    assert_eq!(nbytes, bytes.len());

                    let mut conn = Cursor::new(bytes);
                    let got = deserialize(&info, &mut conn).unwrap();
                    assert_eq!(got, expected);
                    assert_eq!(got.has_nonzero_information(), sparse_mode.is_sparse());
                    assert_eq!(conn.position() as usize, nbytes);
                }
            }
        }
    }

    #[test]
    fn exact_bytes() {
        use super::serialize;
        use crate::context::{GlobalInfo, SparseMode};

        let mut builder = AlignedReadsBuilder::new(2);
        builder.start();
        builder.new_distinct_sequence().unwrap();
        builder.set_count(1, 3).unwrap();
        builder.add_variation(Variation::mismatch(12, b'A', b'G', false)).unwrap();
        builder.add_variation(Variation::deletion(20, "TT", true)).unwrap();
        builder.set_multiplicity(1).unwrap();
        let record = builder.create().unwrap();

        let info = GlobalInfo { num_conditions: Some(2), sparse_mode: SparseMode::SparseGlobal, ..Default::default() };
        let mut bytes: Vec<u8> = Vec::new();
        serialize(&record, &info, &mut bytes).unwrap();

        let deletion_tag: u16 = (2 << 13) | (1 << 12) | 20;
        let mut expected: Vec<u8> = vec![
            1,             // distinct sequences
            1, 1, 3,       // one nonzero count: index 1, count 3
            2,             // variations
            12, 0, b'A', b'G',
        ];
        expected.extend_from_slice(&deletion_tag.to_le_bytes());
        expected.extend_from_slice(&[2, b'T', b'T']);
        expected.push(1); // multiplicity
        assert_eq!(bytes, expected);
    }

    #[test]
    fn weights_default_from_multiplicity() {
        use super::{deserialize, serialize};
        use crate::access::ReadsAccess;
        use crate::context::GlobalInfo;
        use std::io::Cursor;

        let mut builder = AlignedReadsBuilder::new(1);
        builder.start();
        builder.new_distinct_sequence().unwrap();
        builder.set_count(0, 1).unwrap();
        builder.set_multiplicity(4).unwrap();
        let record = builder.create().unwrap();

        let info = GlobalInfo { has_weight: true, num_conditions: Some(1), ..Default::default() };
        let mut bytes: Vec<u8> = Vec::new();
        serialize(&record, &info, &mut bytes).unwrap();
        let got = deserialize(&info, &mut Cursor::new(bytes)).unwrap();
        assert_eq!(got.stored_weight(0), Some(0.25));

        // unknown and unique placements default to 1
        for multiplicity in [0, 1] {
            builder.start();
            builder.new_distinct_sequence().unwrap();
            builder.set_count(0, 1).unwrap();
            builder.set_multiplicity(multiplicity).unwrap();
            let record = builder.create().unwrap();
            assert_eq!(record.stored_weight(0), None);
            assert_eq!(record.weight(0), 1.0);
        }
    }

    #[test]
    fn barcodes_and_subreads_round_trip() {
        use super::{deserialize, serialize};
        use crate::context::{BarcodeLayout, GlobalInfo};
        use crate::subreads::Subreads;
        use std::io::Cursor;

        let bc = |x: &str| Barcode::new(x).unwrap();
        let mut builder = AlignedReadsBuilder::new(3);
        builder.start();
        builder.new_distinct_sequence().unwrap();
        builder.set_count_barcoded(0, 2, &[bc("ACGTA"), bc("TTTTT")]).unwrap();
        builder.set_count_barcoded(2, 1, &[bc("GATTC")]).unwrap();
        builder.set_multiplicity(1).unwrap();
        builder.set_subreads(Subreads::new(vec![0, 1, 2], vec![10, 15], vec![20]).unwrap()).unwrap();
        builder.new_distinct_sequence().unwrap();
        builder.set_multiplicity(1).unwrap();
        builder.set_count_barcoded(1, 1, &[bc("CCCCC")]).unwrap();
        builder.set_subreads(Subreads::new(vec![0], vec![], vec![]).unwrap()).unwrap();
        let record = builder.create().unwrap();

        for barcodes in [BarcodeLayout::Fixed(5), BarcodeLayout::PerRecord] {
            let info = GlobalInfo { has_subreads: true, num_conditions: Some(3), barcodes, ..Default::default() };
            let mut bytes: Vec<u8> = Vec::new();
            serialize(&record, &info, &mut bytes).unwrap();
            let got = deserialize(&info, &mut Cursor::new(bytes)).unwrap();
            assert_eq!(got, record);
        }

        let info = GlobalInfo { num_conditions: Some(3), barcodes: BarcodeLayout::Fixed(4), ..Default::default() };
        assert!(serialize(&record, &info, &mut Vec::<u8>::new()).is_err());
    }

    #[test]
    fn context_mismatches() {
        use super::serialize;
        use crate::context::GlobalInfo;
        use crate::error::ReadsError;

        let mut builder = AlignedReadsBuilder::new(2);
        builder.start();
        builder.new_distinct_sequence().unwrap();
        builder.set_count(0, 1).unwrap();
        let record = builder.create().unwrap();

        let info = GlobalInfo { num_conditions: Some(3), ..Default::default() };
        assert!(matches!(serialize(&record, &info, &mut Vec::<u8>::new()), Err(ReadsError::Consistency(_))));
        let info = GlobalInfo { has_id: true, num_conditions: Some(2), ..Default::default() };
        assert!(matches!(serialize(&record, &info, &mut Vec::<u8>::new()), Err(ReadsError::Consistency(_))));
        let info = GlobalInfo { has_geometry: true, num_conditions: Some(2), ..Default::default() };
        assert!(matches!(serialize(&record, &info, &mut Vec::<u8>::new()), Err(ReadsError::Consistency(_))));
    }

    #[test]
    fn decode_errors() {
        use super::deserialize;
        use crate::context::{GlobalInfo, SparseMode};
        use crate::error::ReadsError;
        use std::io::Cursor;

        let info = GlobalInfo { num_conditions: Some(2), ..Default::default() };

        // no distinct sequences
        let got = deserialize(&info, &mut Cursor::new(vec![0]));
        assert!(matches!(got, Err(ReadsError::Consistency(_))));

        // unknown variation type 7
        let got = deserialize(&info, &mut Cursor::new(vec![1, 1, 0, 1, 0x00, 0xE0, 1]));
        assert!(matches!(got, Err(ReadsError::Consistency(_))));

        // flat count index past the last distinct sequence
        let info = GlobalInfo { num_conditions: Some(2), sparse_mode: SparseMode::SparseGlobal, ..Default::default() };
        let got = deserialize(&info, &mut Cursor::new(vec![1, 1, 2, 1, 0, 1]));
        assert!(matches!(got, Err(ReadsError::Consistency(_))));

        // truncated input
        let got = deserialize(&info, &mut Cursor::new(vec![1, 1]));
        assert!(matches!(got, Err(ReadsError::Decode(_))));
    }

    #[test]
    fn decode_bounds_lengths() {
        use super::deserialize;
        use crate::context::{BarcodeLayout, GlobalInfo, SparseMode};
        use crate::error::ReadsError;
        use std::io::Cursor;

        // condition count of u64::MAX written with the record
        let mut bytes: Vec<u8> = vec![1, 253];
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        let got = deserialize(&GlobalInfo::default(), &mut Cursor::new(bytes));
        assert!(matches!(got, Err(ReadsError::Range { .. })));

        // more distinct sequences than fit in 32 bits
        let mut bytes: Vec<u8> = vec![253];
        bytes.extend_from_slice(&(1_u64 << 32).to_le_bytes());
        let got = deserialize(&GlobalInfo::default(), &mut Cursor::new(bytes));
        assert!(matches!(got, Err(ReadsError::Range { .. })));

        // u32::MAX distinct sequences claimed, input ends after the counts
        let info = GlobalInfo { sparse_mode: SparseMode::SparseGlobal, ..Default::default() };
        let mut bytes: Vec<u8> = vec![252];
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(&[1, 0]);
        let got = deserialize(&info, &mut Cursor::new(bytes));
        assert!(matches!(got, Err(ReadsError::Decode(_))));

        // barcode length 300 written with the record
        let info = GlobalInfo { num_conditions: Some(1), barcodes: BarcodeLayout::PerRecord, ..Default::default() };
        let mut bytes: Vec<u8> = vec![1, 1, 0, 1, 251];
        bytes.extend_from_slice(&300_u16.to_le_bytes());
        let got = deserialize(&info, &mut Cursor::new(bytes));
        assert!(matches!(got, Err(ReadsError::Range { .. })));
    }

    #[test]
    fn dense_and_sparse_aggregates_agree() {
        use super::{deserialize, serialize};
        use crate::access::ReadsAccess;
        use crate::context::{GlobalInfo, SparseMode};
        use crate::counts::mode::ReadCountMode;
        use std::io::Cursor;

        let sparse = record(8);
        let info = GlobalInfo { has_id: true, has_weight: true, has_geometry: true, num_conditions: Some(8), sparse_mode: SparseMode::Dense, ..Default::default() };
        let mut bytes: Vec<u8> = Vec::new();
        serialize(&sparse, &info, &mut bytes).unwrap();
        let dense = deserialize(&info, &mut Cursor::new(bytes)).unwrap();
        assert!(sparse.has_nonzero_information());
        assert!(!dense.has_nonzero_information());

        let modes = [
            ReadCountMode::ALL, ReadCountMode::WEIGHT, ReadCountMode::DIVIDE,
            ReadCountMode::UNIQUE, ReadCountMode::COLLAPSE_ALL, ReadCountMode::COLLAPSE_UNIQUE,
            ReadCountMode::DIVIDE.scaled(3.0).transformed(|x| x + 1.0),
        ];
        for mode in modes.iter() {
            assert_eq!(dense.total(mode), sparse.total(mode));
            assert_eq!(dense.condition_totals(mode), sparse.condition_totals(mode));
            for d in 0..dense.num_distinct() {
                assert_eq!(dense.distinct_counts(d, mode), sparse.distinct_counts(d, mode));
                for c in 0..8 {
                    assert_eq!(dense.count(d, c), sparse.count(d, c));
                }
            }
        }
    }
}
