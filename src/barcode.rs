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

//! Read barcodes (UMIs) and their 2 bit packing.

use crate::error::ReadsError;
use crate::error::Result;

use std::fmt;

use bstr::BString;
use bstr::ByteSlice;

/// Longest barcode the codec can write.
pub const MAX_BARCODE_LENGTH: usize = 255;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Barcode(BString);

fn base_to_bits(base: u8) -> Option<u8> {
    match base {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

const BITS_TO_BASE: [u8; 4] = [b'A', b'C', b'G', b'T'];

impl Barcode {
    pub fn new(seq: impl Into<BString>) -> Result<Self> {
        let seq: BString = seq.into();
        if seq.len() > MAX_BARCODE_LENGTH {
            return Err(ReadsError::range("barcode length", seq.len() as u64, MAX_BARCODE_LENGTH as u64));
        }
        if let Some(base) = seq.iter().find(|x| base_to_bits(**x).is_none()) {
            return Err(ReadsError::consistency(format!("barcode {} contains '{}'", seq, *base as char)));
        }
        Ok(Barcode(seq))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Number of bytes a packed barcode of `len` bases occupies.
    pub fn packed_len(len: usize) -> usize {
        len.div_ceil(4)
    }

    /// Packs four bases per byte, first base in the lowest bits.
    pub fn pack(&self) -> Vec<u8> {
        let mut packed: Vec<u8> = vec![0; Barcode::packed_len(self.len())];
        self.0.iter().enumerate().for_each(|(idx, base)| {
            // validated in `new`
            let bits = base_to_bits(*base).unwrap_or(0);
            packed[idx / 4] |= bits << (2 * (idx % 4));
        });
        packed
    }

    pub fn unpack(packed: &[u8], len: usize) -> Result<Self> {
        if packed.len() != Barcode::packed_len(len) {
            return Err(ReadsError::consistency(format!(
                "{} packed bytes cannot hold a barcode of length {}", packed.len(), len,
            )));
        }
        let seq: Vec<u8> = (0..len).map(|idx| {
            BITS_TO_BASE[((packed[idx / 4] >> (2 * (idx % 4))) & 3) as usize]
        }).collect();
        Barcode::new(seq)
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.as_bstr())
    }
}
