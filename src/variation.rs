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

//! Sequence variations of a read relative to the reference.
//!
//! A [Variation] is kept as a proper sum type in memory. The 16 bit tag layout
//! is only used when a variation is written:
//!
//! ```text
//!  15 14 13 | 12     | 11 ........ 0
//!  type     | second | position
//! ```
//!
//! Softclips do not have a position; the lowest bit of the position field
//! marks a 3' (1) or 5' (0) clip instead.
//!
//! ## Debug text
//!
//! `M12AG` is a mismatch at 12 with genomic `A` and read `G`, `I5CC` an
//! insertion, `D7TT` a deletion, `5pACG`/`3pACG` softclips. A trailing `r`
//! marks variations observed in the second read.
//!
//! ```rust
//! use alnreads::variation::Variation;
//!
//! let var: Variation = "D7TTr".parse().unwrap();
//! assert_eq!(var, Variation::deletion(7, "TT", true));
//! assert_eq!(var.to_string(), "D7TTr");
//! ```

use crate::error::ReadsError;
use crate::error::Result;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use bstr::BString;
use bstr::ByteSlice;

/// Largest position that fits the tag.
pub const MAX_POSITION: u32 = 2047;

const TYPE_SHIFT: u16 = 13;
const SECOND_READ_BIT: u16 = 1 << 12;
const POSITION_MASK: u16 = 0x0FFF;

/// Variation types, ordered by their rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VariationType {
    Mismatch = 0,
    Insertion = 1,
    Deletion = 2,
    Softclip = 3,
}

impl VariationType {
    pub fn from_code(code: u16) -> Result<Self> {
        match code {
            0 => Ok(VariationType::Mismatch),
            1 => Ok(VariationType::Insertion),
            2 => Ok(VariationType::Deletion),
            3 => Ok(VariationType::Softclip),
            _ => Err(ReadsError::consistency(format!("unknown variation type {}", code))),
        }
    }

    pub fn code(&self) -> u16 {
        *self as u16
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VariationKind {
    Mismatch { genomic: u8, read: u8 },
    Insertion { read: BString },
    Deletion { genomic: BString },
    Softclip { three_prime: bool, read: BString },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Variation {
    position: u32,
    kind: VariationKind,
    from_second_read: bool,
}

impl Variation {
    /// Mismatch at `position`. `genomic` and `read` may be the same base.
    pub fn mismatch(position: u32, genomic: u8, read: u8, from_second_read: bool) -> Self {
        Variation { position, kind: VariationKind::Mismatch { genomic, read }, from_second_read }
    }

    /// Bases inserted in the read before `position`.
    pub fn insertion(position: u32, read: impl Into<BString>, from_second_read: bool) -> Self {
        Variation { position, kind: VariationKind::Insertion { read: read.into() }, from_second_read }
    }

    /// Genomic bases starting at `position` that are missing from the read.
    pub fn deletion(position: u32, genomic: impl Into<BString>, from_second_read: bool) -> Self {
        Variation { position, kind: VariationKind::Deletion { genomic: genomic.into() }, from_second_read }
    }

    pub fn softclip(three_prime: bool, read: impl Into<BString>, from_second_read: bool) -> Self {
        Variation { position: 0, kind: VariationKind::Softclip { three_prime, read: read.into() }, from_second_read }
    }

    pub fn kind(&self) -> &VariationKind {
        &self.kind
    }

    pub fn variation_type(&self) -> VariationType {
        match self.kind {
            VariationKind::Mismatch { .. } => VariationType::Mismatch,
            VariationKind::Insertion { .. } => VariationType::Insertion,
            VariationKind::Deletion { .. } => VariationType::Deletion,
            VariationKind::Softclip { .. } => VariationType::Softclip,
        }
    }

    /// Induced position. Always 0 for softclips.
    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn from_second_read(&self) -> bool {
        self.from_second_read
    }

    pub fn is_softclip(&self) -> bool {
        matches!(self.kind, VariationKind::Softclip { .. })
    }

    pub fn is_deletion(&self) -> bool {
        matches!(self.kind, VariationKind::Deletion { .. })
    }

    /// Some(true) for a 3' softclip, Some(false) for a 5' softclip.
    pub fn softclip_side(&self) -> Option<bool> {
        match self.kind {
            VariationKind::Softclip { three_prime, .. } => Some(three_prime),
            _ => None,
        }
    }

    /// Read bases carried by the variation.
    pub fn read_sequence(&self) -> &[u8] {
        match &self.kind {
            VariationKind::Mismatch { read, .. } => std::slice::from_ref(read),
            VariationKind::Insertion { read } => read.as_slice(),
            VariationKind::Deletion { .. } => &[],
            VariationKind::Softclip { read, .. } => read.as_slice(),
        }
    }

    /// Reference bases covered by the variation.
    pub fn genomic_sequence(&self) -> &[u8] {
        match &self.kind {
            VariationKind::Mismatch { genomic, .. } => std::slice::from_ref(genomic),
            VariationKind::Insertion { .. } => &[],
            VariationKind::Deletion { genomic } => genomic.as_slice(),
            VariationKind::Softclip { .. } => &[],
        }
    }

    /// Number of mapped (induced) positions the variation spans.
    pub fn genomic_length(&self) -> u32 {
        self.genomic_sequence().len() as u32
    }

    /// Same variation at `position`, a no-op for softclips.
    pub fn reposition(&self, position: u32) -> Result<Variation> {
        if self.is_softclip() {
            return Ok(self.clone());
        }
        if position > MAX_POSITION {
            return Err(ReadsError::range("variation position", position, MAX_POSITION));
        }
        Ok(Variation { position, kind: self.kind.clone(), from_second_read: self.from_second_read })
    }

    /// Same deletion restricted to the induced window `[start, end)`.
    ///
    /// Returns None for other variation types or if nothing of the deletion
    /// remains.
    pub(crate) fn truncate_deletion(&self, start: u32, end: u32) -> Option<Variation> {
        let VariationKind::Deletion { genomic } = &self.kind else {
            return None
        };
        let from = self.position.max(start);
        let to = (self.position + genomic.len() as u32).min(end);
        if from >= to {
            return None
        }
        let offset = (from - self.position) as usize;
        let len = (to - from) as usize;
        Some(Variation::deletion(from, &genomic[offset..(offset + len)], self.from_second_read))
    }

    // Position used for ordering, the side bit for softclips.
    fn sort_position(&self) -> u32 {
        match self.kind {
            VariationKind::Softclip { three_prime, .. } => three_prime as u32,
            _ => self.position,
        }
    }

    /// Packs the variation into its tag and payload.
    pub fn encode(&self) -> Result<(u16, Vec<u8>)> {
        let position = match self.kind {
            VariationKind::Softclip { three_prime, .. } => three_prime as u16,
            _ => {
                if self.position > MAX_POSITION {
                    return Err(ReadsError::range("variation position", self.position, MAX_POSITION));
                }
                self.position as u16
            },
        };
        let mut tag = (self.variation_type().code() << TYPE_SHIFT) | position;
        if self.from_second_read {
            tag |= SECOND_READ_BIT;
        }

        let payload = match &self.kind {
            VariationKind::Mismatch { genomic, read } => vec![*genomic, *read],
            VariationKind::Insertion { read } => read.to_vec(),
            VariationKind::Deletion { genomic } => genomic.to_vec(),
            VariationKind::Softclip { read, .. } => read.to_vec(),
        };

        Ok((tag, payload))
    }

    /// Inverse of [encode](Variation::encode).
    pub fn decode(tag: u16, payload: &[u8]) -> Result<Variation> {
        let var_type = VariationType::from_code(tag >> TYPE_SHIFT)?;
        let from_second_read = tag & SECOND_READ_BIT != 0;
        let position = (tag & POSITION_MASK) as u32;

        match var_type {
            VariationType::Mismatch => {
                if payload.len() != 2 {
                    return Err(ReadsError::consistency(format!("mismatch payload has {} bytes", payload.len())));
                }
                if position > MAX_POSITION {
                    return Err(ReadsError::range("variation position", position, MAX_POSITION));
                }
                Ok(Variation::mismatch(position, payload[0], payload[1], from_second_read))
            },
            VariationType::Insertion | VariationType::Deletion => {
                if position > MAX_POSITION {
                    return Err(ReadsError::range("variation position", position, MAX_POSITION));
                }
                if var_type == VariationType::Insertion {
                    Ok(Variation::insertion(position, payload, from_second_read))
                } else {
                    Ok(Variation::deletion(position, payload, from_second_read))
                }
            },
            VariationType::Softclip => {
                Ok(Variation::softclip(position & 1 == 1, payload, from_second_read))
            },
        }
    }
}

impl Ord for Variation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_position().cmp(&other.sort_position())
            .then_with(|| self.variation_type().cmp(&other.variation_type()))
            .then_with(|| self.from_second_read.cmp(&other.from_second_read))
            .then_with(|| self.read_sequence().cmp(other.read_sequence()))
            .then_with(|| self.genomic_sequence().cmp(other.genomic_sequence()))
    }
}

impl PartialOrd for Variation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            VariationKind::Mismatch { genomic, read } => {
                write!(f, "M{}{}{}", self.position, *genomic as char, *read as char)?
            },
            VariationKind::Insertion { read } => write!(f, "I{}{}", self.position, read.as_bstr())?,
            VariationKind::Deletion { genomic } => write!(f, "D{}{}", self.position, genomic.as_bstr())?,
            VariationKind::Softclip { three_prime, read } => {
                write!(f, "{}p{}", if *three_prime { '3' } else { '5' }, read.as_bstr())?
            },
        }
        if self.from_second_read {
            write!(f, "r")?;
        }
        Ok(())
    }
}

impl FromStr for Variation {
    type Err = ReadsError;

    fn from_str(s: &str) -> Result<Self> {
        let parse_error = |reason: &'static str| ReadsError::Parse { input: s.to_string(), reason };

        let (body, from_second_read) = match s.strip_suffix('r') {
            Some(body) => (body, true),
            None => (s, false),
        };
        let bytes = body.as_bytes();
        if bytes.len() < 2 {
            return Err(parse_error("too short"));
        }

        if bytes[1] == b'p' && (bytes[0] == b'5' || bytes[0] == b'3') {
            let read = &bytes[2..];
            if read.is_empty() {
                return Err(parse_error("softclip without bases"));
            }
            return Ok(Variation::softclip(bytes[0] == b'3', read, from_second_read));
        }

        let digits = bytes[1..].iter().take_while(|x| x.is_ascii_digit()).count();
        if digits == 0 {
            return Err(parse_error("missing position"));
        }
        let position: u32 = body[1..(1 + digits)].parse().map_err(|_| parse_error("invalid position"))?;
        let payload = &bytes[(1 + digits)..];

        match bytes[0] {
            b'M' => {
                if payload.len() != 2 {
                    return Err(parse_error("mismatch needs exactly two bases"));
                }
                Ok(Variation::mismatch(position, payload[0], payload[1], from_second_read))
            },
            b'I' | b'D' if payload.is_empty() => Err(parse_error("missing bases")),
            b'I' => Ok(Variation::insertion(position, payload, from_second_read)),
            b'D' => Ok(Variation::deletion(position, payload, from_second_read)),
            _ => Err(parse_error("unknown variation type")),
        }
    }
}
