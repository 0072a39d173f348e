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

//! Errors returned by the record model, the builder, the codec and the trimmers.
//!
//! All variants are fatal. [Range](ReadsError::Range) means a value does not
//! fit its fixed bit budget, [Sequencing](ReadsError::Sequencing) means an API
//! was called out of order and [Consistency](ReadsError::Consistency) means a
//! cross-check between two pieces of data failed, usually because the input is
//! corrupt.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadsError {
    /// A value exceeds the range its encoding can hold.
    #[error("{what} = {value} exceeds the maximum of {max}")]
    Range {
        what: &'static str,
        value: u64,
        max: u64,
    },

    /// A builder method was called in the wrong state.
    #[error("sequencing error: {0}")]
    Sequencing(String),

    /// Two pieces of data contradict each other.
    #[error("consistency error: {0}")]
    Consistency(String),

    /// Malformed debug text.
    #[error("could not parse '{input}': {reason}")]
    Parse {
        input: String,
        reason: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Encode(#[from] bincode::error::EncodeError),

    #[error(transparent)]
    Decode(#[from] bincode::error::DecodeError),
}

pub type Result<T> = std::result::Result<T, ReadsError>;

impl ReadsError {
    pub(crate) fn range(what: &'static str, value: impl Into<u64>, max: impl Into<u64>) -> Self {
        ReadsError::Range { what, value: value.into(), max: max.into() }
    }

    pub(crate) fn sequencing(msg: impl Into<String>) -> Self {
        ReadsError::Sequencing(msg.into())
    }

    pub(crate) fn consistency(msg: impl Into<String>) -> Self {
        ReadsError::Consistency(msg.into())
    }
}
