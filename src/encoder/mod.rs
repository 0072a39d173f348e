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
use crate::codec::serialize;
use crate::context::GlobalInfo;
use crate::error::ReadsError;
use crate::error::Result;
use crate::record::AlignedReads;

/// Encodes the records of one dataset, one record per call to `next`.
///
/// Each item holds the bytes of one record. Encoding more records than the
/// context's `record_count` is an error.
pub struct RecordEncoder<'a, I> where I: Iterator<Item=AlignedReads> {
    // Inputs
    records: &'a mut I,
    info: GlobalInfo,

    // Internals
    records_written: u64,
    bytes_written: usize,
}

impl<'a, I> RecordEncoder<'a, I> where I: Iterator<Item=AlignedReads> {
    pub fn new(
        records: &'a mut I,
        info: &GlobalInfo,
    ) -> Self {
        RecordEncoder{
            records, info: info.clone(),
            records_written: 0, bytes_written: 0,
        }
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    fn encode_record(
        &mut self,
        record: &AlignedReads,
    ) -> Result<Vec<u8>> {
        if let Some(expected) = self.info.record_count {
            if self.records_written == expected {
                return Err(ReadsError::consistency(format!("the dataset has only {} records", expected)));
            }
        }
        let mut out: Vec<u8> = Vec::new();
        self.bytes_written += serialize(record, &self.info, &mut out)?;
        self.records_written += 1;
        log::trace!("encoded record {} in {} bytes", self.records_written, out.len());
        Ok(out)
    }
}

impl<I> Iterator for RecordEncoder<'_, I> where I: Iterator<Item=AlignedReads> {
    type Item = Result<Vec<u8>>;

    fn next(
        &mut self,
    ) -> Option<Result<Vec<u8>>> {
        let record = self.records.next()?;
        Some(self.encode_record(&record))
    }
}
