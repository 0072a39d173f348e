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
use crate::codec::deserialize;
use crate::context::GlobalInfo;
use crate::error::Result;
use crate::record::AlignedReads;

use std::io::BufRead;

/// Decodes consecutive records of one dataset from a [BufRead].
///
/// Stops after the context's `record_count` records, or at the end of the
/// input if the count is unknown. The first error ends the iteration.
pub struct RecordDecoder<'a, R: BufRead> {
    // Inputs
    conn: &'a mut R,
    info: GlobalInfo,

    // Internals
    records_read: u64,
    failed: bool,
}

impl<'a, R: BufRead> RecordDecoder<'a, R> {
    pub fn new(
        conn: &'a mut R,
        info: &GlobalInfo,
    ) -> Self {
        RecordDecoder{
            conn, info: info.clone(),
            records_read: 0, failed: false,
        }
    }

    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    fn at_end(
        &mut self,
    ) -> Result<bool> {
        match self.info.record_count {
            Some(expected) => Ok(self.records_read == expected),
            None => Ok(self.conn.fill_buf()?.is_empty()),
        }
    }

    fn next_record(
        &mut self,
    ) -> Option<Result<AlignedReads>> {
        match self.at_end() {
            Ok(true) => return None,
            Ok(false) => (),
            Err(e) => return Some(Err(e)),
        }
        let record = deserialize(&self.info, self.conn);
        if record.is_ok() {
            self.records_read += 1;
            log::trace!("decoded record {}", self.records_read);
        }
        Some(record)
    }
}

impl<R: BufRead> Iterator for RecordDecoder<'_, R> {
    type Item = Result<AlignedReads>;

    fn next(
        &mut self,
    ) -> Option<Result<AlignedReads>> {
        if self.failed {
            return None
        }
        let ret = self.next_record();
        if matches!(ret, Some(Err(_))) {
            self.failed = true;
        }
        ret
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn decode_until_end_of_input() {
        use super::RecordDecoder;
        use crate::access::ReadsAccess;
        use crate::context::GlobalInfo;
        use std::io::Cursor;

        let info = GlobalInfo { num_conditions: Some(1), ..Default::default() };
        let mut conn = Cursor::new(vec![1, 1, 0, 0, 1, 2, 0, 3]);
        let got: Vec<u32> = RecordDecoder::new(&mut conn, &info)
            .map(|record| {
                let record = record.unwrap();
                record.count(0, 0) * 10 + record.multiplicity(0)
            })
            .collect();
        assert_eq!(got, vec![10, 23]);
    }

    #[test]
    fn decode_record_count() {
        use super::RecordDecoder;
        use crate::context::GlobalInfo;
        use std::io::Cursor;

        let info = GlobalInfo { num_conditions: Some(1), record_count: Some(1), ..Default::default() };
        let mut conn = Cursor::new(vec![1, 1, 0, 0, 1, 2, 0, 3]);
        let mut decoder = RecordDecoder::new(&mut conn, &info);
        assert!(decoder.next().unwrap().is_ok());
        assert!(decoder.next().is_none());
        assert_eq!(decoder.records_read(), 1);

        // truncated second record
        let info = GlobalInfo { num_conditions: Some(1), record_count: Some(2), ..Default::default() };
        let mut conn = Cursor::new(vec![1, 1, 0, 0, 1, 2]);
        let mut decoder = RecordDecoder::new(&mut conn, &info);
        assert!(decoder.next().unwrap().is_ok());
        assert!(decoder.next().unwrap().is_err());
        assert!(decoder.next().is_none());
    }
}
