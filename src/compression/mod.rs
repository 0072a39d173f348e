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

//! Optional gzip compression of record streams.
//!
//! Compressed input is recognized by the gzip magic bytes, so readers do not
//! need to know how a stream was written.

use crate::error::Result;

use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Supported compression methods for record streams.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamCompression {
    /// Records as is
    #[default]
    None,
    /// Gz with flate2
    Gzip,
}

impl std::str::FromStr for StreamCompression {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(StreamCompression::None),
            "gzip" | "gz" => Ok(StreamCompression::Gzip),
            _ => Err(format!("'{}' is not a valid StreamCompression", s)),
        }
    }
}

/// True if the next bytes of `conn` start a gzip member.
pub fn is_gzipped<R: BufRead>(
    conn: &mut R,
) -> Result<bool> {
    let buf = conn.fill_buf()?;
    Ok(buf.len() >= GZIP_MAGIC.len() && buf[0..GZIP_MAGIC.len()] == GZIP_MAGIC)
}

/// Wraps `conn` in a decompressor if it holds gzip data.
pub fn open_read<'a, R: BufRead + 'a>(
    mut conn: R,
) -> Result<Box<dyn BufRead + 'a>> {
    if is_gzipped(&mut conn)? {
        log::debug!("reading gzip compressed records");
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(conn))))
    } else {
        Ok(Box::new(conn))
    }
}

/// Writer that compresses if asked to. Call [finish](StreamWriter::finish) when done.
pub enum StreamWriter<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> StreamWriter<W> {
    pub fn new(
        conn: W,
        compression: StreamCompression,
    ) -> Self {
        match compression {
            StreamCompression::None => StreamWriter::Plain(conn),
            StreamCompression::Gzip => StreamWriter::Gzip(GzEncoder::new(conn, Compression::default())),
        }
    }

    /// Flushes all data and returns the wrapped writer.
    pub fn finish(
        self,
    ) -> Result<W> {
        match self {
            StreamWriter::Plain(mut conn) => {
                conn.flush()?;
                Ok(conn)
            },
            StreamWriter::Gzip(encoder) => Ok(encoder.finish()?),
        }
    }
}

impl<W: Write> Write for StreamWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            StreamWriter::Plain(conn) => conn.write(buf),
            StreamWriter::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            StreamWriter::Plain(conn) => conn.flush(),
            StreamWriter::Gzip(encoder) => encoder.flush(),
        }
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn gzip_round_trip() {
        use super::{is_gzipped, open_read, StreamCompression, StreamWriter};
        use std::io::{Cursor, Read, Write};

        let data: Vec<u8> = (0..200_u8).collect();

        let mut writer = StreamWriter::new(Vec::new(), StreamCompression::Gzip);
        writer.write_all(&data).unwrap();
        let compressed = writer.finish().unwrap();
        assert!(is_gzipped(&mut Cursor::new(&compressed)).unwrap());

        let mut got: Vec<u8> = Vec::new();
        open_read(Cursor::new(compressed)).unwrap().read_to_end(&mut got).unwrap();
        assert_eq!(got, data);
    }

    #[test]
    fn plain_passes_through() {
        use super::{is_gzipped, open_read, StreamCompression, StreamWriter};
        use std::io::{Cursor, Read, Write};

        let mut writer = StreamWriter::new(Vec::new(), StreamCompression::None);
        writer.write_all(&[1, 2, 3]).unwrap();
        let plain = writer.finish().unwrap();
        assert!(!is_gzipped(&mut Cursor::new(&plain)).unwrap());

        let mut got: Vec<u8> = Vec::new();
        open_read(Cursor::new(plain)).unwrap().read_to_end(&mut got).unwrap();
        assert_eq!(got, vec![1, 2, 3]);
    }
}
