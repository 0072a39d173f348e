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
use std::path::PathBuf;

use alnreads::config::SparsePolicy;
use alnreads::config::DEFAULT_SPARSE_THRESHOLD;
use alnreads::context::BarcodeLayout;
use alnreads::context::GlobalInfo;
use alnreads::context::SparseMode;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // Print records in their text form
    Inspect {
        // Input file(s), plain or gzipped
        #[arg(group = "input", required = true, help = "Input file(s)")]
        input_files: Vec<PathBuf>,

        #[command(flatten)]
        context: ContextArgs,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },

    // Re-encode records with another count layout
    Recode {
        // Input file, plain or gzipped
        #[arg(group = "input", required = true, help = "Input file")]
        input_file: PathBuf,

        // Output file path, defaults to stdout
        #[arg(short = 'o', long = "output", required = false)]
        out_file: Option<PathBuf>,

        #[command(flatten)]
        context: ContextArgs,

        // Count layout of the output, chosen by --sparse-threshold if not given
        #[arg(long = "to-sparse-mode", help = "Output count layout: dense, sparse or supersparse")]
        to_sparse_mode: Option<SparseMode>,

        // Datasets with more conditions than this are written sparsely
        #[arg(long = "sparse-threshold", default_value_t = DEFAULT_SPARSE_THRESHOLD)]
        sparse_threshold: usize,

        // Compress the output
        #[arg(short = 'z', long = "gzip", default_value_t = false)]
        gzip: bool,

        // Verbosity
        #[arg(long = "verbose", default_value_t = false)]
        verbose: bool,
    },
}

// Dataset context of the input records
#[derive(Args, Debug)]
pub struct ContextArgs {
    // Number of conditions, written with every record if not given
    #[arg(long = "conditions")]
    pub num_conditions: Option<usize>,

    #[arg(long = "ids", default_value_t = false)]
    pub has_id: bool,

    #[arg(long = "weights", default_value_t = false)]
    pub has_weight: bool,

    #[arg(long = "geometry", default_value_t = false)]
    pub has_geometry: bool,

    #[arg(long = "subreads", default_value_t = false)]
    pub has_subreads: bool,

    // Count layout of the input
    #[arg(long = "sparse-mode", default_value = "dense", help = "Input count layout: dense, sparse or supersparse")]
    pub sparse_mode: SparseMode,

    // Barcodes
    #[arg(long = "barcode-length", group = "barcodes")]
    pub barcode_length: Option<usize>,
    #[arg(long = "barcodes-per-record", group = "barcodes", default_value_t = false)]
    pub barcodes_per_record: bool,

    // Number of records, read until the end of the input if not given
    #[arg(long = "records")]
    pub record_count: Option<u64>,
}

impl ContextArgs {
    pub fn global_info(&self) -> GlobalInfo {
        let barcodes = match (self.barcode_length, self.barcodes_per_record) {
            (Some(len), _) => BarcodeLayout::Fixed(len),
            (None, true) => BarcodeLayout::PerRecord,
            (None, false) => BarcodeLayout::None,
        };
        GlobalInfo {
            has_id: self.has_id,
            has_weight: self.has_weight,
            has_geometry: self.has_geometry,
            has_subreads: self.has_subreads,
            num_conditions: self.num_conditions,
            sparse_mode: self.sparse_mode,
            barcodes,
            record_count: self.record_count,
        }
    }

    /// Context of the output, which only differs in the count layout.
    pub fn output_info(&self, to_sparse_mode: Option<SparseMode>, sparse_threshold: usize) -> GlobalInfo {
        let info = self.global_info();
        let sparse_mode = match (to_sparse_mode, info.num_conditions) {
            (Some(mode), _) => mode,
            (None, Some(num_conditions)) => GlobalInfo::new(num_conditions, &SparsePolicy::new(sparse_threshold)).sparse_mode,
            (None, None) => info.sparse_mode,
        };
        GlobalInfo { sparse_mode, ..info }
    }
}
