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
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use alnreads::compression::StreamCompression;
use alnreads::compression::StreamWriter;
use alnreads::compression::open_read;
use alnreads::decoder::RecordDecoder;
use alnreads::GlobalInfo;

use clap::Parser;

mod cli;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    if let Err(e) = stderrlog::new()
        .module(module_path!())
        .quiet(false)
        .verbosity(log_max_level)
        .timestamp(stderrlog::Timestamp::Off)
        .init() {
        eprintln!("Could not initialize logging: {}", e);
    }
}

fn inspect(
    file: &Path,
    info: &GlobalInfo,
) -> alnreads::Result<()> {
    let mut conn_in = open_read(BufReader::new(File::open(file)?))?;
    let stdout = std::io::stdout();
    let mut conn_out = BufWriter::new(stdout.lock());

    let mut decoder = RecordDecoder::new(&mut conn_in, info);
    for (idx, record) in decoder.by_ref().enumerate() {
        writeln!(conn_out, "{}\t{}", idx, record?)?;
    }
    conn_out.flush()?;
    log::info!("{}: {} records", file.display(), decoder.records_read());
    Ok(())
}

fn recode(
    file: &Path,
    out_file: Option<&Path>,
    info_in: &GlobalInfo,
    info_out: &GlobalInfo,
    compression: StreamCompression,
) -> alnreads::Result<()> {
    let mut conn_in = open_read(BufReader::new(File::open(file)?))?;
    let conn_out: Box<dyn Write> = match out_file {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    };

    let mut writer = StreamWriter::new(conn_out, compression);
    let n_records = alnreads::recode_from_read_to_write(info_in, info_out, &mut conn_in, &mut writer)?;
    writer.finish()?.flush()?;
    log::info!("recoded {} records from {:?} to {:?}", n_records, info_in.sparse_mode, info_out.sparse_mode);
    Ok(())
}

fn main() {
    let cli = cli::Cli::parse();

    // Subcommands:
    let res = match &cli.command {
        // Inspect
        Some(cli::Commands::Inspect {
            input_files,
            context,
            verbose,
        }) => {
            init_log(if *verbose { 2 } else { 1 });
            let info = context.global_info();
            input_files.iter().try_for_each(|file| inspect(file, &info))
        },

        // Recode
        Some(cli::Commands::Recode {
            input_file,
            out_file,
            context,
            to_sparse_mode,
            sparse_threshold,
            gzip,
            verbose,
        }) => {
            init_log(if *verbose { 2 } else { 1 });
            let info_in = context.global_info();
            let info_out = context.output_info(*to_sparse_mode, *sparse_threshold);
            let compression = if *gzip { StreamCompression::Gzip } else { StreamCompression::None };
            recode(input_file, out_file.as_deref(), &info_in, &info_out, compression)
        },
        None => {
            eprintln!("No subcommand given, see `alnreads --help`.");
            std::process::exit(2);
        },
    };

    if let Err(e) = res {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
