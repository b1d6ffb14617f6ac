//Enable more cargo lint tests
#![warn(rust_2018_idioms)]

use std::{
    fs,
    io::{self, Write},
    path::Path,
    process::exit,
};

use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use symhuff::tools::cli::{huffopts_init, HuffOpts, Mode, Output};
use symhuff::{compress_file, decompress_file, HuffError, Model, Result};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Suffix given to compressed files.
const SUFFIX: &str = ".huf";

fn main() {
    // Available log levels are Error, Warn, Info, Debug, Trace. Stdout may carry data (-c).
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Could not start the logger: {}", e);
    }

    let options = huffopts_init();
    let model = match options.model() {
        Ok(model) => model,
        Err(e) => {
            error!("{}", e);
            exit(1)
        }
    };

    //----- Figure how what we need to do and go do it
    let mut failed = false;
    for file in &options.files {
        if let Err(e) = process(file, &options, &model) {
            error!("{}: {}", file, e);
            failed = true;
        }
    }
    if failed {
        exit(1)
    }
    info!("Done.");
}

fn process(file: &str, opts: &HuffOpts, model: &Model) -> Result<()> {
    let input_size = fs::metadata(file)?.len();
    match opts.op_mode {
        Mode::Zip => {
            let packed = compress_file(file, model, opts.buffer_size)?;
            report(file, input_size, packed.len() as u64);
            deliver(file, &format!("{}{}", file, SUFFIX), &packed, opts)
        }
        Mode::Unzip => {
            let unpacked = decompress_file(file, model)?;
            report(file, unpacked.len() as u64, input_size);
            deliver(file, &unzipped_name(file), &unpacked, opts)
        }
        Mode::Test => {
            let unpacked = decompress_file(file, model)?;
            info!("{}: ok, {} bytes decode cleanly.", file, unpacked.len());
            Ok(())
        }
    }
}

/// Write the result to stdout or to `output`, then drop the input unless asked to keep it.
fn deliver(input: &str, output: &str, data: &[u8], opts: &HuffOpts) -> Result<()> {
    match opts.output {
        Output::Stdout => {
            let mut out = io::stdout().lock();
            out.write_all(data)?;
            out.flush()?;
        }
        Output::File => {
            if Path::new(output).exists() && !opts.force_overwrite {
                return Err(HuffError::Io(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} already exists, use -f to overwrite", output),
                )));
            }
            fs::write(output, data)?;
            info!("Wrote {}", output);
            if !opts.keep_input_files {
                fs::remove_file(input)?;
            }
        }
    }
    Ok(())
}

fn unzipped_name(file: &str) -> String {
    match file.strip_suffix(SUFFIX) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => format!("{}.out", file),
    }
}

fn report(file: &str, original: u64, compressed: u64) {
    let rate = if original == 0 {
        0.0
    } else {
        100.0 * (1.0 - compressed as f64 / original as f64)
    };
    info!(
        "{}: {} bytes uncompressed, {} bytes compressed, compression rate {:.2}%",
        file, original, compressed, rate
    );
}
