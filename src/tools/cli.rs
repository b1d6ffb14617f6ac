use std::fmt::{Display, Formatter};

use clap::Parser;
use log::{info, warn};

use crate::bitstream::symbol_reader::READ_BUFFER_SIZE;
use crate::compression::Model;
use crate::error::Result;

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Errors,
    Warnings,
    Info,
    Debug,
    Trace,
}

/// Zip, Unzip, Test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
    Test,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Define the two output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    File,
    Stdout,
}
impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    name = "symhuff",
    version,
    about = "Huffman compression over fixed width symbols",
    long_about = "
    Splits the input into symbols of 1 to 31 bits and Huffman codes them. By default the code
    table is measured from the input and stored in a header (adaptive mode). With -p, a
    probability file shared by both sides supplies the table instead and no header is written
    (a-priori mode, one byte per symbol)."
)]
pub struct Args {
    /// Files to process
    #[clap()]
    files: Vec<String>,

    /// Perform compression on the input file
    #[clap(short = 'z', long = "zip")]
    compress: bool,

    /// Perform decompression on the input file
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Test compressed file integrity
    #[clap(short = 't', long = "test")]
    test: bool,

    /// Force overwriting output file
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Keep input file
    #[clap(short = 'k', long = "keep")]
    keep: bool,

    /// Send output to the terminal
    #[clap(short = 'c', long = "stdout")]
    stdout: bool,

    /// Symbol width in bits, 1..31 (adaptive mode)
    #[clap(short = 'w', long = "width", default_value_t = 8)]
    width: u8,

    /// Probability file; switches to a-priori mode
    #[clap(short = 'p', long = "probabilities")]
    probabilities: Option<String>,

    /// Read buffer size in MiB
    #[clap(short = 'b', long = "buffer-mib", default_value_t = 64)]
    buffer_mib: usize,

    /// Suppress everything but errors
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,

    /// Sets verbosity. -v shows progress, -vvv is chatty
    #[clap(short = 'v', parse(from_occurrences))]
    v: u64,
}

#[derive(Debug)]
pub struct HuffOpts {
    /// Names of files to read for input
    pub files: Vec<String>,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Don't remove input files after processing
    pub keep_input_files: bool,
    /// Compress/Decompress/Test
    pub op_mode: Mode,
    /// Location where output is sent
    pub output: Output,
    /// Symbol width for adaptive compression
    pub symbol_width: u8,
    /// Probability file for a-priori mode
    pub probabilities: Option<String>,
    /// Read buffer size in bytes
    pub buffer_size: usize,
    /// Verbosity of user information
    pub verbose: Verbosity,
}

impl HuffOpts {
    pub fn new() -> Self {
        Self {
            files: vec![],
            force_overwrite: false,
            keep_input_files: false,
            op_mode: Mode::Zip,
            output: Output::File,
            symbol_width: 8,
            probabilities: None,
            buffer_size: READ_BUFFER_SIZE,
            verbose: Verbosity::Warnings,
        }
    }

    /// Copy parsed arguments into the options struct.
    pub fn from_args(args: Args) -> Self {
        let mut opts = Self::new();
        opts.files = args.files;
        if args.compress {
            opts.op_mode = Mode::Zip
        };
        if args.decompress {
            opts.op_mode = Mode::Unzip
        };
        if args.test {
            opts.op_mode = Mode::Test
        };
        opts.force_overwrite = args.force;
        opts.keep_input_files = args.keep;
        if args.stdout {
            opts.output = Output::Stdout
        };
        opts.symbol_width = args.width;
        opts.probabilities = args.probabilities;
        opts.buffer_size = args.buffer_mib.max(1).saturating_mul(1024 * 1024);
        opts.verbose = match (args.quiet, args.v) {
            (true, _) => Verbosity::Errors,
            (false, 0) => Verbosity::Warnings,
            (false, 1) => Verbosity::Info,
            (false, 2) => Verbosity::Debug,
            _ => Verbosity::Trace,
        };
        opts
    }

    /// The model these options ask for. Loads the probability file in a-priori mode.
    pub fn model(&self) -> Result<Model> {
        match &self.probabilities {
            Some(path) => Model::priori_file(path),
            None => Ok(Model::adaptive(self.symbol_width)),
        }
    }

    /// Set the log level
    pub fn apply_verbosity(&self) {
        match self.verbose {
            Verbosity::Errors => log::set_max_level(log::LevelFilter::Error),
            Verbosity::Warnings => log::set_max_level(log::LevelFilter::Warn),
            Verbosity::Info => log::set_max_level(log::LevelFilter::Info),
            Verbosity::Debug => log::set_max_level(log::LevelFilter::Debug),
            Verbosity::Trace => log::set_max_level(log::LevelFilter::Trace),
        };
    }
}

impl Default for HuffOpts {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the command line, set the log level and report what we are about to do.
pub fn huffopts_init() -> HuffOpts {
    let opts = HuffOpts::from_args(Args::parse());
    opts.apply_verbosity();

    info!("---- symhuff Initialization Start ----");
    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    match &opts.probabilities {
        Some(p) => info!("A-priori mode, probabilities from {}", p),
        None => info!("Adaptive mode, symbol width {}", opts.symbol_width),
    }
    if opts.files.is_empty() {
        warn!("No input files given")
    };
    if opts.output == Output::Stdout {
        info!("Sending output to stdout")
    };
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    if opts.keep_input_files {
        info!("Keeping input files")
    };
    info!("---- symhuff Initialization End ----");
    opts
}
