// Command-line interface for difcodec.
//
// Subcommands convert single files (`encode`, `decode`), inspect a DIF
// header (`info`), or convert whole directories (`batch`).

use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use log::{LevelFilter, info, warn};

use crate::dif;
use crate::io::{self, DecodeStats, EncodeStats, FileKind, IoError};

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// DIF image codec: PNM <-> DIF conversion.
#[derive(Parser, Debug)]
#[command(
    name = "difcodec",
    version,
    about = "DIF image encoder/decoder",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Report elapsed time.
    #[arg(short = 't', long, global = true)]
    timing: bool,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Encode a binary PNM (P5/P6) image to DIF.
    #[command(visible_alias = "c")]
    Encode(ConvertArgs),
    /// Decode a DIF file to binary PNM.
    #[command(visible_alias = "d")]
    Decode(ConvertArgs),
    /// Print the header of a DIF file.
    Info(InfoArgs),
    /// Convert every file of a directory.
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// DIF input file.
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Decode `.dif` files instead of encoding PNM files.
    #[arg(short = 'd', long)]
    decode: bool,

    /// Directory to read from.
    #[arg(value_hint = ValueHint::DirPath)]
    input_dir: PathBuf,

    /// Directory to write to (created when missing).
    #[arg(value_hint = ValueHint::DirPath)]
    output_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Encode,
    Decode,
    Info,
    Batch,
}

#[derive(Debug)]
struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    timing: bool,
    json_output: bool,
    batch_decode: bool,
    input: PathBuf,
    output: Option<PathBuf>,
}

fn resolve_options(cli: Cli) -> Options {
    let (command, input, output, batch_decode) = match cli.command {
        Cmd::Encode(args) => (Command::Encode, args.input, Some(args.output), false),
        Cmd::Decode(args) => (Command::Decode, args.input, Some(args.output), false),
        Cmd::Info(args) => (Command::Info, args.input, None, false),
        Cmd::Batch(args) => (
            Command::Batch,
            args.input_dir,
            Some(args.output_dir),
            args.decode,
        ),
    };
    Options {
        command,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        timing: cli.timing,
        json_output: cli.json_output,
        batch_decode,
        input,
        output,
    }
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("difcodec".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn check_overwrite(path: &Path, force: bool) -> Result<(), String> {
    if path.exists() && !force {
        return Err(format!(
            "output file exists, use -f to overwrite: {}",
            path.display()
        ));
    }
    Ok(())
}

fn print_json(value: serde_json::Value) {
    match serde_json::to_string_pretty(&value) {
        Ok(s) => eprintln!("{s}"),
        Err(e) => warn!("failed to render JSON stats: {e}"),
    }
}

fn encode_json(input: &Path, stats: &EncodeStats) -> serde_json::Value {
    serde_json::json!({
        "command": "encode",
        "input": input.display().to_string(),
        "width": stats.width,
        "height": stats.height,
        "channels": stats.channels,
        "input_size": stats.input_size,
        "raw_size": stats.raw_size,
        "output_size": stats.output_size,
        "ratio": stats.ratio(),
        "sha256": stats.output_sha256.as_ref().map(|d| io::hex(d)),
    })
}

fn decode_json(input: &Path, stats: &DecodeStats) -> serde_json::Value {
    serde_json::json!({
        "command": "decode",
        "input": input.display().to_string(),
        "width": stats.width,
        "height": stats.height,
        "channels": stats.channels,
        "input_size": stats.input_size,
        "output_size": stats.output_size,
        "sha256": stats.output_sha256.as_ref().map(|d| io::hex(d)),
    })
}

// ---------------------------------------------------------------------------
// Encode / decode commands
// ---------------------------------------------------------------------------

fn cmd_encode(opts: &Options) -> i32 {
    let Some(output) = opts.output.as_deref() else {
        return 1;
    };
    if let Err(msg) = check_overwrite(output, opts.force) {
        eprintln!("difcodec: {msg}");
        return 1;
    }

    info!("encoding {} -> {}", opts.input.display(), output.display());
    let stats = match io::encode_file(&opts.input, output) {
        Ok(stats) => stats,
        Err(e @ IoError::NotPnm(_)) => {
            eprintln!("difcodec: {e}; convert it to PNM first (e.g. with ImageMagick)");
            return 1;
        }
        Err(e) => {
            eprintln!("difcodec: encode error: {}: {e}", opts.input.display());
            return 1;
        }
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "difcodec: encoder: {}x{}x{}, input size: {}, output size: {}, ratio: {:.3}",
            stats.width,
            stats.height,
            stats.channels,
            stats.input_size,
            stats.output_size,
            stats.ratio()
        );
    }
    if opts.json_output {
        print_json(encode_json(&opts.input, &stats));
    }
    0
}

fn cmd_decode(opts: &Options) -> i32 {
    let Some(output) = opts.output.as_deref() else {
        return 1;
    };
    if let Err(msg) = check_overwrite(output, opts.force) {
        eprintln!("difcodec: {msg}");
        return 1;
    }

    info!("decoding {} -> {}", opts.input.display(), output.display());
    let stats = match io::decode_file(&opts.input, output) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("difcodec: decode error: {}: {e}", opts.input.display());
            return 1;
        }
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "difcodec: decoder: {}x{}x{}, input size: {}, output size: {}",
            stats.width, stats.height, stats.channels, stats.input_size, stats.output_size
        );
    }
    if opts.json_output {
        print_json(decode_json(&opts.input, &stats));
    }
    0
}

// ---------------------------------------------------------------------------
// Info command
// ---------------------------------------------------------------------------

fn cmd_info(opts: &Options) -> i32 {
    let data = match std::fs::read(&opts.input) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("difcodec: {}: {e}", opts.input.display());
            return 1;
        }
    };
    let (header, payload) = match dif::read_header(&data) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("difcodec: invalid DIF header: {e}");
            return 1;
        }
    };
    let widths: Vec<String> = header.bit_widths.iter().map(u8::to_string).collect();
    let seeds: Vec<String> = header.seeds.iter().map(u8::to_string).collect();

    println!("DIF magic:                    {:#06X}", header.magic());
    println!("Color type:                   {}", header.color);
    println!("Width:                        {}", header.width);
    println!("Height:                       {}", header.height);
    println!("Channels:                     {}", header.color.channels());
    println!("Quantization levels:          {}", header.bit_widths.len());
    println!("Level bit widths:             {}", widths.join(" "));
    println!("Seed pixel:                   {}", seeds.join(" "));
    println!("Header size:                  {}", header.encoded_len());
    println!("Payload size:                 {payload}");

    if opts.json_output {
        print_json(serde_json::json!({
            "command": "info",
            "magic": header.magic(),
            "color": header.color.name(),
            "width": header.width,
            "height": header.height,
            "bit_widths": header.bit_widths,
            "seeds": header.seeds,
            "payload_size": payload,
        }));
    }
    0
}

// ---------------------------------------------------------------------------
// Batch command
// ---------------------------------------------------------------------------

/// Files of `dir` that the batch run should convert, sorted by name.
fn batch_inputs(dir: &Path, decode: bool) -> std::io::Result<Vec<PathBuf>> {
    let want = if decode { FileKind::Dif } else { FileKind::Pnm };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && io::sniff_file(&path).is_ok_and(|k| k == want) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn batch_one(opts: &Options, input: &Path, output_dir: &Path) -> Result<(), String> {
    let ext = if opts.batch_decode { "pnm" } else { "dif" };
    let name = input
        .file_name()
        .ok_or_else(|| format!("{}: no file name", input.display()))?;
    let output = io::change_extension(&output_dir.join(name), ext);
    check_overwrite(&output, opts.force)?;

    if opts.batch_decode {
        let stats = io::decode_file(input, &output).map_err(|e| format!("{}: {e}", input.display()))?;
        if opts.json_output {
            print_json(decode_json(input, &stats));
        }
    } else {
        let stats = io::encode_file(input, &output).map_err(|e| format!("{}: {e}", input.display()))?;
        if opts.json_output {
            print_json(encode_json(input, &stats));
        }
    }
    if !opts.quiet {
        eprintln!("difcodec: {} -> {}", input.display(), output.display());
    }
    Ok(())
}

fn cmd_batch(opts: &Options) -> i32 {
    let Some(output_dir) = opts.output.as_deref() else {
        return 1;
    };
    let inputs = match batch_inputs(&opts.input, opts.batch_decode) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("difcodec: {}: {e}", opts.input.display());
            return 1;
        }
    };
    if inputs.is_empty() {
        if !opts.quiet {
            eprintln!("difcodec: no input files found in {}", opts.input.display());
        }
        return 0;
    }
    if let Err(e) = std::fs::create_dir_all(output_dir) {
        eprintln!("difcodec: {}: {e}", output_dir.display());
        return 1;
    }

    #[cfg(feature = "parallel")]
    let results: Vec<Result<(), String>> = {
        use rayon::prelude::*;
        inputs
            .par_iter()
            .map(|input| batch_one(opts, input, output_dir))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let results: Vec<Result<(), String>> = inputs
        .iter()
        .map(|input| batch_one(opts, input, output_dir))
        .collect();

    let mut failed = 0usize;
    for err in results.into_iter().filter_map(Result::err) {
        eprintln!("difcodec: {err}");
        failed += 1;
    }
    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "difcodec: batch: {} converted, {failed} failed",
            inputs.len() - failed
        );
    }
    i32::from(failed > 0)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn log_filter(opts: &Options) -> LevelFilter {
    match (opts.quiet, opts.verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    let mut logger = env_logger::Builder::new();
    logger.filter_level(log_filter(&opts));
    logger
        .parse_env(env_logger::Env::default())
        .format_timestamp(None)
        .format_target(false)
        .init();

    let start = Instant::now();
    let exit_code = match opts.command {
        Command::Encode => cmd_encode(&opts),
        Command::Decode => cmd_decode(&opts),
        Command::Info => cmd_info(&opts),
        Command::Batch => cmd_batch(&opts),
    };

    if opts.timing {
        eprintln!(
            "difcodec: execution time: {:.3} seconds",
            start.elapsed().as_secs_f64()
        );
    }

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
