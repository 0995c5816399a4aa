//! `abtree-stats`: replay a command file against an (a,b)-tree and print,
//! for every run, the average number of nodes read and changed per
//! operation as `size;touched;changed`.

mod logging;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use abtree::workload::{CommandReader, WorkloadRunner};
use abtree::TreeConfig;

#[derive(Parser, Debug)]
#[command(name = "abtree-stats")]
#[command(version)]
#[command(about = "Measure nodes touched per operation in an (a,b)-tree", long_about = None)]
struct Cli {
    /// Command file (`# n`, `I key`, `D key`, one per line)
    #[arg(value_name = "COMMAND_FILE")]
    input: PathBuf,

    /// Lower bound a (a >= 2)
    #[arg(value_name = "A")]
    lower: usize,

    /// Upper bound b (b >= 2a - 1)
    #[arg(value_name = "B")]
    upper: usize,

    /// Audit the tree after every operation
    #[arg(long)]
    verify: bool,

    /// Write summaries to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn run(cli: &Cli) -> abtree::Result<usize> {
    let config = TreeConfig::new(cli.lower, cli.upper)?;
    let commands = CommandReader::open(&cli.input)?;
    let mut runner = WorkloadRunner::new(config).with_verification(cli.verify);

    log::info!("replaying {} on a {}", cli.input.display(), config);

    match &cli.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            let written = runner.run(commands, &mut out)?;
            out.flush()?;
            Ok(written)
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            runner.run(commands, &mut out)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(logging::parse_level(&cli.log_level)) {
        eprintln!("abtree-stats: cannot install logger: {}", e);
    }

    match run(&cli) {
        Ok(runs) => {
            log::info!("{} runs reported", runs);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("abtree-stats: {}", e);
            ExitCode::FAILURE
        }
    }
}
