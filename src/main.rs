use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cobc::config::CompileOptions;

/// Compiles a BOS unit script into a COB bytecode object file.
#[derive(Parser, Debug)]
#[command(name = "cobc", version, about)]
struct Cli {
    /// Path to the `.bos` source file.
    input: PathBuf,

    /// Output path for the compiled `.cob` object file. Defaults to the
    /// input path with its extension replaced by `.cob`.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Additional directory to search for `#include`d files. May be given
    /// more than once.
    #[arg(short = 'I', long = "include")]
    include: Vec<PathBuf>,

    /// Fold constant subexpressions before lowering.
    #[arg(long, default_value_t = true)]
    fold_constants: bool,

    /// Treat an unhandled construct as a hard error instead of a warning.
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let output_path = cli.output.clone().unwrap_or_else(|| cli.input.with_extension("cob"));

    let options = CompileOptions { fold_constants: cli.fold_constants, strict: cli.strict, include_paths: cli.include };

    let source = match fs::read_to_string(&cli.input) {
        Ok(s) => s,
        Err(e) => {
            log::error!("failed to read {}: {}", cli.input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match cobc::compile_source(&source, &cli.input, &options) {
        Ok(bytes) => {
            if let Err(e) = fs::write(&output_path, bytes) {
                log::error!("failed to write {}: {}", output_path.display(), e);
                return ExitCode::FAILURE;
            }
            log::info!("wrote {}", output_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
