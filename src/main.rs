use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt};

use tapevm::bytecode::disasm::print_bc;
use tapevm::runtime::{CellWidth, EofPolicy, TapePolicy};
use tapevm::{ProgramBc, Vm, VmConfig, compile};

/// Compile and run programs for the eight-command tape language.
#[derive(Parser, Debug)]
#[clap(version)]
#[command(arg_required_else_help(true))]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a source file or a compiled image against stdin/stdout.
    Run(Run),
    /// Print the compiled instruction listing.
    Disasm(Disasm),
    /// Compile a source file to a binary image.
    Build(Build),
}

#[derive(Args, Debug)]
struct Run {
    file: PathBuf,

    /// What a move past either end of the tape does.
    #[arg(long, value_enum, default_value_t = TapePolicy::Fault)]
    tape_policy: TapePolicy,

    /// Cell arithmetic width.
    #[arg(long, value_enum, default_value_t = CellWidth::U8)]
    cell_width: CellWidth,

    /// What reading past the end of stdin stores.
    #[arg(long, value_enum, default_value_t = EofPolicy::Fault)]
    eof: EofPolicy,

    /// Abort after this many instructions.
    #[arg(long)]
    max_steps: Option<u64>,
}

#[derive(Args, Debug)]
struct Disasm {
    file: PathBuf,
}

#[derive(Args, Debug)]
struct Build {
    file: PathBuf,

    /// Output path. Defaults to the input with a `.tvm` extension.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{}': {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Engine(#[from] tapevm::Error),
}

impl From<tapevm::CompileError> for CliError {
    fn from(e: tapevm::CompileError) -> Self {
        CliError::Engine(e.into())
    }
}

impl From<tapevm::RuntimeError> for CliError {
    fn from(e: tapevm::RuntimeError) -> Self {
        CliError::Engine(e.into())
    }
}

fn main() {
    init_logging();

    if let Err(e) = Cli::parse().exec() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr so they never mix with program output.
fn init_logging() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

impl Cli {
    fn exec(self) -> Result<(), CliError> {
        match self.cmd {
            Command::Run(r) => r.exec(),
            Command::Disasm(d) => d.exec(),
            Command::Build(b) => b.exec(),
        }
    }
}

impl Run {
    fn exec(self) -> Result<(), CliError> {
        let prog = load_program(&self.file)?;

        let config = VmConfig {
            tape_policy: self.tape_policy,
            cell_width: self.cell_width,
            eof_policy: self.eof,
            max_steps: self.max_steps,
        };

        let stdin = io::stdin();
        let mut input = stdin.lock();
        let stdout = io::stdout();
        let mut output = BufWriter::new(stdout.lock());

        let result = Vm::with_config(config).run(&prog, &mut input, &mut output);
        if result.is_err() {
            // Keep whatever the program printed before it failed
            let _ = output.flush();
        }
        result?;
        Ok(())
    }
}

impl Disasm {
    fn exec(self) -> Result<(), CliError> {
        let prog = load_program(&self.file)?;
        print_bc(&prog);
        Ok(())
    }
}

impl Build {
    fn exec(self) -> Result<(), CliError> {
        let prog = load_program(&self.file)?;
        let out_path = self
            .output
            .unwrap_or_else(|| self.file.with_extension("tvm"));

        let bytes = prog.to_bytes()?;
        fs::write(&out_path, bytes).map_err(|source| CliError::Write {
            path: out_path.clone(),
            source,
        })?;

        tracing::info!(path = %out_path.display(), instructions = prog.len(), "wrote image");
        Ok(())
    }
}

/// Load either a binary image or source text, decided by the image header.
fn load_program(path: &Path) -> Result<ProgramBc, CliError> {
    let bytes = fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if ProgramBc::is_image(&bytes) {
        return Ok(ProgramBc::from_bytes(&bytes)?);
    }

    let source = String::from_utf8_lossy(&bytes);
    Ok(compile(&source)?)
}
