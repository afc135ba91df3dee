//!
//! Run a Simpletron program.
//!
//! Usage: `simpletron [PROGRAM] [--format hex|asm] [--halt stop|continue] [--listing]`
//!
//! Without a program file the machine greets the user and takes the program from the console,
//! one word per prompted address. READ instructions always take their input from stdin.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use simpletron::bytecode::assemble;
use simpletron::error::GENERAL_ERROR;
use simpletron::io::{HexReader, InputSource, OutputSink};
use simpletron::{dump, loader};
use simpletron::{Engine, EngineConfig, HaltPolicy, Machine, Program, Result};

#[derive(Parser, Debug)]
#[command(name = "simpletron")]
#[command(about = "Load and run a Simpletron machine language program")]
struct Args {
  /// Program file. Without one, the program is entered at the console
  program: Option<PathBuf>,

  /// How the program file is written. Defaults to `asm` for `.asm` and `.sasm` files
  #[arg(long, value_enum)]
  format: Option<Format>,

  /// What HALT does after dumping the machine
  #[arg(long, default_value_t = HaltPolicy::Stop)]
  halt: HaltPolicy,

  /// Print a listing of the loaded program before running it
  #[arg(long)]
  listing: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
enum Format {
  /// Hexadecimal words separated by whitespace
  Hex,
  /// Mnemonic assembly
  Asm,
}

impl Format {
  fn for_path(path: &Path) -> Format {
    match path.extension().and_then(|extension| extension.to_str()) {
      Some("asm") | Some("sasm") => Format::Asm,
      _                          => Format::Hex
    }
  }
}

fn init_logging() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

  fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(io::stderr)
    .init();
}

/// Reads a program file into memory, returning the loaded program for listings.
fn load_file(machine: &mut Machine, path: &Path, format: Format) -> Result<Program> {
  let program =
    match format {

      Format::Hex => {
        let mut words = HexReader::new(BufReader::new(File::open(path)?));
        let count     = loader::load(machine, &mut words, &mut io::sink())?;
        Program {
          words   : machine.memory.cells()[..count].to_vec(),
          symbols : Default::default()
        }
      }

      Format::Asm => {
        let program = assemble(&fs::read_to_string(path)?)?;
        machine.load_program(&program.words)?;
        program
      }

    };

  info!(path = %path.display(), words = program.words.len(), "program loaded");
  Ok(program)
}

fn load<I, O>(args: &Args, machine: &mut Machine, input: &mut I, output: &mut O) -> Result<()>
  where I: InputSource + ?Sized,
        O: OutputSink + ?Sized
{
  match &args.program {

    Some(path) => {
      let format  = args.format.unwrap_or_else(|| Format::for_path(path));
      let program = load_file(machine, path, format)?;
      if args.listing {
        output.emit(&program.to_string())?;
      }
    }

    None => {
      loader::greet(output)?;
      loader::load(machine, input, output)?;
    }

  }
  Ok(())
}

fn main() {
  init_logging();

  let args   = Args::parse();
  let config = EngineConfig { halt_policy: args.halt };

  let stdin       = io::stdin();
  let mut input   = HexReader::new(stdin.lock());
  let mut output  = io::stdout();
  let mut machine = Machine::new();

  let result =
    load(&args, &mut machine, &mut input, &mut output)
      .and_then(|_| Engine::new(&mut machine, &mut input, &mut output, config).run());

  if let Err(e) = &result {
    error!("{}", e);
  }

  let code = dump::report(&machine, &result, &mut output).unwrap_or(GENERAL_ERROR);
  process::exit(code);
}
