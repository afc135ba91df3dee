//! Text rendering of the full machine state, and the report printed when a run ends.

use std::fmt::{Display, Formatter};
use std::io;

use crate::error::{SimpletronError, PROGRAM_END};
use crate::io::OutputSink;
use crate::machine::Machine;

/// Printed after every abnormal termination, following any kind-specific line.
pub const FATAL_ERROR_BANNER: &str = "*** Simpletron execution abnormally terminated ***";

const WORDS_PER_ROW: usize = 10;
// Row labels step by 0x10 even though rows hold ten words.
const ROW_LABEL_STEP: usize = 0x10;

/**
  Renders registers and all of memory:
  ```text
      REGISTER:
      accumulator             0x00007
      instructionCounter      0x03
      ...

      MEMORY:
              0x000   0x001   ...
      0x000 0x20005 0x30006 ...
  ```
*/
pub struct Dump<'a>(pub &'a Machine);

impl Display for Dump<'_> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let Dump(machine) = self;
    let registers     = &machine.registers;

    writeln!(f, "REGISTER:")?;
    writeln!(f, "accumulator\t\t0x{:05X}",         registers.accumulator)?;
    writeln!(f, "instructionCounter\t0x{:02X}",    registers.instruction_counter)?;
    writeln!(f, "instructionRegister\t0x{:05X}",   registers.instruction_register)?;
    writeln!(f, "operationCode\t\t0x{:02X}",       registers.operation_code)?;
    writeln!(f, "operand\t\t\t0x{:03X}",           registers.operand)?;

    writeln!(f, "\nMEMORY:")?;
    write!(f, "     ")?;
    for column in 0..WORDS_PER_ROW {
      write!(f, "   0x{:03X}", column)?;
    }

    for (row, cells) in machine.memory.cells().chunks(WORDS_PER_ROW).enumerate() {
      write!(f, "\n0x{:03X}", row * ROW_LABEL_STEP)?;
      for cell in cells {
        write!(f, " 0x{:05X}", cell)?;
      }
    }
    write!(f, "\n\n")
  }
}

pub fn format_dump(machine: &Machine) -> String {
  Dump(machine).to_string()
}

/// Emits the full-state dump.
pub fn dump<O: OutputSink + ?Sized>(machine: &Machine, output: &mut O) -> io::Result<()> {
  output.emit(&format_dump(machine))
}

/**
  Reports how a run ended and returns the process exit code. Success is silent. Failure dumps
  the machine, then prints the kind's message, if it has one, and the fatal banner.
*/
pub fn report<T, O>(machine: &Machine, result: &Result<T, SimpletronError>, output: &mut O)
  -> io::Result<i32>
  where O: OutputSink + ?Sized
{
  match result {

    Ok(_) => Ok(PROGRAM_END),

    Err(error) => {
      dump(machine, output)?;
      if let Some(message) = error.banner_message() {
        output.emit(&format!("{}\n", message))?;
      }
      output.emit(&format!("{}\n", FATAL_ERROR_BANNER))?;
      Ok(error.exit_code())
    }

  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::address::Address;

  #[test]
  fn dump_layout(){
    let mut machine = Machine::new();
    machine.write(Address::new(0).unwrap(), 0x20005);
    machine.write(Address::new(11).unwrap(), 0x7);
    machine.registers.accumulator          = 7;
    machine.registers.instruction_counter  = 3;
    machine.registers.instruction_register = 0x43000;
    machine.registers.operation_code       = 0x43;

    let text  = format_dump(&machine);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "REGISTER:");
    assert_eq!(lines[1], "accumulator\t\t0x00007");
    assert_eq!(lines[2], "instructionCounter\t0x03");
    assert_eq!(lines[3], "instructionRegister\t0x43000");
    assert_eq!(lines[4], "operationCode\t\t0x43");
    assert_eq!(lines[5], "operand\t\t\t0x000");
    assert_eq!(lines[6], "");
    assert_eq!(lines[7], "MEMORY:");
    assert_eq!(
      lines[8],
      "        0x000   0x001   0x002   0x003   0x004   0x005   0x006   0x007   0x008   0x009"
    );
    assert!(lines[9].starts_with("0x000 0x20005 0x00000"));
    assert!(lines[10].starts_with("0x010 0x00000 0x00007"));
    // One hundred rows, the last labelled 99 * 0x10.
    assert!(lines[108].starts_with("0x630 "));
    assert_eq!(lines[108].split(' ').count(), 11);
    assert!(text.ends_with("\n\n"));
  }

  #[test]
  fn dump_writes_display_form(){
    let mut machine = Machine::new();
    machine.registers.accumulator = 0x42;
    let mut output: Vec<u8> = vec![];
    dump(&machine, &mut output).unwrap();

    let text = String::from_utf8(output).unwrap();
    assert_eq!(text, Dump(&machine).to_string());
    assert_eq!(text.lines().count(), 110);
  }

  #[test]
  fn success_is_silent(){
    let machine = Machine::new();
    let mut output: Vec<u8> = vec![];
    let result: Result<(), SimpletronError> = Ok(());
    assert_eq!(report(&machine, &result, &mut output).unwrap(), 0);
    assert!(output.is_empty());
  }

  #[test]
  fn failure_dumps_then_banners(){
    let machine = Machine::new();
    let mut output: Vec<u8> = vec![];
    let result: Result<(), SimpletronError> = Err(SimpletronError::DivideByZero{ counter: 0 });

    assert_eq!(report(&machine, &result, &mut output).unwrap(), 2);

    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with("REGISTER:"));
    assert!(text.ends_with(
      "\n\n*** Attempt to divide by zero ***\n*** Simpletron execution abnormally terminated ***\n"
    ));
  }

  #[test]
  fn general_error_has_banner_only(){
    let machine = Machine::new();
    let mut output: Vec<u8> = vec![];
    let result: Result<(), SimpletronError> = Err(SimpletronError::InputExhausted);

    assert_eq!(report(&machine, &result, &mut output).unwrap(), 1);

    let text = String::from_utf8(output).unwrap();
    assert!(text.ends_with("\n\n*** Simpletron execution abnormally terminated ***\n"));
  }
}
