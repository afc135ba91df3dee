/*!
  The execution engine: the fetch-decode-execute cycle and the semantics of each instruction.

  An `Engine` borrows a `Machine` exclusively for the length of a run, along with its input and
  output collaborators. Each `step` fetches the word at the instruction counter, decodes it, and
  executes it. A step either leaves the machine running, ends the run with an `Outcome`, or
  fails. Failures are fatal: the engine does not catch them, and the machine is left exactly as
  it was when the offending instruction was fetched, so the caller can dump it.

  ```text
  ┌──────────┐   ┌───────────┐   ┌──────────┐
  │  fetch   │──>│  decode   │──>│ execute  │──> advance, jump, or stop
  └──────────┘   └───────────┘   └──────────┘
        ^                                              │
        └──────────────────────────────────────────────┘
  ```
*/

use std::convert::TryFrom;

use strum_macros::{Display as StrumDisplay, EnumString};
use tracing::{debug, info};

use crate::address::{Address, MEMORY_SIZE};
use crate::bytecode::{decode_instruction, in_range, split_word, Instruction, Word};
use crate::dump::dump;
use crate::error::{Result, SimpletronError};
use crate::io::{InputSource, OutputSink};
use crate::loader::prompt_for_word;
use crate::machine::Machine;

/// Printed by HALT ahead of the dump.
pub const HALT_MESSAGE: &str = "\n*** Simpletron execution terminated ***\n";

/// What HALT does after printing its message and dumping the machine.
#[derive(StrumDisplay, EnumString, Copy, Clone, Debug, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum HaltPolicy {
  /// End the run successfully.
  Stop,
  /// Advance past the HALT and keep executing, treating it as a checkpoint.
  Continue,
}

impl Default for HaltPolicy {
  fn default() -> Self {
    HaltPolicy::Stop
  }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct EngineConfig {
  pub halt_policy: HaltPolicy,
}

/// How a successful run ended.
#[derive(StrumDisplay, Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
  /// A HALT instruction under `HaltPolicy::Stop`.
  Halted,
  /// A TERMINATE instruction.
  Terminated,
  /// The instruction counter ran past the last memory cell.
  EndOfMemory,
}

pub struct Engine<'a, I: ?Sized, O: ?Sized> {
  machine : &'a mut Machine,
  input   : &'a mut I,
  output  : &'a mut O,
  config  : EngineConfig,
}

impl<'a, I, O> Engine<'a, I, O>
  where I: InputSource + ?Sized,
        O: OutputSink + ?Sized
{

  pub fn new(machine: &'a mut Machine, input: &'a mut I, output: &'a mut O, config: EngineConfig)
    -> Engine<'a, I, O>
  {
    Engine {
      machine,
      input,
      output,
      config
    }
  }

  /// Steps until the run ends or fails.
  pub fn run(&mut self) -> Result<Outcome> {
    loop {
      if let Some(outcome) = self.step()? {
        info!(%outcome, counter = self.machine.registers.instruction_counter, "run finished");
        return Ok(outcome);
      }
    }
  }

  /**
    Executes one instruction. Returns `Some` when the run has ended. Past the end of memory
    every step reports `Outcome::EndOfMemory` without touching the machine.
  */
  pub fn step(&mut self) -> Result<Option<Outcome>> {
    let counter = self.machine.registers.instruction_counter;
    if counter >= MEMORY_SIZE {
      return Ok(Some(Outcome::EndOfMemory));
    }

    // Fetch
    let word = self.machine.memory.get(counter)?;
    let (operation_code, operand) = split_word(word);
    {
      let registers = &mut self.machine.registers;
      registers.instruction_register = word;
      registers.operation_code       = operation_code;
      registers.operand              = operand;
    }

    // Decode
    let instruction = decode_instruction(word, counter)?;
    debug!(counter, word, %instruction, "execute");

    // Execute
    let outcome = self.execute(instruction)?;

    #[cfg(feature = "trace_computation")] eprintln!("{}", self.machine);

    Ok(outcome)
  }

  // region Instruction semantics

  fn execute(&mut self, instruction: Instruction) -> Result<Option<Outcome>> {
    match instruction {

      // Input/output
      Instruction::Read(address) => {
        match prompt_for_word(address, &mut *self.input, &mut *self.output)? {
          Some(word) => self.machine.write(address, word),
          None       => return Err(SimpletronError::InputExhausted)
        }
      }

      Instruction::Write(address) => {
        let value = self.machine.read(address);
        self.output.emit(&format!("{} : {:05X}\n", address, value))?;
      }

      Instruction::Newline => {
        self.output.emit("\n")?;
      }

      // Load/store
      Instruction::Load(address) => {
        self.machine.registers.accumulator = self.machine.read(address);
      }

      Instruction::Store(address) => {
        self.machine.write(address, self.machine.registers.accumulator);
      }

      // Arithmetic
      Instruction::Add(address) => {
        let value = self.accumulator() + self.operand_value(address);
        self.set_accumulator(value)?;
      }

      Instruction::Subtract(address) => {
        let value = self.accumulator() - self.operand_value(address);
        self.set_accumulator(value)?;
      }

      Instruction::Multiply(address) => {
        let value = self.accumulator() * self.operand_value(address);
        self.set_accumulator(value)?;
      }

      Instruction::Divide(address) => {
        let divisor = self.divisor(address)?;
        self.set_accumulator(self.accumulator() / divisor)?;
      }

      Instruction::Remainder(address) => {
        let divisor = self.divisor(address)?;
        self.set_accumulator(self.accumulator() % divisor)?;
      }

      Instruction::Exponent(address) => {
        let exponent = self.operand_value(address);
        let exponent =
          u32::try_from(exponent).map_err(|_| self.overflow(exponent))?;
        self.set_accumulator(self.accumulator().saturating_pow(exponent))?;
      }

      // Transfer of control
      Instruction::Branch(address) => {
        self.jump(address);
        return Ok(None);
      }

      Instruction::BranchNeg(address) => {
        if self.machine.registers.accumulator < 0 {
          self.jump(address);
          return Ok(None);
        }
      }

      Instruction::BranchZero(address) => {
        if self.machine.registers.accumulator == 0 {
          self.jump(address);
          return Ok(None);
        }
      }

      Instruction::Halt => {
        self.output.emit(HALT_MESSAGE)?;
        dump(self.machine, &mut *self.output)?;
        if self.config.halt_policy == HaltPolicy::Stop {
          self.advance();
          return Ok(Some(Outcome::Halted));
        }
      }

      // Simulation control
      Instruction::Terminate => {
        return Ok(Some(Outcome::Terminated));
      }

    } // end match on instruction

    self.advance();
    Ok(None)
  }

  // endregion

  // region Helpers

  fn advance(&mut self) {
    self.machine.registers.instruction_counter += 1;
  }

  fn jump(&mut self, address: Address) {
    self.machine.registers.instruction_counter = address.idx();
  }

  /// The accumulator widened so that results can be range checked before they are stored.
  fn accumulator(&self) -> i64 {
    self.machine.registers.accumulator as i64
  }

  fn operand_value(&self, address: Address) -> i64 {
    self.machine.read(address) as i64
  }

  /// The operand of a DIVIDE or REMAINDER. Zero is refused before any quotient exists.
  fn divisor(&self, address: Address) -> Result<i64> {
    match self.operand_value(address) {
      0       => Err(SimpletronError::DivideByZero {
                   counter: self.machine.registers.instruction_counter
                 }),
      divisor => Ok(divisor)
    }
  }

  fn overflow(&self, value: i64) -> SimpletronError {
    SimpletronError::AccumulatorOverflow {
      value,
      counter: self.machine.registers.instruction_counter
    }
  }

  /// Commits an arithmetic result. Out of range results are refused and nothing changes.
  fn set_accumulator(&mut self, value: i64) -> Result<()> {
    if !in_range(value) {
      return Err(self.overflow(value));
    }
    self.machine.registers.accumulator = value as Word;
    Ok(())
  }

  // endregion

}
