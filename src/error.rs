//! The error taxonomy of the machine. Every error is fatal to the run it occurs in; the
//! associated exit code is what the process reports when the run aborts.

use thiserror::Error;

use crate::bytecode::Word;

pub const PROGRAM_END          : i32 = 0;
pub const GENERAL_ERROR        : i32 = 1;
pub const DIVIDE_BY_ZERO       : i32 = 2;
pub const INVALID_OP_CODE      : i32 = 3;
pub const ACCUMULATOR_OVERFLOW : i32 = 4;
pub const ADDRESS_OUT_OF_RANGE : i32 = 5;

#[derive(Debug, Error)]
pub enum SimpletronError {
  /// The decoded opcode names none of the defined operations.
  #[error("invalid operation code {opcode:#04X} in word {word:#07X} at {counter:#05X}")]
  InvalidOpcode {
    opcode  : Word,
    word    : Word,
    counter : usize
  },

  /// The divisor of a DIVIDE or REMAINDER is zero.
  #[error("attempt to divide by zero at {counter:#05X}")]
  DivideByZero { counter: usize },

  /// An arithmetic result would leave the accumulator's valid range.
  #[error("accumulator overflow at {counter:#05X}: result {value} is out of range")]
  AccumulatorOverflow {
    value   : i64,
    counter : usize
  },

  /// An operand or memory index does not name a memory cell.
  #[error("memory address {0:#05X} out of range")]
  AddressOutOfRange(i64),

  /// The input source read text that is not a word. The text has been consumed, so asking
  /// again yields what follows it.
  #[error("`{0}` is not a hexadecimal word")]
  MalformedInput(String),

  /// READ needed a word but the input source has none left.
  #[error("input exhausted")]
  InputExhausted,

  #[error("program of {0} words does not fit in memory")]
  ProgramTooLarge(usize),

  #[error(transparent)]
  Assembly(#[from] AssemblyError),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

impl SimpletronError {
  /// The process exit code reported for this error.
  pub fn exit_code(&self) -> i32 {
    match self {
      SimpletronError::DivideByZero { .. }        => DIVIDE_BY_ZERO,
      SimpletronError::InvalidOpcode { .. }       => INVALID_OP_CODE,
      SimpletronError::AccumulatorOverflow { .. } => ACCUMULATOR_OVERFLOW,
      SimpletronError::AddressOutOfRange(_)       => ADDRESS_OUT_OF_RANGE,
      _                                           => GENERAL_ERROR
    }
  }

  /// The console line printed ahead of the fatal banner, if this kind has one.
  pub fn banner_message(&self) -> Option<&'static str> {
    match self {
      SimpletronError::DivideByZero { .. }        => Some("*** Attempt to divide by zero ***"),
      SimpletronError::InvalidOpcode { .. }       => Some("*** Invalid operation code ***"),
      SimpletronError::AccumulatorOverflow { .. } => Some("*** Accumulator overflow ***"),
      SimpletronError::AddressOutOfRange(_)       => Some("*** Memory address out of range ***"),
      _                                           => None
    }
  }
}

/// Diagnostics produced while assembling mnemonic text. Line numbers count from 1.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum AssemblyError {
  #[error("line {line}: syntax error near `{text}`")]
  Syntax { line: usize, text: String },

  #[error("line {line}: {name} is not an operation")]
  NotAnOperation { line: usize, name: String },

  #[error("line {line}: {operation} requires an operand")]
  MissingOperand { line: usize, operation: String },

  #[error("line {line}: {operation} takes no operand")]
  UnexpectedOperand { line: usize, operation: String },

  #[error("line {line}: label `{label}` is already defined")]
  DuplicateLabel { line: usize, label: String },

  #[error("line {line}: label `{label}` is not defined")]
  UndefinedLabel { line: usize, label: String },

  #[error("line {line}: value {value:#X} is out of range")]
  ValueOutOfRange { line: usize, value: i64 },

  #[error("line {line}: program does not fit in memory")]
  ProgramTooLarge { line: usize },
}

pub type Result<T> = std::result::Result<T, SimpletronError>;


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exit_codes(){
    assert_eq!(SimpletronError::DivideByZero{ counter: 0 }.exit_code(), 2);
    assert_eq!(
      SimpletronError::InvalidOpcode{ opcode: 0x99, word: 0x99000, counter: 0 }.exit_code(),
      3
    );
    assert_eq!(SimpletronError::AccumulatorOverflow{ value: -1, counter: 0 }.exit_code(), 4);
    assert_eq!(SimpletronError::AddressOutOfRange(1000).exit_code(), 5);
    assert_eq!(SimpletronError::InputExhausted.exit_code(), GENERAL_ERROR);
    assert_eq!(SimpletronError::ProgramTooLarge(1001).exit_code(), GENERAL_ERROR);
    assert_eq!(SimpletronError::MalformedInput("xyz".into()).exit_code(), GENERAL_ERROR);
  }

  #[test]
  fn general_errors_have_no_banner_message(){
    assert_eq!(SimpletronError::InputExhausted.banner_message(), None);
    assert_eq!(
      SimpletronError::DivideByZero{ counter: 4 }.banner_message(),
      Some("*** Attempt to divide by zero ***")
    );
  }

  #[test]
  fn assembly_errors_convert(){
    let error: SimpletronError = AssemblyError::UndefinedLabel{ line: 3, label: "loop".into() }.into();
    assert_eq!(error.to_string(), "line 3: label `loop` is not defined");
    assert_eq!(error.exit_code(), GENERAL_ERROR);
  }
}
