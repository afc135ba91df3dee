use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use num_enum::{TryFromPrimitive, IntoPrimitive};

use crate::address::Address;
use crate::bytecode::Word;

/**
  Opcodes of the virtual machine.

  The discriminant of each variant is the opcode as it appears in the high two hex digits of an
  instruction word, so converting between the two is a `TryFrom`/`Into` away. Mnemonics are the
  upper case variant names and parse case-insensitively.

  Opcodes are grouped by the high digit:
      ```
      0x1_  input/output
      0x2_  load/store
      0x3_  arithmetic
      0x4_  transfer of control
      0xFF  terminate
      ```
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,          Eq,         PartialEq, Debug,            Hash
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[repr(u8)]
pub enum Operation {
  // Input/output
  Read       = 0x10, // read( address )
  Write      = 0x11, // write( address )
  Newline    = 0x13, // newline

  // Load/store
  Load       = 0x20, // load( address )
  Store      = 0x21, // store( address )

  // Arithmetic
  Add        = 0x30, // add( address )
  Subtract   = 0x31, // subtract( address )
  Divide     = 0x32, // divide( address )
  Multiply   = 0x33, // multiply( address )
  Remainder  = 0x34, // remainder( address )
  Exponent   = 0x35, // exponent( address )

  // Transfer of control
  Branch     = 0x40, // branch( address )
  BranchNeg  = 0x41, // branchneg( address )
  BranchZero = 0x42, // branchzero( address )
  Halt       = 0x43, // halt

  // Simulation control
  Terminate  = 0xFF, // terminate
}

impl Operation {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// Looks up the operation for a decoded opcode field.
  pub fn from_opcode(opcode: Word) -> Option<Operation> {
    u8::try_from(opcode).ok()
                        .and_then(|code| Operation::try_from(code).ok())
  }

  /// Whether the operand field of this operation names a memory cell.
  pub fn takes_operand(&self) -> bool {
    !matches!(self, Operation::Newline | Operation::Halt | Operation::Terminate)
  }
}

/// A decoded instruction. The payload is the operand address for operations that have one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
  Read(Address),
  Write(Address),
  Newline,
  Load(Address),
  Store(Address),
  Add(Address),
  Subtract(Address),
  Divide(Address),
  Multiply(Address),
  Remainder(Address),
  Exponent(Address),
  Branch(Address),
  BranchNeg(Address),
  BranchZero(Address),
  Halt,
  Terminate,
}

impl Instruction {
  /// Pairs an operation with its operand. The operand is ignored for operations without one.
  pub fn new(operation: Operation, operand: Address) -> Instruction {
    match operation {
      Operation::Read       => Instruction::Read(operand),
      Operation::Write      => Instruction::Write(operand),
      Operation::Newline    => Instruction::Newline,
      Operation::Load       => Instruction::Load(operand),
      Operation::Store      => Instruction::Store(operand),
      Operation::Add        => Instruction::Add(operand),
      Operation::Subtract   => Instruction::Subtract(operand),
      Operation::Divide     => Instruction::Divide(operand),
      Operation::Multiply   => Instruction::Multiply(operand),
      Operation::Remainder  => Instruction::Remainder(operand),
      Operation::Exponent   => Instruction::Exponent(operand),
      Operation::Branch     => Instruction::Branch(operand),
      Operation::BranchNeg  => Instruction::BranchNeg(operand),
      Operation::BranchZero => Instruction::BranchZero(operand),
      Operation::Halt       => Instruction::Halt,
      Operation::Terminate  => Instruction::Terminate,
    }
  }

  pub fn operation(&self) -> Operation {
    match self {
      Instruction::Read(_)       => Operation::Read,
      Instruction::Write(_)      => Operation::Write,
      Instruction::Newline       => Operation::Newline,
      Instruction::Load(_)       => Operation::Load,
      Instruction::Store(_)      => Operation::Store,
      Instruction::Add(_)        => Operation::Add,
      Instruction::Subtract(_)   => Operation::Subtract,
      Instruction::Divide(_)     => Operation::Divide,
      Instruction::Multiply(_)   => Operation::Multiply,
      Instruction::Remainder(_)  => Operation::Remainder,
      Instruction::Exponent(_)   => Operation::Exponent,
      Instruction::Branch(_)     => Operation::Branch,
      Instruction::BranchNeg(_)  => Operation::BranchNeg,
      Instruction::BranchZero(_) => Operation::BranchZero,
      Instruction::Halt          => Operation::Halt,
      Instruction::Terminate     => Operation::Terminate,
    }
  }

  pub fn operand(&self) -> Option<Address> {
    match *self {
      | Instruction::Read(a)
      | Instruction::Write(a)
      | Instruction::Load(a)
      | Instruction::Store(a)
      | Instruction::Add(a)
      | Instruction::Subtract(a)
      | Instruction::Divide(a)
      | Instruction::Multiply(a)
      | Instruction::Remainder(a)
      | Instruction::Exponent(a)
      | Instruction::Branch(a)
      | Instruction::BranchNeg(a)
      | Instruction::BranchZero(a) => Some(a),

      | Instruction::Newline
      | Instruction::Halt
      | Instruction::Terminate     => None
    }
  }
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.operand() {
      Some(address) => write!(f, "{} {}", self.operation(), address),
      None          => write!(f, "{}", self.operation())
    }
  }
}


#[cfg(test)]
mod tests {
  use std::str::FromStr;
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn opcodes_round_trip_through_variants(){
    for operation in Operation::iter() {
      assert_eq!(Operation::from_opcode(operation.code() as Word), Some(operation));
    }
    assert_eq!(Operation::from_opcode(0x12), None);
    assert_eq!(Operation::from_opcode(0x99), None);
    assert_eq!(Operation::from_opcode(0x100), None);
    assert_eq!(Operation::from_opcode(-1), None);
  }

  #[test]
  fn mnemonics(){
    assert_eq!(Operation::BranchNeg.to_string(), "BRANCHNEG");
    assert_eq!(Operation::from_str("branchzero"), Ok(Operation::BranchZero));
    assert_eq!(Operation::from_str("Store"), Ok(Operation::Store));
    assert!(Operation::from_str("STRING").is_err());
  }

  #[test]
  fn instruction_display(){
    let address = Address::new(7).unwrap();
    assert_eq!(Instruction::Store(address).to_string(), "STORE 0x007");
    assert_eq!(Instruction::Halt.to_string(), "HALT");
  }

  #[test]
  fn operations_without_operands(){
    let address = Address::new(12).unwrap();
    assert_eq!(Instruction::new(Operation::Halt, address), Instruction::Halt);
    assert_eq!(Instruction::new(Operation::Halt, address).operand(), None);
    assert!(!Operation::Terminate.takes_operand());
    assert!(Operation::Branch.takes_operand());
  }
}
