/*!
  This module is responsible for the encoding and decoding of instruction words.

*/
use std::convert::TryFrom;

use super::{Instruction, Operation};
use crate::address::Address;
use crate::error::SimpletronError;

// If you change this you must also change `encode_instruction` and `decode_instruction`.
pub type Word = i32;

/// Smallest value a memory cell or the accumulator may hold.
pub const MIN_WORD: Word = 0x00000;
/// Largest value a memory cell or the accumulator may hold.
pub const MAX_WORD: Word = 0xFFFFF;
/// Ends program entry when typed at the loader. It also decodes as `TERMINATE`.
pub const SENTINEL_VALUE: Word = 0xFFFFF;

/// The opcode occupies the digits above this radix, the operand the three below.
pub const OPERAND_RADIX: Word = 0x1000;

/// Whether `value` is a legal cell value.
pub fn in_range(value: i64) -> bool {
  (MIN_WORD as i64..=MAX_WORD as i64).contains(&value)
}

/// Splits a word into its raw opcode and operand fields, without validating either.
pub fn split_word(word: Word) -> (Word, Word) {
  (word / OPERAND_RADIX, word % OPERAND_RADIX)
}

/**
  Decodes an instruction word. The `counter` is the address the word was fetched from and is
  only used to describe failures.

  Fails with `InvalidOpcode` when the opcode field names no operation and with
  `AddressOutOfRange` when an operation that addresses memory has an operand past the end of
  memory. Operations without an operand ignore the field entirely.
*/
pub fn decode_instruction(word: Word, counter: usize) -> Result<Instruction, SimpletronError> {
  let (opcode, operand) = split_word(word);

  let operation =
    match Operation::from_opcode(opcode) {
      Some(operation) => operation,
      None            => return Err(SimpletronError::InvalidOpcode { opcode, word, counter })
    };

  let address =
    match operation.takes_operand() {
      true  => Address::try_from(operand)?,
      false => Address::default()
    };

  Ok(Instruction::new(operation, address))
}

/// Encodes the instruction into a word.
pub fn encode_instruction(instruction: Instruction) -> Word {
  let operand =
    match instruction.operand() {
      Some(address) => address.idx() as Word,
      None          => 0
    };
  (instruction.operation().code() as Word) * OPERAND_RADIX + operand
}
