/*!

  The machine has a word size of 20 bits, stored in a signed 32 bit integer so that the results
  of arithmetic can be range checked before they are committed. Every instruction is exactly one
  word, five hex digits wide:

    Opcode:   2 hex digits (word / 0x1000)
    Operand:  3 hex digits (word % 0x1000)

  The operand field can hold 0x000-0xFFF, but only 0x000-0x3E7 name memory cells. The range is
  checked when the word is decoded, so a decoded `Instruction` only ever carries valid addresses.

  Words are decoded into a closed `Instruction` enum whose payload is the operand. The opcode
  alone is the `Operation` enum, which carries the numeric opcode as its discriminant and the
  mnemonic as its name. The assembler works in terms of `Operation` since it sees mnemonics
  before it knows addresses.

*/

mod binary;
mod instruction;
pub mod assembly;

pub use binary::{decode_instruction, encode_instruction, in_range, split_word, Word,
                 MAX_WORD, MIN_WORD, OPERAND_RADIX, SENTINEL_VALUE};
pub use instruction::{Instruction, Operation};
pub use assembly::{assemble, Program};
