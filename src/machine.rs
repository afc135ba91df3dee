//! Memory and registers of the machine. This is storage only; the engine gives it meaning.

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};

use crate::address::{Address, MEMORY_SIZE};
use crate::bytecode::Word;
use crate::error::{Result, SimpletronError};

/// A fixed-size, zero-indexed array of words.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Memory {
  cells: [Word; MEMORY_SIZE]
}

impl Memory {
  pub fn new() -> Memory {
    Memory { cells: [0; MEMORY_SIZE] }
  }

  pub fn reset(&mut self) {
    self.cells = [0; MEMORY_SIZE];
  }

  pub fn read(&self, address: Address) -> Word {
    self.cells[address.idx()]
  }

  pub fn write(&mut self, address: Address, value: Word) {
    self.cells[address.idx()] = value;
  }

  /// Reads a raw index, failing with `AddressOutOfRange` past the end of memory.
  pub fn get(&self, idx: usize) -> Result<Word> {
    self.cells
        .get(idx)
        .copied()
        .ok_or(SimpletronError::AddressOutOfRange(idx as i64))
  }

  pub fn cells(&self) -> &[Word] {
    &self.cells
  }
}

impl Default for Memory {
  fn default() -> Self {
    Memory::new()
  }
}

/// The scalar registers. All of them default to zero.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Registers {
  /// The arithmetic register all computation flows through.
  pub accumulator          : Word,
  /// Index of the next instruction to fetch. Equal to `MEMORY_SIZE` once execution runs off
  /// the end of memory.
  pub instruction_counter  : usize,
  /// The word most recently fetched.
  pub instruction_register : Word,
  /// Opcode field of `instruction_register`, exactly as decoded, valid or not.
  pub operation_code       : Word,
  /// Operand field of `instruction_register`, exactly as decoded, valid or not.
  pub operand              : Word,
}

/// The complete state of one machine. Independent machines share nothing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Machine {
  pub memory    : Memory,
  pub registers : Registers,
}

impl Machine {

  // region Display methods

  fn make_register_table(&self) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Register", ubl->"Contents"]);

    let registers = &self.registers;
    table.add_row(row![r->"accumulator =",          format!("0x{:05X}", registers.accumulator)]);
    table.add_row(row![r->"instructionCounter =",   format!("0x{:03X}", registers.instruction_counter)]);
    table.add_row(row![r->"instructionRegister =",  format!("0x{:05X}", registers.instruction_register)]);
    table.add_row(row![r->"operationCode =",        format!("0x{:02X}", registers.operation_code)]);
    table.add_row(row![r->"operand =",              format!("0x{:03X}", registers.operand)]);
    table
  }

  /// Only nonzero cells are shown, plus the cell the counter points at.
  fn make_memory_table(&self) -> Table {
    let highlight = self.registers.instruction_counter;
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (i, cell) in self.memory.cells().iter().enumerate() {
      match i == highlight {

        true  => {
          table.add_row(
            row![r->format!("* --> M[0x{:03X}] =", i), format!("0x{:05X}", cell)]
          );
        }

        false if *cell != 0 => {
          table.add_row(
            row![r->format!("M[0x{:03X}] =", i), format!("0x{:05X}", cell)]
          );
        }

        false => {}

      } // end match on highlight
    } // end for
    table
  }

  // endregion

  pub fn new() -> Machine {
    Machine {
      memory    : Memory::new(),
      registers : Registers::default(),
    }
  }

  /// Zeroes every memory cell and returns every register to its default.
  pub fn reset(&mut self) {
    self.memory.reset();
    self.registers = Registers::default();
  }

  pub fn read(&self, address: Address) -> Word {
    self.memory.read(address)
  }

  pub fn write(&mut self, address: Address, value: Word) {
    self.memory.write(address, value)
  }

  /// Copies `words` into memory starting at address zero. Cells past the program are untouched.
  pub fn load_program(&mut self, words: &[Word]) -> Result<()> {
    if words.len() > MEMORY_SIZE {
      return Err(SimpletronError::ProgramTooLarge(words.len()));
    }
    self.memory.cells[..words.len()].copy_from_slice(words);
    Ok(())
  }
}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let r_table = self.make_register_table();
    let m_table = self.make_memory_table();

    let mut combined_table = table!([r_table, m_table]);

    combined_table.set_titles(row![ub->"Registers", ub->"Memory"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "{}", combined_table)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  fn address(idx: usize) -> Address {
    Address::new(idx).unwrap()
  }

  #[test]
  fn new_machine_is_zeroed(){
    let machine = Machine::new();
    assert_eq!(machine.memory.cells().len(), MEMORY_SIZE);
    assert!(machine.memory.cells().iter().all(|&cell| cell == 0));
    assert_eq!(machine.registers, Registers::default());
  }

  #[test]
  fn read_write_reset(){
    let mut machine = Machine::new();
    machine.write(address(999), 0xFFFFF);
    machine.registers.accumulator = 7;
    assert_eq!(machine.read(address(999)), 0xFFFFF);

    machine.reset();
    assert_eq!(machine.read(address(999)), 0);
    assert_eq!(machine.registers.accumulator, 0);
  }

  #[test]
  fn raw_reads_are_checked(){
    let machine = Machine::new();
    assert_eq!(machine.memory.get(999).unwrap(), 0);
    assert!(matches!(machine.memory.get(1000), Err(SimpletronError::AddressOutOfRange(1000))));
  }

  #[test]
  fn load_program(){
    let mut machine = Machine::new();
    machine.write(address(10), 5);
    machine.load_program(&[0x20005, 0x43000]).unwrap();
    assert_eq!(&machine.memory.cells()[..3], &[0x20005, 0x43000, 0]);
    assert_eq!(machine.read(address(10)), 5);

    let too_big = vec![0; MEMORY_SIZE + 1];
    assert!(matches!(
      machine.load_program(&too_big),
      Err(SimpletronError::ProgramTooLarge(1001))
    ));
  }

  #[test]
  fn display_shows_nonzero_cells(){
    let mut machine = Machine::new();
    machine.write(address(0x2A), 0x1234);
    let text = machine.to_string();
    assert!(text.contains("* --> M[0x000] ="));
    assert!(text.contains("M[0x02A] ="));
    assert!(text.contains("0x01234"));
    assert!(!text.contains("M[0x001]"));
  }
}
