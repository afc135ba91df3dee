/*!
  The human readable textual form of a program is called assembly. This module leverages the
  `strum` derives of `Operation` to turn mnemonics into opcodes, and `nom` to parse lines.

  The language is given by the following EBNF, one `<line>` per line of text:
      ```
      <line>       ::= <label_def>? <statement>? <comment>?
      <label_def>  ::= <identifier> ':'
      <statement>  ::= <mnemonic> <operand>?
      <operand>    ::= <number> | <identifier>
      <number>     ::= '0x' <hex_digit>+ | <digit> <hex_digit>*
      <identifier> ::= [A-Za-z_] [A-Za-z0-9_]*
      <comment>    ::= (';' | '#') .*
      ```

  Every statement occupies exactly one word, starting at address zero. A label names the address
  of the statement on its line, or of the next statement if its line has none. Mnemonics are the
  operation names (case-insensitive) plus the `DATA` directive, which emits its operand as a
  literal word. All numbers are hexadecimal.

  Assembly is done in two passes: the first assigns addresses to labels, the second encodes
  statements, so labels may be used before they are defined.
*/

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nom::{
  branch::alt,
  bytes::complete::{is_not, tag, tag_no_case},
  character::complete::{
    alpha1,
    alphanumeric1,
    char as one_char,
    hex_digit0,
    hex_digit1,
    satisfy,
    space0,
    space1
  },
  combinator::{all_consuming, map, map_res, opt, recognize},
  multi::many0_count,
  sequence::{pair, preceded, terminated, tuple},
  IResult
};

use crate::address::{Address, MEMORY_SIZE};
use crate::bytecode::{decode_instruction, encode_instruction, in_range, Instruction, Operation, Word};
use crate::error::AssemblyError;
use crate::symboltable::SymbolTable;

/// The directive that emits a literal word instead of an instruction.
pub const DATA_DIRECTIVE: &str = "DATA";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Operand<'a> {
  Number(i64),
  Label(&'a str)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Statement<'a> {
  mnemonic : &'a str,
  operand  : Option<Operand<'a>>
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Line<'a> {
  label     : Option<&'a str>,
  statement : Option<Statement<'a>>
}

/// An assembled program: the words to load starting at address zero, and its labels.
#[derive(Clone, Debug, Default)]
pub struct Program {
  pub words   : Vec<Word>,
  pub symbols : SymbolTable
}

// region Parsing

/// <identifier> ::= [A-Za-z_] [A-Za-z0-9_]*
fn pidentifier(text: &str) -> IResult<&str, &str>{
  recognize(
    pair(
      alt((alpha1, tag("_"))),
      many0_count(alt((alphanumeric1, tag("_"))))
    )
  )(text)
}

/// <number> ::= '0x' <hex_digit>+ | <digit> <hex_digit>*
fn pnumber(text: &str) -> IResult<&str, i64>{
  alt((
    map_res(
      preceded(tag_no_case("0x"), hex_digit1),
      |digits: &str| i64::from_str_radix(digits, 16)
    ),
    map_res(
      recognize(pair(satisfy(|c| c.is_ascii_digit()), hex_digit0)),
      |digits: &str| i64::from_str_radix(digits, 16)
    )
  ))(text)
}

/// <operand> ::= <number> | <identifier>
fn poperand(text: &str) -> IResult<&str, Operand>{
  alt((
    map(pnumber, Operand::Number),
    map(pidentifier, Operand::Label)
  ))(text)
}

/// <statement> ::= <mnemonic> <operand>?
fn pstatement(text: &str) -> IResult<&str, Statement>{
  map(
    pair(pidentifier, opt(preceded(space1, poperand))),
    |(mnemonic, operand)| Statement{ mnemonic, operand }
  )(text)
}

/// <label_def> ::= <identifier> ':'
fn plabel(text: &str) -> IResult<&str, &str>{
  terminated(pidentifier, preceded(space0, one_char(':')))(text)
}

/// <comment> ::= (';' | '#') .*
fn pcomment(text: &str) -> IResult<&str, ()>{
  map(
    pair(alt((one_char(';'), one_char('#'))), opt(is_not("\r\n"))),
    |_| () // Output is thrown away.
  )(text)
}

/// <line> ::= <label_def>? <statement>? <comment>?
fn pline(text: &str) -> IResult<&str, Line>{
  map(
    all_consuming(
      tuple((
        preceded(space0, opt(plabel)),
        preceded(space0, opt(pstatement)),
        preceded(space0, opt(pcomment)),
        space0
      ))
    ),
    |(label, statement, _, _)| Line{ label, statement }
  )(text)
}

/// Parses every line of `text`, pairing each with its line number.
fn parse_lines(text: &str) -> Result<Vec<(usize, Line)>, AssemblyError> {
  text.lines()
      .enumerate()
      .map(|(i, source)| {
        match pline(source) {
          Ok((_, line)) => Ok((i + 1, line)),
          Err(_)        => Err(AssemblyError::Syntax{ line: i + 1, text: source.trim().to_string() })
        }
      })
      .collect()
}

// endregion

// region Encoding

fn resolve_address(operand: Operand, line: usize, symbols: &SymbolTable)
  -> Result<Address, AssemblyError>
{
  match operand {

    Operand::Number(value) => {
      usize::try_from(value).ok()
                            .and_then(Address::new)
                            .ok_or(AssemblyError::ValueOutOfRange{ line, value })
    }

    Operand::Label(label) => {
      symbols.get_address(label)
             .ok_or_else(|| AssemblyError::UndefinedLabel{ line, label: label.to_string() })
    }

  }
}

fn encode_statement(statement: &Statement, line: usize, symbols: &SymbolTable)
  -> Result<Word, AssemblyError>
{
  if statement.mnemonic.eq_ignore_ascii_case(DATA_DIRECTIVE) {
    return match statement.operand {
      Some(Operand::Number(value)) if in_range(value) => Ok(value as Word),
      Some(Operand::Number(value))                    => Err(AssemblyError::ValueOutOfRange{ line, value }),
      // A label as data is the label's address, for use as a pointer.
      Some(label @ Operand::Label(_))                 => {
        resolve_address(label, line, symbols).map(|address| address.idx() as Word)
      }
      None => Err(AssemblyError::MissingOperand{ line, operation: DATA_DIRECTIVE.to_string() })
    };
  }

  let operation =
    Operation::from_str(statement.mnemonic)
      .map_err(|_| AssemblyError::NotAnOperation{ line, name: statement.mnemonic.to_string() })?;

  let address =
    match (operation.takes_operand(), statement.operand) {
      (true,  Some(operand)) => resolve_address(operand, line, symbols)?,
      (true,  None)          => {
        return Err(AssemblyError::MissingOperand{ line, operation: operation.to_string() });
      }
      (false, Some(_))       => {
        return Err(AssemblyError::UnexpectedOperand{ line, operation: operation.to_string() });
      }
      (false, None)          => Address::default()
    };

  Ok(encode_instruction(Instruction::new(operation, address)))
}

// endregion

/// Assembles `text` into a program. Stops at the first error.
pub fn assemble(text: &str) -> Result<Program, AssemblyError> {
  let lines = parse_lines(text)?;

  // First pass: give every label the address of the next statement.
  let mut symbols  = SymbolTable::new();
  let mut location = 0usize;
  for (line, parsed) in &lines {
    if let Some(label) = parsed.label {
      let address = Address::new(location).ok_or(AssemblyError::ProgramTooLarge{ line: *line })?;
      if symbols.insert(label, address).is_err() {
        return Err(AssemblyError::DuplicateLabel{ line: *line, label: label.to_string() });
      }
    }
    if parsed.statement.is_some() {
      location += 1;
    }
  }

  // Second pass: encode.
  let mut words: Vec<Word> = Vec::with_capacity(location);
  for (line, parsed) in &lines {
    if let Some(statement) = &parsed.statement {
      if words.len() == MEMORY_SIZE {
        return Err(AssemblyError::ProgramTooLarge{ line: *line });
      }
      words.push(encode_statement(statement, *line, &symbols)?);
    }
  }

  Ok(Program{ words, symbols })
}

impl Display for Program {
  /// A listing with one word per line: label, address, word, and disassembly when it decodes.
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    for (i, word) in self.words.iter().enumerate() {
      let address = match Address::new(i) {
        Some(address) => address,
        None          => break
      };
      let label =
        match self.symbols.get_symbol(&address) {
          Some(atom) => format!("{}:", atom),
          None       => String::new()
        };
      let text: Option<Instruction> = decode_instruction(*word, i).ok();
      match text {
        Some(instruction) => writeln!(f, "{:<12}{} : {:05X}    {}", label, address, word, instruction)?,
        None              => writeln!(f, "{:<12}{} : {:05X}", label, address, word)?
      }
    }
    Ok(())
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  const COUNTDOWN: &str = "
    ; Prints n, n-1, ..., 1.
    start:  LOAD  n
    loop:   BRANCHZERO done
            WRITE n
            SUBTRACT one
            STORE n
            BRANCH loop
    done:   HALT
    n:      DATA  3
    one:    DATA  0x1   # trailing comment
  ";

  #[test]
  fn parse_line_forms(){
    assert_eq!(
      pline("loop: BRANCHZERO done ; go").unwrap().1,
      Line{
        label: Some("loop"),
        statement: Some(Statement{ mnemonic: "BRANCHZERO", operand: Some(Operand::Label("done")) })
      }
    );
    assert_eq!(
      pline("  halt").unwrap().1,
      Line{ label: None, statement: Some(Statement{ mnemonic: "halt", operand: None }) }
    );
    assert_eq!(pline("").unwrap().1, Line{ label: None, statement: None });
    assert_eq!(pline("tail:").unwrap().1, Line{ label: Some("tail"), statement: None });
    assert!(pline("LOAD 5 6").is_err());
  }

  #[test]
  fn numbers_are_hex(){
    assert_eq!(pnumber("0x1F"), Ok(("", 0x1F)));
    assert_eq!(pnumber("20"), Ok(("", 0x20)));
    assert_eq!(pnumber("3e7"), Ok(("", 0x3E7)));
    assert!(pnumber("abc").is_err());
  }

  #[test]
  fn assemble_with_forward_labels(){
    let program = assemble(COUNTDOWN).unwrap();
    assert_eq!(
      program.words,
      vec![0x20007, 0x42006, 0x11007, 0x31008, 0x21007, 0x40001, 0x43000, 0x3, 0x1]
    );
    assert_eq!(program.symbols.get_address("done"), Address::new(6));
    assert_eq!(program.symbols.len(), 5);
  }

  #[test]
  fn numeric_operands_and_data_pointers(){
    let program = assemble("LOAD 5\nADD 0x6\nSTORE 7\nHALT\nptr: DATA ptr\n").unwrap();
    assert_eq!(program.words, vec![0x20005, 0x30006, 0x21007, 0x43000, 0x4]);
  }

  #[test]
  fn labels_may_share_a_word(){
    let program = assemble("top:\nagain: LOAD n\nBRANCH again\nBRANCH top\nn: DATA 1").unwrap();
    assert_eq!(program.words, vec![0x20003, 0x40000, 0x40000, 0x1]);
    assert_eq!(program.symbols.get_address("again"), Address::new(0));
    assert!(program.to_string().starts_with("top:        0x000 : 20003    LOAD 0x003\n"));
  }

  #[test]
  fn letter_led_operands_are_labels(){
    assert_eq!(
      assemble("DATA A").unwrap_err(),
      AssemblyError::UndefinedLabel{ line: 1, label: "A".to_string() }
    );
    assert_eq!(assemble("DATA 0xA\nDATA 0A").unwrap().words, vec![0xA, 0xA]);
  }

  #[test]
  fn trailing_label_names_free_cell(){
    let program = assemble("STORE scratch\nTERMINATE\nscratch:").unwrap();
    assert_eq!(program.words, vec![0x21002, 0xFF000]);
  }

  #[test]
  fn errors(){
    assert_eq!(
      assemble("LOAD 5\nJUMP 3").unwrap_err(),
      AssemblyError::NotAnOperation{ line: 2, name: "JUMP".to_string() }
    );
    assert_eq!(
      assemble("LOAD").unwrap_err(),
      AssemblyError::MissingOperand{ line: 1, operation: "LOAD".to_string() }
    );
    assert_eq!(
      assemble("HALT 3").unwrap_err(),
      AssemblyError::UnexpectedOperand{ line: 1, operation: "HALT".to_string() }
    );
    assert_eq!(
      assemble("BRANCH nowhere").unwrap_err(),
      AssemblyError::UndefinedLabel{ line: 1, label: "nowhere".to_string() }
    );
    assert_eq!(
      assemble("a: HALT\na: HALT").unwrap_err(),
      AssemblyError::DuplicateLabel{ line: 2, label: "a".to_string() }
    );
    assert_eq!(
      assemble("LOAD 3E8").unwrap_err(),
      AssemblyError::ValueOutOfRange{ line: 1, value: 0x3E8 }
    );
    assert_eq!(
      assemble("DATA 100000").unwrap_err(),
      AssemblyError::ValueOutOfRange{ line: 1, value: 0x100000 }
    );
    assert!(matches!(assemble("LOAD 5 ,"), Err(AssemblyError::Syntax{ line: 1, .. })));
  }

  #[test]
  fn too_large(){
    let text = "HALT\n".repeat(MEMORY_SIZE + 1);
    assert_eq!(
      assemble(&text).unwrap_err(),
      AssemblyError::ProgramTooLarge{ line: MEMORY_SIZE + 1 }
    );
  }

  #[test]
  fn listing(){
    let program = assemble("start: LOAD n\nHALT\nn: DATA 3").unwrap();
    let listing = program.to_string();
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines[0], "start:      0x000 : 20002    LOAD 0x002");
    assert_eq!(lines[1], "            0x001 : 43000    HALT");
    assert_eq!(lines[2], "n:          0x002 : 00003");
  }
}
