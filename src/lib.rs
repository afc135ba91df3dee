/*!
  Simpletron: a word-addressed accumulator machine.

  The machine has a thousand words of memory and five registers (`machine`). The execution
  engine (`engine`) runs the fetch-decode-execute cycle over them until a program halts,
  terminates, runs off the end of memory, or fails. Instruction words and their mnemonic form
  live in `bytecode`. Everything that touches the outside world goes through the narrow
  collaborator traits in `io`, which is how programs are entered (`loader`) and how the state
  of the machine is reported (`dump`).
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod bytecode;
pub mod dump;
pub mod engine;
pub mod error;
pub mod io;
pub mod loader;
pub mod machine;
pub mod symboltable;

pub use address::{Address, MEMORY_SIZE};
pub use bytecode::{Instruction, Operation, Program, Word};
pub use engine::{Engine, EngineConfig, HaltPolicy, Outcome};
pub use error::{AssemblyError, Result, SimpletronError};
pub use machine::{Machine, Memory, Registers};
