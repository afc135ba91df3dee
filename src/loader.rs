//! Interactive program entry: one word per prompted address until the sentinel.

use std::convert::TryFrom;
use std::io;

use tracing::{debug, warn};

use crate::address::{Address, MEMORY_SIZE};
use crate::bytecode::{in_range, Word, SENTINEL_VALUE};
use crate::error::{Result, SimpletronError};
use crate::io::{InputSource, OutputSink};
use crate::machine::Machine;

/// Prints the instructions for entering a program.
pub fn greet<O: OutputSink + ?Sized>(output: &mut O) -> io::Result<()> {
  output.emit(&format!(
    "*** Welcome to Simpletron! ***\n\
     *** Please enter your program one instruction ***\n\
     *** (or data word) at a time. I will type the ***\n\
     *** location number and a question mark (?).  ***\n\
     *** You then type the word for that location. ***\n\
     *** Type the sentinel {:05X} to stop entering ***\n\
     *** your program. ***\n",
    SENTINEL_VALUE
  ))
}

/**
  Prompts with `address` until the input supplies a word in the valid range. Words outside the
  range and text that is not a word are rejected and the prompt repeats. Returns `None` if the
  input runs out first.
*/
pub fn prompt_for_word<I, O>(address: Address, input: &mut I, output: &mut O) -> Result<Option<Word>>
  where I: InputSource + ?Sized,
        O: OutputSink + ?Sized
{
  loop {
    output.emit(&format!("{} ? ", address))?;
    match input.next_word() {
      Ok(Some(word)) if in_range(word as i64) => return Ok(Some(word)),
      Ok(Some(word)) => warn!(address = %address, word, "rejecting out of range word"),
      Ok(None)       => return Ok(None),
      Err(SimpletronError::MalformedInput(token)) => {
        warn!(address = %address, token = %token, "rejecting input that is not a word")
      }
      Err(e)         => return Err(e)
    }
  }
}

/**
  Loads a program into memory from address zero, one prompted word at a time. Loading stops
  after the sentinel, which is itself stored, or when the input is exhausted or memory is full.

  Returns the number of words loaded, not counting the sentinel.
*/
pub fn load<I, O>(machine: &mut Machine, input: &mut I, output: &mut O) -> Result<usize>
  where I: InputSource + ?Sized,
        O: OutputSink + ?Sized
{
  let mut counter = 0usize;
  while counter < MEMORY_SIZE {
    let address = Address::try_from(counter)?;
    let word =
      match prompt_for_word(address, input, output)? {
        Some(word) => word,
        None       => break
      };

    machine.write(address, word);

    if word == SENTINEL_VALUE {
      break;
    }
    counter += 1;
  }

  output.emit("\n")?;
  debug!(words = counter, "program loaded");
  Ok(counter)
}
