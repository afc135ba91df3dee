/*!
  The machine's collaborators on the outside world. The engine and loader only see these two
  traits, so a console, a file, or an in-memory fake are all interchangeable.

  `OutputSink` is implemented for every `std::io::Write`, which makes `Vec<u8>` a capturing
  sink and `std::io::sink()` a silent one. `InputSource` is implemented for any iterator of
  words, and `HexReader` reads hexadecimal words from text.
*/

use std::convert::TryFrom;
use std::io::{self, BufRead};

use crate::bytecode::Word;
use crate::error::{Result, SimpletronError};

/// A source of words, one per request.
pub trait InputSource {
  /// Returns the next word, or `None` once the source is exhausted. Text that is not a word is
  /// consumed and reported as `SimpletronError::MalformedInput`; the source stays usable.
  fn next_word(&mut self) -> Result<Option<Word>>;
}

/// A sink for formatted text.
pub trait OutputSink {
  fn emit(&mut self, text: &str) -> io::Result<()>;
}

impl<W: io::Write + ?Sized> OutputSink for W {
  fn emit(&mut self, text: &str) -> io::Result<()> {
    self.write_all(text.as_bytes())?;
    self.flush()
  }
}

impl<I: Iterator<Item = Word>> InputSource for I {
  fn next_word(&mut self) -> Result<Option<Word>> {
    Ok(self.next())
  }
}

/**
  Reads whitespace separated hexadecimal words from a buffered reader. A word may have a sign
  and a `0x` prefix. Everything from `#` or `;` to the end of a line is a comment.

  A token that is not a hexadecimal number is returned as `MalformedInput`, so the caller can
  ask again without losing the rest of the input.
*/
pub struct HexReader<R> {
  reader  : R,
  pending : Vec<String>,
}

impl<R: BufRead> HexReader<R> {
  pub fn new(reader: R) -> HexReader<R> {
    HexReader {
      reader,
      pending: vec![],
    }
  }

  /// Refills `pending` from the next line with content. Returns `false` at end of input.
  fn fill(&mut self) -> Result<bool> {
    while self.pending.is_empty() {
      let mut line = String::new();
      if self.reader.read_line(&mut line)? == 0 {
        return Ok(false);
      }
      let content = line.split(|c: char| c == '#' || c == ';').next().unwrap_or("");
      // Reversed so that `pop` yields tokens in order.
      self.pending = content.split_whitespace().rev().map(str::to_string).collect();
    }
    Ok(true)
  }
}

impl<R: BufRead> InputSource for HexReader<R> {
  fn next_word(&mut self) -> Result<Option<Word>> {
    if !self.fill()? {
      return Ok(None);
    }
    match self.pending.pop() {
      Some(token) =>
        match parse_hex_word(&token) {
          Some(word) => Ok(Some(word)),
          None       => Err(SimpletronError::MalformedInput(token))
        },
      None => Ok(None)
    }
  }
}

/// Parses `[+-][0x]digits` as hexadecimal. `None` if malformed or too large for a `Word`.
pub fn parse_hex_word(token: &str) -> Option<Word> {
  let (negative, rest) =
    match token.as_bytes().first() {
      Some(b'-') => (true,  &token[1..]),
      Some(b'+') => (false, &token[1..]),
      _          => (false, token)
    };
  let digits =
    rest.strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
        .unwrap_or(rest);
  if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
    return None;
  }
  let magnitude = i64::from_str_radix(digits, 16).ok()?;
  let value     = if negative { -magnitude } else { magnitude };
  Word::try_from(value).ok()
}
