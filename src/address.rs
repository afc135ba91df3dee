//! A validated index into memory, with some convenience functions.

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use crate::bytecode::Word;
use crate::error::SimpletronError;

/// Number of cells in memory. Operands have room for 0xFFF but only these are addresses.
pub const MEMORY_SIZE: usize = 1000;

// `AddressNumberType` is `usize`, as it is naturally an index into a memory store.
pub type AddressNumberType = usize;

/// An index into memory that is known to be in range. The only way to make one is through
/// a range check, so holding an `Address` is proof the access is in bounds.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct Address(u16);

impl Address {
  /// Converts an index into an address, or `None` if it is past the end of memory.
  pub fn new(idx: AddressNumberType) -> Option<Address> {
    match idx < MEMORY_SIZE {
      true  => Some(Address(idx as u16)),
      false => None
    }
  }

  /// Converts the address to an index into memory.
  pub fn idx(&self) -> AddressNumberType {
    self.0 as AddressNumberType
  }
}

impl TryFrom<Word> for Address {
  type Error = SimpletronError;

  fn try_from(value: Word) -> Result<Self, Self::Error> {
    match value {
      v if v >= 0 => Address::new(v as AddressNumberType)
                      .ok_or(SimpletronError::AddressOutOfRange(v as i64)),
      v           => Err(SimpletronError::AddressOutOfRange(v as i64))
    }
  }
}

impl TryFrom<AddressNumberType> for Address {
  type Error = SimpletronError;

  fn try_from(value: AddressNumberType) -> Result<Self, Self::Error> {
    Address::new(value).ok_or(SimpletronError::AddressOutOfRange(value as i64))
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "0x{:03X}", self.0)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn range_checked(){
    assert_eq!(Address::new(0).map(|a| a.idx()), Some(0));
    assert_eq!(Address::new(999).map(|a| a.idx()), Some(999));
    assert_eq!(Address::new(1000), None);
  }

  #[test]
  fn from_word(){
    assert_eq!(Address::try_from(0x3E7 as Word).unwrap().idx(), 999);
    assert!(matches!(
      Address::try_from(0x3E8 as Word),
      Err(SimpletronError::AddressOutOfRange(0x3E8))
    ));
    assert!(matches!(
      Address::try_from(-1 as Word),
      Err(SimpletronError::AddressOutOfRange(-1))
    ));
  }

  #[test]
  fn display(){
    assert_eq!(Address::new(0x2A).unwrap().to_string(), "0x02A");
    assert_eq!(Address::default().to_string(), "0x000");
  }
}
