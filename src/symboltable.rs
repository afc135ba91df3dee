use std::collections::HashMap;

use bimap::BiMap;
use string_cache::DefaultAtom;

use crate::address::Address;

/**
  A symbol table is a mapping between label names and the address of the word the label is
  attached to. The first label given to an address is its name, kept in a BiMap so that a
  listing can go from an address back to its label as cheaply as the assembler goes the other
  way. Any further labels on the same word are aliases: they resolve like any other label but
  are not shown in listings. Label names are interned.
*/
#[derive(Clone, Debug, Default)]
pub struct SymbolTable{
  table   : BiMap<DefaultAtom, Address>,
  aliases : HashMap<DefaultAtom, Address>
}

impl SymbolTable{

  pub fn new() -> SymbolTable {
    SymbolTable{
      table   : BiMap::new(),
      aliases : HashMap::new()
    }
  }

  /// The name of the word at `address`, which is the first label given to it.
  pub fn get_symbol(&self, address: &Address) -> Option<&DefaultAtom>{
    self.table.get_by_right(address)
  }

  pub fn get_address(&self, label: &str) -> Option<Address>{
    let atom = DefaultAtom::from(label);
    self.table
        .get_by_left(&atom)
        .or_else(|| self.aliases.get(&atom))
        .cloned()
  }

  /// Refuses to redefine a label. Returns the address the label already names.
  pub fn insert(&mut self, label: &str, address: Address) -> Result<(), Address>{
    if let Some(existing) = self.get_address(label) {
      return Err(existing);
    }

    let atom = DefaultAtom::from(label);
    if self.table.contains_right(&address) {
      self.aliases.insert(atom, address);
      Ok(())
    } else {
      self.table.insert_no_overwrite(atom, address).map_err(|(_, address)| address)
    }
  }

  /// The number of labels, aliases included.
  pub fn len(&self) -> usize {
    self.table.len() + self.aliases.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lookup_both_ways(){
    let mut table = SymbolTable::new();
    let address = Address::new(4).unwrap();
    table.insert("loop", address).unwrap();

    assert_eq!(table.get_address("loop"), Some(address));
    assert_eq!(table.get_symbol(&address).map(|atom| &**atom), Some("loop"));
    assert_eq!(table.get_address("done"), None);
  }

  #[test]
  fn no_overwrite(){
    let mut table = SymbolTable::new();
    table.insert("loop", Address::new(4).unwrap()).unwrap();
    assert_eq!(table.insert("loop", Address::new(5).unwrap()), Err(Address::new(4).unwrap()));
    assert_eq!(table.len(), 1);
  }

  #[test]
  fn second_label_is_an_alias(){
    let mut table = SymbolTable::new();
    let address = Address::new(2).unwrap();
    table.insert("first", address).unwrap();
    table.insert("second", address).unwrap();

    assert_eq!(table.get_address("first"), Some(address));
    assert_eq!(table.get_address("second"), Some(address));
    assert_eq!(table.get_symbol(&address).map(|atom| &**atom), Some("first"));
    assert_eq!(table.len(), 2);
    // An alias cannot be redefined either.
    assert!(table.insert("second", Address::new(3).unwrap()).is_err());
  }
}
