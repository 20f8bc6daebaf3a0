use std::fmt::{self, Debug, Formatter};
use crate::bnf::SymbolId;

type BitBlock = u64;

const BLOCK_NBITS: usize = std::mem::size_of::<BitBlock>() * 8;

/// A fixed-capacity set of symbol ids.
#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) struct TokenSet {
  slice: Box<[BitBlock]>,
}

impl TokenSet {
  pub fn new(num_symbols: usize) -> Self {
    let len = (num_symbols + BLOCK_NBITS - 1) / BLOCK_NBITS;
    Self {
      slice: vec![0; len].into_boxed_slice(),
    }
  }

  pub fn clear(&mut self) {
    for x in self.slice.iter_mut() {
      *x = 0;
    }
  }

  pub fn insert(&mut self, sym: SymbolId) {
    let bit = sym.0 as usize;
    self.slice[bit / BLOCK_NBITS] |= 1 << (bit % BLOCK_NBITS);
  }

  #[cfg(test)]
  pub fn contains(&self, sym: SymbolId) -> bool {
    let bit = sym.0 as usize;
    self.slice.get(bit / BLOCK_NBITS)
      .map_or(false, |block| block & (1 << (bit % BLOCK_NBITS)) != 0)
  }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool {
    self.slice.iter().all(|&block| block == 0)
  }

  /// Returns whether the set has changed.
  pub fn union_with(&mut self, other: &TokenSet) -> bool {
    let mut changed = false;
    for (x, &y) in self.slice.iter_mut().zip(other.slice.iter()) {
      let old = *x;
      *x |= y;
      changed |= old != *x;
    }
    changed
  }

  pub fn iter(&self) -> Iter {
    Iter {
      slice: &*self.slice,
      bit: 0,
      index: 0,
    }
  }
}

pub(crate) struct Iter<'a> {
  slice: &'a [BitBlock],
  bit: usize,
  index: usize,
}

impl<'a> Iterator for Iter<'a> {
  type Item = SymbolId;

  fn next(&mut self) -> Option<SymbolId> {
    while self.index < self.slice.len() {
      if self.bit < BLOCK_NBITS {
        let mask: BitBlock = !((1 << self.bit) - 1);
        let bit = (self.slice[self.index] & mask).trailing_zeros() as usize;
        if bit < BLOCK_NBITS {
          self.bit = bit + 1;
          return Some(SymbolId((self.index * BLOCK_NBITS + bit) as u32));
        }
      }

      self.index += 1;
      self.bit = 0;
    }
    None
  }
}

impl Debug for TokenSet {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.debug_set().entries(self.iter().map(|sym| sym.0)).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::TokenSet;
  use crate::bnf::SymbolId;
  use pretty_assertions::assert_eq;

  #[test]
  fn insert() {
    let mut set = TokenSet::new(70);

    set.insert(SymbolId(7));
    set.insert(SymbolId(3));
    set.insert(SymbolId(7));
    set.insert(SymbolId(69));

    let vec = set.iter().map(|sym| sym.0).collect::<Vec<_>>();

    assert_eq!(vec, vec![3, 7, 69]);
    assert!(set.contains(SymbolId(69)));
    assert!(!set.contains(SymbolId(4)));
  }

  #[test]
  fn union_reports_change() {
    let mut a = TokenSet::new(10);
    let mut b = TokenSet::new(10);
    b.insert(SymbolId(2));

    assert!(a.is_empty());
    assert!(a.union_with(&b));
    assert!(!a.union_with(&b));
    assert!(!a.is_empty());

    a.clear();
    assert!(a.is_empty());
  }
}
