use std::fmt::{self, Display, Formatter};
use indexmap::IndexMap;
use crate::error::{Error, Result};
use crate::grammar::{Grammar, Rule};

/// A validated grammar with interned symbols.
///
/// Symbol ids follow the alphabet order, then the end marker, then the
/// synthetic augmented start symbol, if any.
#[derive(Debug, Clone)]
pub(crate) struct Bnf {
  symbols: IndexMap<String, SymbolKind>,
  /// alphabet symbols occupy ids `0..alphabet_len`
  alphabet_len: usize,
  pub(crate) end: SymbolId,
  pub(crate) prods: Vec<Production>,
  /// symbol -> its productions, in rule order
  prods_of: Vec<Vec<ProdId>>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum SymbolKind {
  Term,
  Nonterm,
  End,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) struct SymbolId(pub(crate) u32);

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ProdId(pub(crate) u32);

#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct Production {
  pub(crate) nonterm: SymbolId,
  pub(crate) symbols: Vec<SymbolId>,
}

/// The production `augmented start -> start`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Augmented {
  pub(crate) nonterm: SymbolId,
  pub(crate) prod: ProdId,
}

impl Bnf {
  pub(crate) fn new(grammar: &Grammar, end_marker: &str) -> Result<Bnf> {
    if grammar.alphabet.contains_key(end_marker) {
      return Err(Error::EndMarkerInAlphabet(end_marker.to_owned()));
    }

    let mut symbols = grammar.alphabet.iter()
      .map(|(name, &is_term)| {
        let kind = if is_term { SymbolKind::Term } else { SymbolKind::Nonterm };
        (name.clone(), kind)
      })
      .collect::<IndexMap<_, _>>();
    let alphabet_len = symbols.len();
    let end = SymbolId(symbols.len() as u32);
    symbols.insert(end_marker.to_owned(), SymbolKind::End);

    let mut bnf = Bnf {
      symbols,
      alphabet_len,
      end,
      prods: vec![],
      prods_of: vec![vec![]; alphabet_len + 1],
    };

    for rule in &grammar.rules {
      let nonterm = bnf.declared(&rule.lhs)?;
      if !bnf.is_nonterm(nonterm) {
        return Err(Error::TerminalOnLeft(rule.lhs.clone()));
      }
      let symbols = rule.rhs.iter()
        .map(|sym| bnf.declared(sym))
        .collect::<Result<Vec<_>>>()?;
      bnf.push_prod(Production { nonterm, symbols });
    }

    if let Some(start) = &grammar.start {
      bnf.start_symbol(start)?;
    }

    for id in bnf.alphabet() {
      if bnf.is_nonterm(id) && bnf.prods_of(id).is_empty() {
        log::debug!("non-terminal `{}` has no rules", bnf.name(id));
      }
    }

    Ok(bnf)
  }

  /// Returns a copy of the grammar extended with `augmented -> start`.
  pub(crate) fn augment(
    &self,
    augmented: &str,
    start: &str,
  ) -> Result<(Bnf, Augmented)> {
    let start_id = self.start_symbol(start)?;
    if augmented == start {
      return Err(Error::AugmentedStartInUse(augmented.to_owned()));
    }

    let mut bnf = self.clone();
    match self.symbol(augmented) {
      None => {
        let nonterm = SymbolId(bnf.symbols.len() as u32);
        bnf.symbols.insert(augmented.to_owned(), SymbolKind::Nonterm);
        bnf.prods_of.push(vec![]);
        let prod = bnf.push_prod(Production {
          nonterm,
          symbols: vec![start_id],
        });
        Ok((bnf, Augmented { nonterm, prod }))
      }
      Some(nonterm) => {
        let prods = self.prods_of(nonterm);
        let used_on_right = self.prods.iter()
          .any(|prod| prod.symbols.contains(&nonterm));
        match prods {
          [prod] if !used_on_right
            && self.prod(*prod).symbols == [start_id] =>
          {
            Ok((bnf, Augmented { nonterm, prod: *prod }))
          }
          _ => Err(Error::AugmentedStartInUse(augmented.to_owned())),
        }
      }
    }
  }

  fn push_prod(&mut self, prod: Production) -> ProdId {
    let id = ProdId(self.prods.len() as u32);
    self.prods_of[prod.nonterm.0 as usize].push(id);
    self.prods.push(prod);
    id
  }

  fn declared(&self, name: &str) -> Result<SymbolId> {
    match self.symbol(name) {
      Some(id) if id.0 < self.alphabet_len as u32 => Ok(id),
      _ => Err(Error::UndeclaredSymbol(name.to_owned())),
    }
  }

  fn start_symbol(&self, name: &str) -> Result<SymbolId> {
    let id = self.declared(name)?;
    if self.is_nonterm(id) {
      Ok(id)
    } else {
      Err(Error::StartNotNonterminal(name.to_owned()))
    }
  }

  pub(crate) fn symbol(&self, name: &str) -> Option<SymbolId> {
    self.symbols.get_index_of(name).map(|i| SymbolId(i as u32))
  }

  pub(crate) fn name(&self, id: SymbolId) -> &str {
    self.symbols.get_index(id.0 as usize)
      .map(|(name, _)| name.as_str())
      .unwrap_or("?")
  }

  pub(crate) fn kind(&self, id: SymbolId) -> SymbolKind {
    self.symbols.get_index(id.0 as usize)
      .map(|(_, &kind)| kind)
      .unwrap_or(SymbolKind::End)
  }

  pub(crate) fn is_nonterm(&self, id: SymbolId) -> bool {
    self.kind(id) == SymbolKind::Nonterm
  }

  pub(crate) fn is_term(&self, id: SymbolId) -> bool {
    self.kind(id) == SymbolKind::Term
  }

  /// Total number of symbols, including the end marker.
  pub(crate) fn len(&self) -> usize {
    self.symbols.len()
  }

  /// The user alphabet, in declaration order.
  pub(crate) fn alphabet(&self) -> impl Iterator<Item = SymbolId> {
    (0..self.alphabet_len as u32).map(SymbolId)
  }

  pub(crate) fn prod(&self, id: ProdId) -> &Production {
    &self.prods[id.0 as usize]
  }

  /// The grammar rule behind `id`, with symbol names restored.
  pub(crate) fn rule(&self, id: ProdId) -> Option<Rule> {
    let prod = self.prods.get(id.0 as usize)?;
    Some(Rule {
      lhs: self.name(prod.nonterm).to_owned(),
      rhs: prod.symbols.iter().map(|&sym| self.name(sym).to_owned()).collect(),
    })
  }

  pub(crate) fn prods_of(&self, nonterm: SymbolId) -> &[ProdId] {
    self.prods_of.get(nonterm.0 as usize)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  pub(crate) fn display_prod(&self, id: ProdId) -> DisplayProd {
    DisplayProd { bnf: self, prod: id }
  }

  #[cfg(test)]
  pub(crate) fn parse(text: &str) -> Bnf {
    let grammar = text.parse::<Grammar>().unwrap();
    Bnf::new(&grammar, "$").unwrap()
  }

  #[cfg(test)]
  pub(crate) fn find_prod(&self, lhs: &str, rhs: &[&str]) -> ProdId {
    let nonterm = self.symbol(lhs).unwrap();
    *self.prods_of(nonterm).iter()
      .find(|&&id| {
        let symbols = &self.prod(id).symbols;
        symbols.len() == rhs.len()
          && symbols.iter().zip(rhs).all(|(&s, &n)| self.name(s) == n)
      })
      .unwrap()
  }
}

pub(crate) struct DisplayProd<'a> {
  bnf: &'a Bnf,
  prod: ProdId,
}

impl<'a> Display for DisplayProd<'a> {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let prod = self.bnf.prod(self.prod);
    write!(f, "{} ->", self.bnf.name(prod.nonterm))?;
    if prod.symbols.is_empty() {
      return write!(f, " ε");
    }
    for &sym in &prod.symbols {
      write!(f, " {}", self.bnf.name(sym))?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grammar::{grammar, rule};
  use pretty_assertions::assert_eq;

  fn sample() -> Grammar {
    grammar(&["S"], &["a", "b"], "S", &[
      rule("S", &[]),
      rule("S", &["S", "a", "S", "b"]),
    ])
  }

  #[test]
  fn symbol_ids_follow_alphabet() {
    let bnf = Bnf::new(&sample(), "$").unwrap();
    let names = (0..bnf.len() as u32)
      .map(|i| bnf.name(SymbolId(i)))
      .collect::<Vec<_>>();
    assert_eq!(names, vec!["S", "a", "b", "$"]);
    assert_eq!(bnf.alphabet().count(), 3);
    assert_eq!(bnf.kind(bnf.end), SymbolKind::End);
  }

  #[test]
  fn undeclared_symbol() {
    let mut g = sample();
    g.add_rules(vec![rule("S", &["c"])]);
    assert_eq!(Bnf::new(&g, "$").unwrap_err(),
      Error::UndeclaredSymbol("c".to_owned()));
  }

  #[test]
  fn terminal_on_left() {
    let mut g = sample();
    g.add_rules(vec![rule("a", &["b"])]);
    assert_eq!(Bnf::new(&g, "$").unwrap_err(),
      Error::TerminalOnLeft("a".to_owned()));
  }

  #[test]
  fn end_marker_must_be_fresh() {
    assert_eq!(Bnf::new(&sample(), "a").unwrap_err(),
      Error::EndMarkerInAlphabet("a".to_owned()));
  }

  #[test]
  fn terminal_start() {
    let mut g = sample();
    g.set_start("a");
    assert_eq!(Bnf::new(&g, "$").unwrap_err(),
      Error::StartNotNonterminal("a".to_owned()));
  }

  #[test]
  fn end_marker_is_not_declared() {
    let mut g = sample();
    g.add_rules(vec![rule("S", &["$"])]);
    assert_eq!(Bnf::new(&g, "$").unwrap_err(),
      Error::UndeclaredSymbol("$".to_owned()));
  }

  #[test]
  fn augment_adds_synthetic_start() {
    let bnf = Bnf::new(&sample(), "$").unwrap();
    let (aug, augmented) = bnf.augment("S#", "S").unwrap();

    assert_eq!(aug.name(augmented.nonterm), "S#");
    assert_eq!(aug.display_prod(augmented.prod).to_string(), "S# -> S");
    assert_eq!(aug.alphabet().count(), 3);
    assert_eq!(aug.len(), bnf.len() + 1);
  }

  #[test]
  fn augment_reuses_declared_start_rule() {
    let mut g = sample();
    g.set_alphabet(vec![("S#", false), ("S", false), ("a", true), ("b", true)]);
    g.add_rules(vec![rule("S#", &["S"])]);
    let bnf = Bnf::new(&g, "$").unwrap();
    let (aug, augmented) = bnf.augment("S#", "S").unwrap();

    assert_eq!(aug.len(), bnf.len());
    assert_eq!(augmented.prod, bnf.find_prod("S#", &["S"]));
  }

  #[test]
  fn augment_rejects_clashing_names() {
    let bnf = Bnf::new(&sample(), "$").unwrap();
    assert_eq!(bnf.augment("S", "S").unwrap_err(),
      Error::AugmentedStartInUse("S".to_owned()));
    assert_eq!(bnf.augment("a", "S").unwrap_err(),
      Error::AugmentedStartInUse("a".to_owned()));
    assert_eq!(bnf.augment("S#", "b").unwrap_err(),
      Error::StartNotNonterminal("b".to_owned()));
  }
}
