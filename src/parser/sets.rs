use crate::bnf::*;
use super::token_set::TokenSet;

/// FIRST sets and nullability of every non-terminal, computed once for the
/// whole grammar.
#[derive(Debug, Clone)]
pub(crate) struct FirstSets {
  nullable: Vec<bool>,
  first: Vec<TokenSet>,
}

impl FirstSets {
  pub(crate) fn new(bnf: &Bnf) -> Self {
    let nullable = gen_nullable(bnf);
    let first = gen_first(bnf, &nullable);
    FirstSets {
      nullable,
      first,
    }
  }

  /// Adds FIRST(`symbols` followed by `lookahead`) to `result`.
  pub(crate) fn first_of(
    &self,
    bnf: &Bnf,
    result: &mut TokenSet,
    symbols: &[SymbolId],
    lookahead: SymbolId,
  ) {
    if compute_first_for_symbols(result, bnf, &self.first, &self.nullable, symbols) {
      result.insert(lookahead);
    }
  }

  #[cfg(test)]
  pub(crate) fn is_nullable(&self, sym: SymbolId) -> bool {
    self.nullable[sym.0 as usize]
  }
}

fn gen_nullable(
  bnf: &Bnf,
) -> Vec<bool> {
  let mut nullable = vec![false; bnf.len()];

  loop {
    let mut changed = false;
    for prod in &bnf.prods {
      let nt_ix = prod.nonterm.0 as usize;
      if !nullable[nt_ix]
        && prod.symbols.iter().all(|&sym| nullable[sym.0 as usize])
      {
        nullable[nt_ix] = true;
        changed = true;
      }
    }
    if !changed {
      break;
    }
  }

  nullable
}

fn gen_first(
  bnf: &Bnf,
  nullable: &[bool],
) -> Vec<TokenSet> {
  let mut buf = TokenSet::new(bnf.len());
  let mut first = vec![buf.clone(); bnf.len()];

  loop {
    let mut changed = false;
    for prod in &bnf.prods {
      buf.clear();
      compute_first_for_symbols(&mut buf, bnf, &first, nullable, &prod.symbols);
      changed |= first[prod.nonterm.0 as usize].union_with(&buf);
    }
    if !changed {
      break;
    }
  }

  first
}

/// Returns whether every symbol of `symbols` is nullable, i.e. whatever
/// follows the sequence also belongs to its FIRST set.
fn compute_first_for_symbols(
  result: &mut TokenSet,
  bnf: &Bnf,
  first: &[TokenSet],
  nullable: &[bool],
  symbols: &[SymbolId],
) -> bool {
  for &sym in symbols {
    match bnf.kind(sym) {
      SymbolKind::Term | SymbolKind::End => {
        result.insert(sym);
        return false;
      }
      SymbolKind::Nonterm => {
        result.union_with(&first[sym.0 as usize]);
        if !nullable[sym.0 as usize] {
          return false;
        }
      }
    }
  }

  true
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn simple() -> Bnf {
    Bnf::parse(r#"
      Z -> d
      Z -> X Y Z
      Y ->
      Y -> c
      X -> Y
      X -> a
    "#)
  }

  fn first_names(bnf: &Bnf, sets: &FirstSets, symbols: &[&str]) -> Vec<String> {
    let symbols = symbols.iter()
      .map(|&s| bnf.symbol(s).unwrap())
      .collect::<Vec<_>>();
    let mut result = TokenSet::new(bnf.len());
    sets.first_of(bnf, &mut result, &symbols, bnf.end);
    result.iter().map(|sym| bnf.name(sym).to_owned()).collect()
  }

  #[test]
  fn simple_nullable() {
    let bnf = simple();
    let sets = FirstSets::new(&bnf);
    let nullable = ["Z", "Y", "X"].iter()
      .map(|&s| sets.is_nullable(bnf.symbol(s).unwrap()))
      .collect::<Vec<_>>();
    assert_eq!(nullable, vec![false, true, true]);
  }

  #[test]
  fn simple_first() {
    let bnf = simple();
    let sets = FirstSets::new(&bnf);
    assert_eq!(first_names(&bnf, &sets, &["Z"]), vec!["d", "c", "a"]);
    assert_eq!(first_names(&bnf, &sets, &["Y"]), vec!["c", "$"]);
    assert_eq!(first_names(&bnf, &sets, &["X", "Y"]), vec!["c", "a", "$"]);
  }

  #[test]
  fn first_of_nullable_left_recursion() {
    let bnf = Bnf::parse(r#"
      S ->
      S -> S a S b
    "#);
    let sets = FirstSets::new(&bnf);
    assert_eq!(first_names(&bnf, &sets, &["S", "a", "S"]), vec!["a"]);
    assert_eq!(first_names(&bnf, &sets, &["a", "S", "b", "b"]), vec!["a"]);
    assert_eq!(first_names(&bnf, &sets, &["S"]), vec!["a", "$"]);
    assert_eq!(first_names(&bnf, &sets, &[]), vec!["$"]);
    assert_eq!(first_names(&bnf, &sets, &["$", "a"]), vec!["$"]);
  }

  #[test]
  fn lookahead_only_follows_nullable_sequences() {
    let bnf = Bnf::parse("S -> a");
    let sets = FirstSets::new(&bnf);
    let a = bnf.symbol("a").unwrap();
    let s = bnf.symbol("S").unwrap();

    let mut result = TokenSet::new(bnf.len());
    sets.first_of(&bnf, &mut result, &[], a);
    assert_eq!(result.iter().collect::<Vec<_>>(), vec![a]);

    result.clear();
    sets.first_of(&bnf, &mut result, &[s], bnf.end);
    assert!(!result.contains(bnf.end));
    assert_eq!(first_names(&bnf, &sets, &["S"]), vec!["a"]);
  }

  #[test]
  fn mutual_left_recursion_terminates() {
    let bnf = Bnf::parse(r#"
      A -> B x | y
      B -> A z | w
    "#);
    let sets = FirstSets::new(&bnf);
    assert_eq!(first_names(&bnf, &sets, &["A"]), vec!["y", "w"]);
    assert_eq!(first_names(&bnf, &sets, &["B"]), vec!["y", "w"]);
  }
}
