use std::iter;
use crate::bnf::SymbolId;
use super::state::StateId;
use super::table::{Action, ActionTable};

/// Stack entries alternate between symbols and states; a state is always on
/// top.
#[derive(Clone, Copy, Debug)]
enum StackEntry {
  Symbol(SymbolId),
  State(StateId),
}

impl ActionTable {
  /// Runs the shift-reduce recognizer over `input`, a sequence of terminal
  /// names. Returns whether the input is a sentence of the grammar.
  pub fn parse<S: AsRef<str>>(&self, input: &[S]) -> bool {
    let mut symbols = Vec::with_capacity(input.len());
    for name in input {
      match self.bnf.symbol(name.as_ref()) {
        Some(sym) if self.bnf.is_term(sym) => symbols.push(sym),
        _ => {
          log::debug!("reject: `{}` is not a terminal", name.as_ref());
          return false;
        }
      }
    }
    run(self, &symbols)
  }

  /// Like [`parse`](Self::parse), taking each `char` of `word` as one symbol.
  pub fn parse_word(&self, word: &str) -> bool {
    let input = word.chars().map(String::from).collect::<Vec<_>>();
    self.parse(&input)
  }
}

fn run(table: &ActionTable, input: &[SymbolId]) -> bool {
  let bnf = &*table.bnf;
  let mut stack = vec![StackEntry::State(table.start)];
  let mut input = input.iter().copied().chain(iter::once(bnf.end)).peekable();

  loop {
    let state = match stack.last() {
      Some(&StackEntry::State(state)) => state,
      _ => return false,
    };
    let lookahead = match input.peek() {
      Some(&sym) => sym,
      None => return false,
    };

    match table.lookup(state, lookahead) {
      None => {
        log::debug!("reject: no action in {} on `{}`", state, bnf.name(lookahead));
        return false;
      }
      Some(Action::Accept) => {
        log::trace!("accept");
        return true;
      }
      Some(Action::Shift(target)) => {
        log::trace!("shift `{}`, goto {}", bnf.name(lookahead), target);
        stack.push(StackEntry::Symbol(lookahead));
        stack.push(StackEntry::State(target));
        input.next();
      }
      Some(Action::Reduce(prod_id)) => {
        log::trace!("reduce {}", bnf.display_prod(prod_id));
        let prod = bnf.prod(prod_id);
        let keep = match stack.len().checked_sub(2 * prod.symbols.len()) {
          Some(keep) if keep > 0 => keep,
          _ => return false,
        };
        let popped = stack[keep..].iter()
          .filter_map(|entry| match *entry {
            StackEntry::Symbol(sym) => Some(sym),
            StackEntry::State(_) => None,
          });
        if !popped.eq(prod.symbols.iter().copied()) {
          log::debug!("reject: stack does not end with {}", bnf.display_prod(prod_id));
          return false;
        }
        stack.truncate(keep);

        let exposed = match stack.last() {
          Some(&StackEntry::State(state)) => state,
          _ => return false,
        };
        match table.lookup(exposed, prod.nonterm) {
          Some(Action::Shift(target)) => {
            stack.push(StackEntry::Symbol(prod.nonterm));
            stack.push(StackEntry::State(target));
          }
          _ => {
            log::debug!("reject: no goto from {} on `{}`",
              exposed, bnf.name(prod.nonterm));
            return false;
          }
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;
  use std::collections::BTreeMap;
  use crate::bnf::Bnf;
  use crate::config::ConflictPolicy;
  use crate::parser::state::gen_states;
  use crate::parser::table::gen_table;

  fn table(text: &str, start: &str) -> ActionTable {
    let (bnf, augmented) = Bnf::parse(text).augment("S'", start).unwrap();
    let automaton = gen_states(Arc::new(bnf), augmented);
    gen_table(&automaton, ConflictPolicy::Fail).unwrap()
  }

  fn dyck() -> ActionTable {
    table(r#"
      S ->
      S -> a S b S
    "#, "S")
  }

  #[test]
  fn balanced_words() {
    let _ = env_logger::builder().is_test(true).try_init();
    let table = dyck();
    assert!(table.parse_word("abab"));
    assert!(table.parse_word("aabb"));
    assert!(!table.parse_word("bbb"));
    assert!(table.parse_word("aaaabbbabb"));
    assert!(!table.parse_word("aaaaabbbbbabaabbabaabbb"));
  }

  #[test]
  fn empty_input_needs_nullable_start() {
    assert!(dyck().parse_word(""));

    let table = table(r#"
      S -> a S b
      S -> a b
    "#, "S");
    assert!(!table.parse_word(""));
    assert!(table.parse_word("aabb"));
  }

  #[test]
  fn foreign_symbols_are_rejected() {
    let table = dyck();
    assert!(!table.parse(&["a", "$"]));
    assert!(!table.parse(&["S"]));
    assert!(!table.parse(&["a", "c", "b"]));
    assert!(table.parse(&["a", "b"]));
  }

  #[test]
  fn missing_goto_rejects() {
    let mut table = dyck();
    let s = table.bnf.symbol("S").unwrap();
    // Drop every goto on `S`, so the first reduce has nowhere to go.
    for row in &mut table.rows {
      row.remove(&s);
    }
    assert!(!table.parse_word("ab"));
    assert!(!table.parse_word(""));
  }

  #[test]
  fn reduce_checks_the_handle() {
    let mut table = dyck();
    let a = table.bnf.symbol("a").unwrap();
    let b = table.bnf.symbol("b").unwrap();
    // Swap the symbols of `S -> a S b S`, so its reduce no longer matches
    // what was shifted.
    for prod in &mut Arc::make_mut(&mut table.bnf).prods {
      for sym in &mut prod.symbols {
        if *sym == a {
          *sym = b;
        } else if *sym == b {
          *sym = a;
        }
      }
    }
    assert!(!table.parse_word("ab"));
    assert!(table.parse_word(""));
  }

  #[test]
  fn empty_table_rejects() {
    let mut table = dyck();
    table.rows = vec![BTreeMap::new(); table.rows.len()];
    assert!(!table.parse_word("ab"));
  }
}
