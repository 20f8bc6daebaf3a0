use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use indexmap::IndexMap;
use indexmap::map::Entry;
use crate::bnf::*;
use super::sets::FirstSets;
use super::token_set::TokenSet;

/// An LR(1) item: a production, how much of it has been matched, and the
/// terminal expected once the production is reduced.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) struct Item {
  pub(crate) prod: ProdId,
  /// `0..=len(rhs)`
  pub(crate) dot: usize,
  pub(crate) lookahead: SymbolId,
}

/// Item sets are kept sorted, so equal sets hash equally whatever order the
/// items were added in.
pub(crate) type ItemSet = BTreeSet<Item>;

/// Name of an automaton state, `q<n>` in discovery order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StateId(pub(crate) u32);

impl StateId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl Display for StateId {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "q{}", self.0)
  }
}

#[derive(Debug, Default)]
pub(crate) struct State {
  /// symbol -> target state, in alphabet order
  pub(crate) transitions: IndexMap<SymbolId, StateId>,
}

/// The canonical collection of LR(1) item sets together with the
/// transition function.
#[derive(Debug)]
pub struct Automaton {
  pub(crate) bnf: Arc<Bnf>,
  pub(crate) augmented: Augmented,
  pub(crate) states: IndexMap<ItemSet, State>,
}

impl Item {
  pub(crate) fn is_complete(&self, bnf: &Bnf) -> bool {
    self.dot == bnf.prod(self.prod).symbols.len()
  }

  pub(crate) fn next_symbol(&self, bnf: &Bnf) -> Option<SymbolId> {
    bnf.prod(self.prod).symbols.get(self.dot).copied()
  }
}

pub(crate) fn closure(
  bnf: &Bnf,
  first: &FirstSets,
  seed: impl IntoIterator<Item = Item>,
) -> ItemSet {
  let mut items = ItemSet::new();
  let mut pending = vec![];
  for item in seed {
    if items.insert(item) {
      pending.push(item);
    }
  }

  let mut lookaheads = TokenSet::new(bnf.len());
  while let Some(item) = pending.pop() {
    let nonterm = match item.next_symbol(bnf) {
      Some(sym) if bnf.is_nonterm(sym) => sym,
      _ => continue,
    };

    lookaheads.clear();
    let rest = &bnf.prod(item.prod).symbols[item.dot + 1..];
    first.first_of(bnf, &mut lookaheads, rest, item.lookahead);

    for &prod in bnf.prods_of(nonterm) {
      for lookahead in lookaheads.iter() {
        let new_item = Item { prod, dot: 0, lookahead };
        if items.insert(new_item) {
          pending.push(new_item);
        }
      }
    }
  }

  items
}

/// Returns an empty set when `state` has no transition on `sym`.
pub(crate) fn goto(
  bnf: &Bnf,
  first: &FirstSets,
  state: &ItemSet,
  sym: SymbolId,
) -> ItemSet {
  let moved = state.iter()
    .filter(|item| item.next_symbol(bnf) == Some(sym))
    .map(|item| Item { dot: item.dot + 1, ..*item });
  closure(bnf, first, moved)
}

pub(crate) fn gen_states(
  bnf: Arc<Bnf>,
  augmented: Augmented,
) -> Automaton {
  let first = FirstSets::new(&bnf);
  let start = closure(&bnf, &first, Some(Item {
    prod: augmented.prod,
    dot: 0,
    lookahead: bnf.end,
  }));

  let mut states = IndexMap::new();
  states.insert(start, State::default());

  // States are numbered in the order they are found; `next` is the first
  // state whose transitions are not computed yet.
  let mut next = 0;
  while let Some((items, _)) = states.get_index(next) {
    let targets = bnf.alphabet()
      .map(|sym| (sym, goto(&bnf, &first, items, sym)))
      .filter(|(_, target)| !target.is_empty())
      .collect::<Vec<_>>();

    let mut transitions = IndexMap::new();
    for (sym, target) in targets {
      let index = match states.entry(target) {
        Entry::Occupied(entry) => entry.index(),
        Entry::Vacant(entry) => {
          let index = entry.index();
          log::trace!("q{} --{}--> q{} (new)", next, bnf.name(sym), index);
          entry.insert(State::default());
          index
        }
      };
      transitions.insert(sym, StateId(index as u32));
    }

    if let Some((_, state)) = states.get_index_mut(next) {
      state.transitions = transitions;
    }
    next += 1;
  }

  log::debug!("discovered {} states", states.len());

  Automaton {
    bnf,
    augmented,
    states,
  }
}

impl Automaton {
  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.states.is_empty()
  }

  pub fn start(&self) -> StateId {
    StateId(0)
  }

  pub fn states(&self) -> impl Iterator<Item = StateId> {
    (0..self.states.len() as u32).map(StateId)
  }

  /// The target of `state` on `symbol`, if any.
  pub fn transition(&self, state: StateId, symbol: &str) -> Option<StateId> {
    let sym = self.bnf.symbol(symbol)?;
    let (_, state) = self.states.get_index(state.index())?;
    state.transitions.get(&sym).copied()
  }

  /// Lists the items of `state`, one per line, as `[A -> x . y, a]`.
  pub fn describe_state(&self, state: StateId) -> Option<String> {
    let (items, _) = self.states.get_index(state.index())?;
    let lines = items.iter()
      .map(|item| self.display_item(item))
      .collect::<Vec<_>>();
    Some(lines.join("\n"))
  }

  #[cfg(test)]
  pub(crate) fn items(&self, state: StateId) -> Option<&ItemSet> {
    self.states.get_index(state.index()).map(|(items, _)| items)
  }

  #[cfg(test)]
  pub(crate) fn find(&self, items: &ItemSet) -> Option<StateId> {
    self.states.get_index_of(items).map(|i| StateId(i as u32))
  }

  fn display_item(&self, item: &Item) -> String {
    let bnf = &*self.bnf;
    let prod = bnf.prod(item.prod);
    let mut s = format!("[{} ->", bnf.name(prod.nonterm));
    for (i, &sym) in prod.symbols.iter().enumerate() {
      if i == item.dot {
        s.push_str(" .");
      }
      s.push(' ');
      s.push_str(bnf.name(sym));
    }
    if item.dot == prod.symbols.len() {
      s.push_str(" .");
    }
    s.push_str(", ");
    s.push_str(bnf.name(item.lookahead));
    s.push(']');
    s
  }
}

/// One transition per line, `q0 --S--> q1`.
impl Display for Automaton {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    for (i, (_, state)) in self.states.iter().enumerate() {
      for (&sym, &target) in &state.transitions {
        writeln!(f, "q{} --{}--> {}", i, self.bnf.name(sym), target)?;
      }
    }
    Ok(())
  }
}
