use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use crate::bnf::*;
use crate::config::ConflictPolicy;
use crate::error::{Error, Result};
use crate::grammar::Rule;
use super::state::{Automaton, StateId};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
  Shift(StateId),
  Reduce(ProdId),
  Accept,
}

/// Two different actions computed for one table entry.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Conflict {
  pub state: StateId,
  pub symbol: String,
  /// the action already in the table
  pub existing: String,
  pub incoming: String,
}

impl Display for Conflict {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{} on `{}`: {} vs {}",
      self.state, self.symbol, self.existing, self.incoming)
  }
}

/// The shift/reduce/accept table derived from an [`Automaton`].
#[derive(Debug, Clone)]
pub struct ActionTable {
  pub(crate) bnf: Arc<Bnf>,
  pub(crate) start: StateId,
  /// state -> symbol -> action
  pub(crate) rows: Vec<BTreeMap<SymbolId, Action>>,
  conflicts: Vec<Conflict>,
}

impl PartialEq for ActionTable {
  fn eq(&self, other: &Self) -> bool {
    self.start == other.start
      && self.rows == other.rows
      && self.conflicts == other.conflicts
  }
}

impl Eq for ActionTable {}

pub(crate) fn gen_table(
  automaton: &Automaton,
  policy: ConflictPolicy,
) -> Result<ActionTable> {
  let bnf = &*automaton.bnf;
  let mut table = ActionTable {
    bnf: automaton.bnf.clone(),
    start: automaton.start(),
    rows: vec![BTreeMap::new(); automaton.len()],
    conflicts: vec![],
  };

  for (i, (items, state)) in automaton.states.iter().enumerate() {
    let state_id = StateId(i as u32);
    for item in items {
      if item.is_complete(bnf) {
        let action = if item.prod == automaton.augmented.prod {
          Action::Accept
        } else {
          Action::Reduce(item.prod)
        };
        table.record(state_id, item.lookahead, action, policy);
      } else {
        for (&sym, &target) in &state.transitions {
          table.record(state_id, sym, Action::Shift(target), policy);
        }
      }
    }
  }

  log::debug!("action table: {} states, {} conflicts",
    table.rows.len(), table.conflicts.len());

  if policy == ConflictPolicy::Fail && !table.conflicts.is_empty() {
    return Err(Error::NotLr1(table.conflicts));
  }
  Ok(table)
}

impl ActionTable {
  fn record(
    &mut self,
    state: StateId,
    sym: SymbolId,
    action: Action,
    policy: ConflictPolicy,
  ) {
    let existing = match self.lookup(state, sym) {
      None => {
        self.rows[state.index()].insert(sym, action);
        return;
      }
      Some(existing) if existing == action => return,
      Some(existing) => existing,
    };

    let conflict = Conflict {
      state,
      symbol: self.bnf.name(sym).to_owned(),
      existing: self.display_action(existing).to_string(),
      incoming: self.display_action(action).to_string(),
    };
    log::warn!("conflict in {}", conflict);
    self.conflicts.push(conflict);

    let replace = match policy {
      ConflictPolicy::Fail => false,
      ConflictPolicy::Overwrite => true,
      ConflictPolicy::PreferShift => rank(action) < rank(existing),
    };
    if replace {
      self.rows[state.index()].insert(sym, action);
    }
  }

  pub fn start(&self) -> StateId {
    self.start
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  /// Every collision seen while building, including the ones the policy
  /// settled.
  pub fn conflicts(&self) -> &[Conflict] {
    &self.conflicts
  }

  /// The entry for `(state, symbol)`, if any.
  pub fn action(&self, state: StateId, symbol: &str) -> Option<Action> {
    let sym = self.bnf.symbol(symbol)?;
    self.lookup(state, sym)
  }

  pub(crate) fn lookup(&self, state: StateId, sym: SymbolId) -> Option<Action> {
    self.rows.get(state.index())?.get(&sym).copied()
  }

  /// The rule a [`Action::Reduce`] entry reduces by.
  pub fn rule(&self, prod: ProdId) -> Option<Rule> {
    self.bnf.rule(prod)
  }

  pub fn display_action(&self, action: Action) -> DisplayAction {
    DisplayAction { bnf: &*self.bnf, action }
  }
}

/// Lower wins.
fn rank(action: Action) -> (u8, u32) {
  match action {
    Action::Accept => (0, 0),
    Action::Shift(_) => (1, 0),
    Action::Reduce(prod) => (2, prod.0),
  }
}

pub struct DisplayAction<'a> {
  bnf: &'a Bnf,
  action: Action,
}

impl<'a> Display for DisplayAction<'a> {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self.action {
      Action::Shift(target) => write!(f, "shift {}", target),
      Action::Reduce(prod) => write!(f, "reduce {}", self.bnf.display_prod(prod)),
      Action::Accept => write!(f, "accept"),
    }
  }
}

/// One entry per line, `q0 a reduce S -> ε`, symbols in alphabet order.
impl Display for ActionTable {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    for (i, row) in self.rows.iter().enumerate() {
      for (&sym, &action) in row {
        writeln!(f, "q{} {} {}", i, self.bnf.name(sym), self.display_action(action))?;
      }
    }
    Ok(())
  }
}
