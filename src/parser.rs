use std::sync::Arc;
use crate::bnf::Bnf;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::grammar::Grammar;

mod exec;
mod sets;
pub(crate) mod state;
pub(crate) mod table;
mod token_set;

pub use state::{Automaton, StateId};
pub use table::{Action, ActionTable, Conflict, DisplayAction};
use sets::FirstSets;
use token_set::TokenSet;

/// A parser generator bound to one grammar.
///
/// Generation runs in two explicit steps, [`build_states`] then
/// [`build_table`]; both results are kept and reused by every [`parse`].
///
/// [`build_states`]: Parser::build_states
/// [`build_table`]: Parser::build_table
/// [`parse`]: Parser::parse
pub struct Parser {
  bnf: Bnf,
  first: FirstSets,
  config: Config,
  automaton: Option<Automaton>,
  table: Option<ActionTable>,
}

impl Parser {
  pub fn new(grammar: &Grammar) -> Result<Self> {
    Self::with_config(grammar, Config::default())
  }

  pub fn with_config(grammar: &Grammar, config: Config) -> Result<Self> {
    let bnf = Bnf::new(grammar, &config.end_marker)?;
    let first = FirstSets::new(&bnf);
    Ok(Parser {
      bnf,
      first,
      config,
      automaton: None,
      table: None,
    })
  }

  /// The terminals, and the end marker, that can begin a derivation of
  /// `symbols`, in alphabet order.
  pub fn first(&self, symbols: &[&str]) -> Result<Vec<&str>> {
    let ids = symbols.iter()
      .map(|&name| self.bnf.symbol(name)
        .ok_or_else(|| Error::UndeclaredSymbol(name.to_owned())))
      .collect::<Result<Vec<_>>>()?;
    let mut result = TokenSet::new(self.bnf.len());
    self.first.first_of(&self.bnf, &mut result, &ids, self.bnf.end);
    Ok(result.iter().map(|sym| self.bnf.name(sym)).collect())
  }

  /// Discovers the canonical LR(1) collection for `start`, augmented with
  /// `augmented_start -> start`. Any previously built table is dropped.
  pub fn build_states(
    &mut self,
    augmented_start: &str,
    start: &str,
  ) -> Result<&Automaton> {
    let (bnf, augmented) = self.bnf.augment(augmented_start, start)?;
    self.table = None;
    let automaton = state::gen_states(Arc::new(bnf), augmented);
    log::debug!("built {} states for `{}`", automaton.len(), start);
    Ok(&*self.automaton.insert(automaton))
  }

  pub fn build_table(&mut self) -> Result<&ActionTable> {
    let automaton = self.automaton.as_ref().ok_or(Error::StatesNotBuilt)?;
    let table = table::gen_table(automaton, self.config.conflict_policy)?;
    Ok(&*self.table.insert(table))
  }

  pub fn parse<S: AsRef<str>>(&self, input: &[S]) -> Result<bool> {
    Ok(self.table()?.parse(input))
  }

  /// Parses `word` with every `char` taken as one symbol.
  pub fn parse_word(&self, word: &str) -> Result<bool> {
    Ok(self.table()?.parse_word(word))
  }

  pub fn automaton(&self) -> Result<&Automaton> {
    self.automaton.as_ref().ok_or(Error::StatesNotBuilt)
  }

  pub fn table(&self) -> Result<&ActionTable> {
    self.table.as_ref().ok_or(Error::TableNotBuilt)
  }

  pub fn config(&self) -> &Config {
    &self.config
  }
}
