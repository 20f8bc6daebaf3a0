use thiserror::Error;
use crate::parser::table::Conflict;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("symbol `{0}` is not declared in the alphabet")]
  UndeclaredSymbol(String),

  #[error("rule for `{0}` has a terminal on its left-hand side")]
  TerminalOnLeft(String),

  #[error("start symbol `{0}` is not a non-terminal")]
  StartNotNonterminal(String),

  #[error("grammar has no start symbol")]
  MissingStart,

  #[error("end marker `{0}` is also an alphabet symbol")]
  EndMarkerInAlphabet(String),

  #[error("augmented start symbol `{0}` is already used by the grammar")]
  AugmentedStartInUse(String),

  #[error("line {line}: {message}")]
  Syntax {
    line: usize,
    message: String,
  },

  #[error("automaton states have not been built")]
  StatesNotBuilt,

  #[error("action table has not been built")]
  TableNotBuilt,

  #[error("grammar is not LR(1): {}", summary(.0))]
  NotLr1(Vec<Conflict>),
}

fn summary(conflicts: &[Conflict]) -> String {
  match conflicts {
    [] => "no conflicts".to_owned(),
    [only] => only.to_string(),
    [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
  }
}
