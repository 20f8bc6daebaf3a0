use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use indexmap::{IndexMap, IndexSet};
use crate::error::{Error, Result};

/// A context-free grammar as supplied by the caller.
///
/// The alphabet keeps insertion order. Automaton states are numbered by
/// walking the alphabet in that order, so two grammars built the same way
/// produce the same state names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
  /// symbol -> is terminal
  pub(crate) alphabet: IndexMap<String, bool>,
  pub(crate) rules: IndexSet<Rule>,
  pub(crate) start: Option<String>,
}

/// A production `lhs -> rhs`. An empty `rhs` is an epsilon production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
  pub(crate) lhs: String,
  pub(crate) rhs: Vec<String>,
}

impl Rule {
  pub fn lhs(&self) -> &str {
    &self.lhs
  }

  pub fn rhs(&self) -> &[String] {
    &self.rhs
  }
}

impl Display for Rule {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{} ->", self.lhs)?;
    if self.rhs.is_empty() {
      return write!(f, " ε");
    }
    for sym in &self.rhs {
      write!(f, " {}", sym)?;
    }
    Ok(())
  }
}

pub fn rule(
  lhs: impl Into<String>,
  rhs: &[&str],
) -> Rule {
  Rule {
    lhs: lhs.into(),
    rhs: rhs.iter().map(|&s| s.to_owned()).collect(),
  }
}

pub fn grammar(
  nonterms: &[&str],
  terms: &[&str],
  start: &str,
  rules: &[Rule],
) -> Grammar {
  let mut g = Grammar::new();
  g.set_alphabet(nonterms.iter().map(|&s| (s, false))
    .chain(terms.iter().map(|&s| (s, true))));
  g.add_rules(rules.iter().cloned());
  g.set_start(start);
  g
}

impl Grammar {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replaces the alphabet. The flag is `true` for terminals.
  pub fn set_alphabet<S: Into<String>>(
    &mut self,
    alphabet: impl IntoIterator<Item = (S, bool)>,
  ) {
    self.alphabet = alphabet.into_iter()
      .map(|(sym, is_term)| (sym.into(), is_term))
      .collect();
  }

  /// Adds rules; a rule equal to one already present is ignored.
  pub fn add_rules(&mut self, rules: impl IntoIterator<Item = Rule>) {
    self.rules.extend(rules);
  }

  pub fn set_start(&mut self, start: impl Into<String>) {
    self.start = Some(start.into());
  }

  pub fn start(&self) -> Option<&str> {
    self.start.as_deref()
  }

  pub fn rules(&self) -> impl Iterator<Item = &Rule> {
    self.rules.iter()
  }

  pub fn is_terminal(&self, sym: &str) -> Option<bool> {
    self.alphabet.get(sym).copied()
  }

  pub fn terminals(&self) -> impl Iterator<Item = &str> {
    self.alphabet.iter()
      .filter(|&(_, &is_term)| is_term)
      .map(|(sym, _)| sym.as_str())
  }

  pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
    self.alphabet.iter()
      .filter(|&(_, &is_term)| !is_term)
      .map(|(sym, _)| sym.as_str())
  }
}

/// Reads rules of the form `A -> x B y`, one per line, with `|` separating
/// alternatives and an empty right side for epsilon.
///
/// Left-hand symbols become non-terminals, in order of first appearance,
/// followed by the remaining symbols as terminals. The first left-hand
/// symbol is the start symbol.
impl FromStr for Grammar {
  type Err = Error;

  fn from_str(text: &str) -> Result<Grammar> {
    let mut rules = Vec::new();
    for (i, line) in text.lines().enumerate() {
      let line = line.trim();
      if line.is_empty() {
        continue;
      }
      let mut parts = line.splitn(2, "->");
      let lhs = parts.next().map(str::trim).unwrap_or_default();
      let rhs = parts.next().ok_or_else(|| Error::Syntax {
        line: i + 1,
        message: "expected `->`".to_owned(),
      })?;
      if lhs.is_empty() || lhs.split_whitespace().count() != 1 {
        return Err(Error::Syntax {
          line: i + 1,
          message: format!("expected a single left-hand symbol, found `{}`", lhs),
        });
      }
      for alt in rhs.split('|') {
        rules.push(Rule {
          lhs: lhs.to_owned(),
          rhs: alt.split_whitespace().map(str::to_owned).collect(),
        });
      }
    }

    let mut alphabet = IndexMap::new();
    for rule in &rules {
      alphabet.insert(rule.lhs.clone(), false);
    }
    for rule in &rules {
      for sym in &rule.rhs {
        alphabet.entry(sym.clone()).or_insert(true);
      }
    }

    let start = rules.first().map(|rule| rule.lhs.clone());
    Ok(Grammar {
      alphabet,
      rules: rules.into_iter().collect(),
      start,
    })
  }
}
