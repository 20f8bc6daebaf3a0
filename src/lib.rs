//! A canonical LR(1) parser generator.
//!
//! A [`Grammar`] is lowered into the canonical collection of LR(1) item
//! sets, which is turned into a shift/reduce/accept table driving a
//! shift-reduce recognizer.
//!
//! ```
//! use lrgen::grammar::{grammar, rule};
//!
//! let g = grammar(&["S"], &["a", "b"], "S", &[
//!   rule("S", &[]),
//!   rule("S", &["a", "S", "b", "S"]),
//! ]);
//! let parser = lrgen::build(&g).unwrap();
//! assert_eq!(parser.parse_word("aabb"), Ok(true));
//! assert_eq!(parser.parse_word("abb"), Ok(false));
//! ```

pub mod config;
pub mod error;
pub mod grammar;
pub mod parser;
mod bnf;

pub use bnf::ProdId;
pub use config::{Config, ConflictPolicy};
pub use error::{Error, Result};
pub use grammar::{Grammar, Rule};
pub use parser::Parser;

/// Builds states and table in one go, augmenting the grammar's start symbol
/// `S` with `S'`.
pub fn build(grammar: &Grammar) -> Result<Parser> {
  build_with_config(grammar, Config::default())
}

pub fn build_with_config(grammar: &Grammar, config: Config) -> Result<Parser> {
  let start = grammar.start().ok_or(Error::MissingStart)?;
  let mut parser = Parser::with_config(grammar, config)?;
  parser.build_states(&format!("{}'", start), start)?;
  parser.build_table()?;
  Ok(parser)
}
