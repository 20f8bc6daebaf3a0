/// How the table builder settles two different actions for the same
/// `(state, symbol)` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
  /// Refuse to build the table and report every conflict.
  Fail,
  /// Accept over shift over reduce; the earlier rule wins between reduces.
  PreferShift,
  /// The later write wins. Items are visited in their total order, so the
  /// outcome is still reproducible.
  Overwrite,
}

impl Default for ConflictPolicy {
  fn default() -> Self {
    ConflictPolicy::Fail
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  /// Sentinel appended to every input. Must not be an alphabet symbol.
  pub end_marker: String,
  pub conflict_policy: ConflictPolicy,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      end_marker: "$".to_owned(),
      conflict_policy: ConflictPolicy::default(),
    }
  }
}
