/// Level configuration errors.
///
/// A malformed level is fatal: it is rejected at load time and never
/// simulated. Everything else that can go wrong during play (health far
/// below zero, empty stamina, dialogue exhausted) is normal state.

use std::fmt;
use std::path::PathBuf;

use crate::sim::level::HazardKind;

#[derive(Debug)]
pub enum LevelError {
    /// One hazard entry of one level could not be parsed.
    MalformedEntry {
        level: usize,
        kind: HazardKind,
        entry: String,
        reason: String,
    },
    /// The level file is not valid TOML or does not match the schema.
    Toml(String),
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedEntry { level, kind, entry, reason } => {
                write!(f, "level {level}: bad {kind} entry {entry:?}: {reason}")
            }
            Self::Toml(e) => write!(f, "level file parse error: {e}"),
            Self::Io { path, source } => write!(f, "could not read {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_entry_names_the_culprit() {
        let e = LevelError::MalformedEntry {
            level: 2,
            kind: HazardKind::Ladder,
            entry: "abc::height".into(),
            reason: "x is not a number".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("level 2"));
        assert!(msg.contains("ladder"));
        assert!(msg.contains("abc::height"));
    }
}
