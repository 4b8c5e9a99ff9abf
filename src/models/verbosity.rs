//! Verbosity levels

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::LogLevel;

/// Harness verbosity, ordered from quietest to loudest
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Silent,
    #[default]
    Normal,
    Verbose,
    Deafening,
}

impl Verbosity {
    /// Parse a level name or its number (0-3)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "0" | "silent" => Some(Verbosity::Silent),
            "1" | "normal" => Some(Verbosity::Normal),
            "2" | "verbose" => Some(Verbosity::Verbose),
            "3" | "deafening" => Some(Verbosity::Deafening),
            _ => None,
        }
    }

    pub fn is_verbose(self) -> bool {
        self >= Verbosity::Verbose
    }

    pub fn to_log_level(self) -> LogLevel {
        match self {
            Verbosity::Silent => LogLevel::Error,
            Verbosity::Normal => LogLevel::Info,
            Verbosity::Verbose => LogLevel::Debug,
            Verbosity::Deafening => LogLevel::Trace,
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verbosity::Silent => write!(f, "silent"),
            Verbosity::Normal => write!(f, "normal"),
            Verbosity::Verbose => write!(f, "verbose"),
            Verbosity::Deafening => write!(f, "deafening"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_str() {
        assert_eq!(Verbosity::from_str("0"), Some(Verbosity::Silent));
        assert_eq!(Verbosity::from_str("Verbose"), Some(Verbosity::Verbose));
        assert_eq!(Verbosity::from_str(" 3 "), Some(Verbosity::Deafening));
        assert_eq!(Verbosity::from_str("loud"), None);
        assert_eq!(Verbosity::from_str(""), None);
    }

    #[test]
    fn test_verbosity_ordering() {
        assert!(!Verbosity::default().is_verbose());
        assert!(Verbosity::Verbose.is_verbose());
        assert!(Verbosity::Deafening.is_verbose());
        assert_eq!(Verbosity::Verbose.to_log_level(), LogLevel::Debug);
    }
}
