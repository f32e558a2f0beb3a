//! The four circuits a note can be spent through.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown circuit {0:?} (expected membership, withdraw, swap or lp)")]
pub struct UnknownCircuit(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CircuitKind {
    /// Prove a note is in the tree without spending it
    Membership,
    /// Spend a note to an external recipient
    Withdraw,
    /// Spend a note through a pool swap into a new note
    Swap,
    /// Spend a note into an LP position plus a change note
    Lp,
}

impl CircuitKind {
    pub const ALL: [CircuitKind; 4] = [
        CircuitKind::Membership,
        CircuitKind::Withdraw,
        CircuitKind::Swap,
        CircuitKind::Lp,
    ];

    /// Name used for artifact files and fixture records.
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitKind::Membership => "membership",
            CircuitKind::Withdraw => "withdraw",
            CircuitKind::Swap => "swap",
            CircuitKind::Lp => "lp",
        }
    }
}

impl fmt::Display for CircuitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CircuitKind {
    type Err = UnknownCircuit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "membership" => Ok(CircuitKind::Membership),
            "withdraw" => Ok(CircuitKind::Withdraw),
            "swap" => Ok(CircuitKind::Swap),
            "lp" => Ok(CircuitKind::Lp),
            _ => Err(UnknownCircuit(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in CircuitKind::ALL {
            assert_eq!(kind.as_str().parse::<CircuitKind>(), Ok(kind));
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("LP".parse::<CircuitKind>(), Ok(CircuitKind::Lp));
        assert_eq!(" Swap ".parse::<CircuitKind>(), Ok(CircuitKind::Swap));
    }

    #[test]
    fn test_unknown_circuit() {
        let err = "transfer".parse::<CircuitKind>().unwrap_err();
        assert_eq!(err, UnknownCircuit("transfer".to_string()));
        assert!(err.to_string().contains("transfer"));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&CircuitKind::Lp).unwrap(), "\"lp\"");
        let kind: CircuitKind = serde_json::from_str("\"withdraw\"").unwrap();
        assert_eq!(kind, CircuitKind::Withdraw);
    }
}
