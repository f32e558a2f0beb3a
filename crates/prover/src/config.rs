//! Prover configuration.
//!
//! Values come from defaults, a JSON file, or `NOTEPOOL_*` environment
//! variables layered over the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use notepool_circuits::{MAX_DEPTH, TREE_DEPTH};

pub const ENV_ARTIFACTS_DIR: &str = "NOTEPOOL_ARTIFACTS_DIR";
pub const ENV_SNARKJS: &str = "NOTEPOOL_SNARKJS";
pub const ENV_TREE_DEPTH: &str = "NOTEPOOL_TREE_DEPTH";
pub const ENV_PROVE_TIMEOUT_SECS: &str = "NOTEPOOL_PROVE_TIMEOUT_SECS";
pub const ENV_OUTPUT_DIR: &str = "NOTEPOOL_OUTPUT_DIR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("tree depth {0} exceeds the maximum of 32")]
    DepthTooLarge(u32),
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProverConfig {
    /// Directory holding `<kind>_js/<kind>.wasm`, `<kind>_final.zkey` and `<kind>_vk.json`
    pub artifacts_dir: PathBuf,
    /// Program used to run snarkjs
    pub snarkjs_program: String,
    /// Arguments placed before the snarkjs subcommand (e.g. `["snarkjs"]` for npx)
    pub snarkjs_args: Vec<String>,
    pub tree_depth: u32,
    #[serde(with = "secs")]
    pub prove_timeout: Duration,
    /// Where proof artifacts and fixtures are written
    pub output_dir: PathBuf,
}

impl Default for ProverConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("out"),
            snarkjs_program: "snarkjs".to_string(),
            snarkjs_args: Vec::new(),
            tree_depth: TREE_DEPTH,
            prove_timeout: Duration::from_secs(300),
            output_dir: PathBuf::from("proofs"),
        }
    }
}

impl ProverConfig {
    /// Defaults overridden by any `NOTEPOOL_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load a JSON config; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()
    }

    fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_ARTIFACTS_DIR) {
            config.artifacts_dir = PathBuf::from(dir);
        }
        if let Some(command) = lookup(ENV_SNARKJS) {
            // "npx snarkjs" -> program "npx", args ["snarkjs"]
            let mut words: Vec<String> = command.split_whitespace().map(str::to_string).collect();
            if words.is_empty() {
                return Err(ConfigError::InvalidVar {
                    var: ENV_SNARKJS,
                    value: command,
                    reason: "empty command".to_string(),
                });
            }
            config.snarkjs_program = words.remove(0);
            config.snarkjs_args = words;
        }
        if let Some(value) = lookup(ENV_TREE_DEPTH) {
            config.tree_depth = parse_var(ENV_TREE_DEPTH, value)?;
        }
        if let Some(value) = lookup(ENV_PROVE_TIMEOUT_SECS) {
            config.prove_timeout = Duration::from_secs(parse_var(ENV_PROVE_TIMEOUT_SECS, value)?);
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            config.output_dir = PathBuf::from(dir);
        }

        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.tree_depth > MAX_DEPTH {
            return Err(ConfigError::DepthTooLarge(self.tree_depth));
        }
        Ok(self)
    }
}

fn parse_var<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::InvalidVar {
        var,
        reason: e.to_string(),
        value,
    })
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ProverConfig::default();
        assert_eq!(config.tree_depth, 25);
        assert_eq!(config.snarkjs_program, "snarkjs");
        assert!(config.snarkjs_args.is_empty());
        assert_eq!(config.prove_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_env_overrides() {
        let config = ProverConfig::from_lookup(lookup(&[
            (ENV_ARTIFACTS_DIR, "/srv/circuits/out"),
            (ENV_SNARKJS, "npx snarkjs"),
            (ENV_TREE_DEPTH, "20"),
            (ENV_PROVE_TIMEOUT_SECS, "45"),
        ]))
        .unwrap();

        assert_eq!(config.artifacts_dir, PathBuf::from("/srv/circuits/out"));
        assert_eq!(config.snarkjs_program, "npx");
        assert_eq!(config.snarkjs_args, vec!["snarkjs".to_string()]);
        assert_eq!(config.tree_depth, 20);
        assert_eq!(config.prove_timeout, Duration::from_secs(45));
        assert_eq!(config.output_dir, PathBuf::from("proofs"));
    }

    #[test]
    fn test_env_rejects_bad_values() {
        let err = ProverConfig::from_lookup(lookup(&[(ENV_TREE_DEPTH, "deep")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { var: ENV_TREE_DEPTH, .. }));

        let err = ProverConfig::from_lookup(lookup(&[(ENV_TREE_DEPTH, "40")])).unwrap_err();
        assert!(matches!(err, ConfigError::DepthTooLarge(40)));

        let err = ProverConfig::from_lookup(lookup(&[(ENV_SNARKJS, "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { var: ENV_SNARKJS, .. }));
    }

    #[test]
    fn test_file_keeps_defaults_for_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prover.json");
        std::fs::write(&path, r#"{ "tree_depth": 3, "prove_timeout": 10 }"#).unwrap();

        let config = ProverConfig::from_file(&path).unwrap();
        assert_eq!(config.tree_depth, 3);
        assert_eq!(config.prove_timeout, Duration::from_secs(10));
        assert_eq!(config.artifacts_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            ProverConfig::from_file(&missing),
            Err(ConfigError::Read { .. })
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(ProverConfig::from_file(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = ProverConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ProverConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
