//! Locating compiled circuits, proving keys and verification keys.
//!
//! Layout per circuit kind under the artifacts root:
//! - `<kind>_js/<kind>.wasm`: witness generator
//! - `<kind>_final.zkey`: proving key
//! - `<kind>_vk.json`: verification key

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use notepool_circuits::CircuitKind;

use crate::proof::VerifyingKeyJson;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{circuit} artifact not found at {}", path.display())]
pub struct ArtifactNotFound {
    pub circuit: CircuitKind,
    pub path: PathBuf,
}

/// Paths to one circuit's materials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CircuitArtifacts {
    pub kind: CircuitKind,
    pub wasm: PathBuf,
    pub zkey: PathBuf,
    pub verification_key: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where a kind's materials would be; nothing is checked.
    pub fn paths(&self, kind: CircuitKind) -> CircuitArtifacts {
        let name = kind.as_str();
        CircuitArtifacts {
            kind,
            wasm: self
                .root
                .join(format!("{name}_js"))
                .join(format!("{name}.wasm")),
            zkey: self.root.join(format!("{name}_final.zkey")),
            verification_key: self.root.join(format!("{name}_vk.json")),
        }
    }

    /// Paths for proving, failing if the witness generator or proving key
    /// is absent.
    pub fn resolve(&self, kind: CircuitKind) -> Result<CircuitArtifacts, ArtifactNotFound> {
        let artifacts = self.paths(kind);
        require(kind, &artifacts.wasm)?;
        require(kind, &artifacts.zkey)?;
        debug!(circuit = %kind, zkey = %artifacts.zkey.display(), "resolved proving artifacts");
        Ok(artifacts)
    }

    pub fn verification_key_path(&self, kind: CircuitKind) -> Result<PathBuf, ArtifactNotFound> {
        let path = self.paths(kind).verification_key;
        require(kind, &path)?;
        Ok(path)
    }

    /// Read and parse a kind's verification key.
    pub fn load_verification_key(
        &self,
        kind: CircuitKind,
    ) -> Result<VerifyingKeyJson, crate::prove::ProveError> {
        let path = self.verification_key_path(kind)?;
        let text = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Kinds whose proving materials are all present.
    pub fn available(&self) -> Vec<CircuitKind> {
        CircuitKind::ALL
            .into_iter()
            .filter(|&kind| {
                let paths = self.paths(kind);
                paths.wasm.is_file() && paths.zkey.is_file() && paths.verification_key.is_file()
            })
            .collect()
    }
}

fn require(circuit: CircuitKind, path: &Path) -> Result<(), ArtifactNotFound> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ArtifactNotFound {
            circuit,
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"stub").unwrap();
    }

    #[test]
    fn test_layout() {
        let store = ArtifactStore::new("/srv/out");
        let paths = store.paths(CircuitKind::Lp);
        assert_eq!(paths.wasm, PathBuf::from("/srv/out/lp_js/lp.wasm"));
        assert_eq!(paths.zkey, PathBuf::from("/srv/out/lp_final.zkey"));
        assert_eq!(paths.verification_key, PathBuf::from("/srv/out/lp_vk.json"));
    }

    #[test]
    fn test_resolve_reports_first_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let err = store.resolve(CircuitKind::Withdraw).unwrap_err();
        assert_eq!(err.circuit, CircuitKind::Withdraw);
        assert_eq!(err.path, store.paths(CircuitKind::Withdraw).wasm);

        touch(&store.paths(CircuitKind::Withdraw).wasm);
        let err = store.resolve(CircuitKind::Withdraw).unwrap_err();
        assert_eq!(err.path, store.paths(CircuitKind::Withdraw).zkey);

        touch(&store.paths(CircuitKind::Withdraw).zkey);
        assert!(store.resolve(CircuitKind::Withdraw).is_ok());
        assert!(store.verification_key_path(CircuitKind::Withdraw).is_err());
    }

    #[test]
    fn test_available() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let paths = store.paths(CircuitKind::Membership);
        touch(&paths.wasm);
        touch(&paths.zkey);
        touch(&paths.verification_key);
        touch(&store.paths(CircuitKind::Swap).wasm);

        assert_eq!(store.available(), vec![CircuitKind::Membership]);
    }

    #[test]
    fn test_malformed_verification_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        touch(&store.paths(CircuitKind::Lp).verification_key);
        assert!(matches!(
            store.load_verification_key(CircuitKind::Lp),
            Err(crate::prove::ProveError::Json(_))
        ));
    }
}
