//! On-disk ballot state between CLI invocations.

use anyhow::Context;
use ballot_governance::Ballot;
use std::path::{Path, PathBuf};
use tracing::debug;

/// JSON file holding one ballot.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load and audit the stored ballot.
    pub fn load(&self) -> anyhow::Result<Ballot> {
        let contents = std::fs::read_to_string(&self.path).with_context(|| {
            format!(
                "No ballot at '{}'; run `ballot deploy` first",
                self.path.display()
            )
        })?;
        let ballot: Ballot = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse ballot state '{}'", self.path.display()))?;
        ballot
            .audit()
            .with_context(|| format!("Ballot state '{}' failed audit", self.path.display()))?;
        debug!(path = %self.path.display(), participants = ballot.participants(), "ballot loaded");
        Ok(ballot)
    }

    /// Write the ballot, replacing the file in one rename.
    pub fn save(&self, ballot: &Ballot) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(ballot)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write '{}'", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace '{}'", self.path.display()))?;
        debug!(path = %self.path.display(), "ballot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballot_types::Address;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let file = StateFile::new(dir.path().join("ballot.json"));
        assert!(!file.exists());

        let chair = Address::from_seed(b"chair");
        let mut ballot = Ballot::new(&["a", "b"], chair).unwrap();
        ballot.vote(chair, 1).unwrap();
        file.save(&ballot).unwrap();

        assert!(file.exists());
        assert_eq!(file.load().unwrap(), ballot);
    }

    #[test]
    fn test_missing_state_mentions_deploy() {
        let dir = TempDir::new().unwrap();
        let err = StateFile::new(dir.path().join("none.json")).load().unwrap_err();
        assert!(err.to_string().contains("ballot deploy"));
    }

    #[test]
    fn test_tampered_state_fails_audit() {
        let dir = TempDir::new().unwrap();
        let file = StateFile::new(dir.path().join("ballot.json"));
        let chair = Address::from_seed(b"chair");
        file.save(&Ballot::new(&["a"], chair).unwrap()).unwrap();

        let raw = std::fs::read_to_string(file.path()).unwrap();
        let mut json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        json["tally"][0]["vote_count"] = serde_json::json!(10);
        std::fs::write(file.path(), json.to_string()).unwrap();

        let err = file.load().unwrap_err();
        assert!(format!("{:#}", err).contains("failed audit"));
    }
}
