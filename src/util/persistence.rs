use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde_json::Error as SerdeError;

use crate::domain::PricingPolicy;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "CraftPriceIndex";
const APP_NAME: &str = "CraftPriceIndex";

fn policy_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("policy.json"))
}

/// Load the policy saved in the user config dir, if there is one. A missing
/// or unreadable file just means "use the defaults".
pub fn load_saved_policy() -> Option<PricingPolicy> {
    let path = policy_file()?;
    let data = fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

/// Load a policy from an explicit path. Unlike the saved-policy lookup,
/// failures surface: a caller naming a file wants to know it is broken.
pub fn load_policy_from(path: &Path) -> Result<PricingPolicy, PolicyLoadError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

pub fn save_policy(policy: &PricingPolicy) -> Result<(), PolicySaveError> {
    let path = policy_file().ok_or(PolicySaveError::StorageUnavailable)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(policy)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyLoadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[derive(Debug, thiserror::Error)]
pub enum PolicySaveError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_policy_path_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        let policy = PricingPolicy {
            item_classes: vec![(7, 5), (0, 1)],
            qualities: vec![1, 2],
            max_passes: 4,
        };
        fs::write(&path, serde_json::to_string(&policy).unwrap()).unwrap();
        assert_eq!(load_policy_from(&path).unwrap(), policy);
    }

    #[test]
    fn explicit_policy_path_errors_surface() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_policy_from(&dir.path().join("absent.json")).is_err());

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(load_policy_from(&bad).is_err());
    }
}
