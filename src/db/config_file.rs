//! Write the Strava credential back into the JSON config file.

use super::CredentialStore;
use crate::config::ConfigError;
use crate::error::Result;
use crate::models::Credential;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Persists the credential as the `strava` section of the config file,
/// leaving every other section untouched.
#[derive(Debug, Clone)]
pub struct ConfigFileCredentialStore {
    path: PathBuf,
}

impl ConfigFileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for ConfigFileCredentialStore {
    fn save(&self, credential: &Credential) -> Result<()> {
        let content = fs::read_to_string(&self.path).map_err(|source| ConfigError::Read {
            path: self.path.clone(),
            source,
        })?;
        let mut document: serde_json::Value =
            serde_json::from_str(&content).map_err(ConfigError::Parse)?;

        let section = serde_json::to_value(credential).map_err(ConfigError::Parse)?;
        let Some(root) = document.as_object_mut() else {
            return Err(ConfigError::Invalid("config root is not a JSON object".into()).into());
        };
        merge_strava_section(root, section);

        let serialized = serde_json::to_string_pretty(&document).map_err(ConfigError::Parse)?;

        // Temp file + rename so a crash never leaves a truncated config
        let temp_path = self.path.with_extension("json.tmp");
        write_private(&temp_path, serialized.as_bytes())
            .map_err(|e| ConfigError::Write(format!("{}: {}", temp_path.display(), e)))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| ConfigError::Write(format!("{}: {}", self.path.display(), e)))?;

        tracing::debug!(path = %self.path.display(), "Credential saved");
        Ok(())
    }
}

/// Overwrite the credential fields of the `strava` section, keeping any
/// other keys the user put there.
fn merge_strava_section(
    root: &mut serde_json::Map<String, serde_json::Value>,
    section: serde_json::Value,
) {
    let fields = match section {
        serde_json::Value::Object(fields) => fields,
        other => {
            root.insert("strava".to_string(), other);
            return;
        }
    };
    match root
        .entry("strava")
        .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()))
    {
        serde_json::Value::Object(existing) => existing.extend(fields),
        other => *other = serde_json::Value::Object(fields),
    }
}

/// Write `contents` to a file readable only by its owner (on Unix).
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // The mode only applies on creation; a stale temp file keeps its old one
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to restrict config file permissions");
        }
    }

    file.write_all(contents)?;
    file.sync_all()
}
