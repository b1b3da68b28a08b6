//! Credential persistence.
//!
//! Every token mutation goes through a [`CredentialStore`] before the new
//! token is handed out, so a refreshed token survives a crash later in the run.

pub mod config_file;

pub use config_file::ConfigFileCredentialStore;

use crate::error::Result;
use crate::models::Credential;
use std::sync::{Arc, Mutex};

/// Somewhere the Strava credential can be written back to.
pub trait CredentialStore {
    fn save(&self, credential: &Credential) -> Result<()>;
}

/// In-memory store for tests and dry runs.
///
/// Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    saved: Arc<Mutex<Vec<Credential>>>,
}

impl MemoryCredentialStore {
    pub fn new_mock() -> Self {
        Self::default()
    }

    /// Every credential saved so far, oldest first.
    pub fn saved(&self) -> Vec<Credential> {
        self.saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, credential: &Credential) -> Result<()> {
        self.saved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(credential.clone());
        Ok(())
    }
}
