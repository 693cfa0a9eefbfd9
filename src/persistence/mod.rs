//! Cart persistence
//!
//! The cart is stored as one JSON document under [`STORAGE_KEY`], wrapped in
//! a `{ "state": ..., "version": 0 }` envelope.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;
use crate::domain::aggregates::CartState;
use crate::{PosError, Result};

pub const STORAGE_KEY: &str = "cart-storage";
pub const STORAGE_VERSION: u32 = 0;

#[derive(Serialize, Deserialize)]
struct Envelope<S> {
    state: S,
    #[serde(default)]
    version: u32,
}

/// Key-value backend the cart store saves into after every mutation.
pub trait CartPersistence: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> Result<Option<CartState>>;
    fn save(&self, state: &CartState) -> Result<()>;
}

pub fn encode(state: &CartState) -> Result<String> {
    Ok(serde_json::to_string(&Envelope { state, version: STORAGE_VERSION })?)
}

pub fn decode(raw: &str) -> Result<CartState> {
    let envelope: Envelope<CartState> = serde_json::from_str(raw)?;
    Ok(envelope.state)
}

/// Load the stored state, falling back to an empty cart on any failure.
pub fn restore(persistence: &dyn CartPersistence) -> CartState {
    match persistence.load() {
        Ok(Some(state)) => state,
        Ok(None) => CartState::default(),
        Err(e) => {
            debug!(error = %e, key = STORAGE_KEY, "ignoring unreadable cart state");
            CartState::default()
        }
    }
}

/// Volatile backend. Clones share the same slot.
#[derive(Clone, Debug, Default)]
pub struct MemoryPersistence {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self { Self::default() }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self { slot: Arc::new(Mutex::new(Some(raw.into()))) }
    }

    /// Raw stored document, if any.
    pub fn raw(&self) -> Result<Option<String>> {
        Ok(self.slot.lock().map_err(|_| poisoned())?.clone())
    }
}

fn poisoned() -> PosError { PosError::StorageError("memory storage lock poisoned".into()) }

impl CartPersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<CartState>> {
        self.raw()?.as_deref().map(decode).transpose()
    }

    fn save(&self, state: &CartState) -> Result<()> {
        let raw = encode(state)?;
        *self.slot.lock().map_err(|_| poisoned())? = Some(raw);
        Ok(())
    }
}

/// One JSON file per storage key inside a directory.
#[derive(Clone, Debug)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self { path: dir.as_ref().join(format!("{STORAGE_KEY}.json")) }
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl CartPersistence for FilePersistence {
    fn load(&self) -> Result<Option<CartState>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode(&raw).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &CartState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // rename is atomic: readers see the old document or the new one
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, encode(state)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
