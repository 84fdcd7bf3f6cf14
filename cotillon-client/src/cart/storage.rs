// cotillon-client/src/cart/storage.rs
// Cart persistence - one JSON file per user plus an anonymous slot

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use shared::models::CartItem;
use tracing::warn;
use url::form_urlencoded::byte_serialize;

use crate::error::ClientResult;

const ANONYMOUS_FILE: &str = "cart_items.json";

/// Where a cart is kept
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartSlot {
    /// Last cart of whoever used this device
    Anonymous,
    /// Cart of one signed-in user
    User(String),
}

/// Cart persistence backend
pub trait CartStorage: Send + Sync {
    /// `None` when the slot was never written; an unreadable slot loads empty
    fn load(&self, slot: &CartSlot) -> ClientResult<Option<Vec<CartItem>>>;

    fn save(&self, slot: &CartSlot, items: &[CartItem]) -> ClientResult<()>;

    fn delete(&self, slot: &CartSlot) -> ClientResult<()>;
}

/// Carts stored as pretty-printed JSON files under one directory
#[derive(Debug, Clone)]
pub struct JsonFileCartStorage {
    dir: PathBuf,
}

impl JsonFileCartStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Make sure the directory exists
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `slot`; user keys are percent-encoded so distinct ids
    /// never share a file
    pub fn path(&self, slot: &CartSlot) -> PathBuf {
        match slot {
            CartSlot::Anonymous => self.dir.join(ANONYMOUS_FILE),
            CartSlot::User(user) => {
                let key: String = byte_serialize(user.as_bytes()).collect();
                self.dir.join(format!("cart_items_{key}.json"))
            }
        }
    }
}

impl CartStorage for JsonFileCartStorage {
    fn load(&self, slot: &CartSlot) -> ClientResult<Option<Vec<CartItem>>> {
        let path = self.path(slot);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        match serde_json::from_str(&json) {
            Ok(items) => Ok(Some(items)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable cart file, starting empty");
                Ok(Some(Vec::new()))
            }
        }
    }

    fn save(&self, slot: &CartSlot, items: &[CartItem]) -> ClientResult<()> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(items)?;
        fs::write(self.path(slot), json)?;
        Ok(())
    }

    fn delete(&self, slot: &CartSlot) -> ClientResult<()> {
        let path = self.path(slot);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-process storage, nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    slots: Mutex<HashMap<CartSlot, Vec<CartItem>>>,
}

impl MemoryCartStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self, slot: &CartSlot) -> ClientResult<Option<Vec<CartItem>>> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Ok(slots.get(slot).cloned())
    }

    fn save(&self, slot: &CartSlot, items: &[CartItem]) -> ClientResult<()> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.insert(slot.clone(), items.to_vec());
        Ok(())
    }

    fn delete(&self, slot: &CartSlot) -> ClientResult<()> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.remove(slot);
        Ok(())
    }
}
