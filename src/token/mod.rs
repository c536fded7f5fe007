//! Bearer token store.
//!
//! Holds at most one token in memory plus one persisted slot on disk
//! (`~/.mapledash/token` by default). The slot is written on submit,
//! removed on clear and read once at startup.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{self, schema::StorageConfig};
use crate::error::DashError;

/// In-memory token plus its persisted slot.
#[derive(Debug, Default)]
pub struct TokenStore {
    current: Option<String>,
    slot: Option<PathBuf>,
}

impl TokenStore {
    /// A store persisting to `slot`; `None` keeps the token in memory only.
    pub fn new(slot: Option<PathBuf>) -> Self {
        Self {
            current: None,
            slot,
        }
    }

    /// A store persisting to the configured `[storage] token_path`.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config::expand_home(&config.token_path))
    }

    /// A store without a persisted slot.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// The active token, if any.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Location of the persisted slot.
    pub fn slot_path(&self) -> Option<&Path> {
        self.slot.as_deref()
    }

    /// Trim and store a user-supplied token.
    ///
    /// An empty result is rejected with [`DashError::EmptyToken`] and leaves
    /// the store untouched. Otherwise the token becomes active in memory
    /// before it is persisted, so a [`DashError::Storage`] error still leaves
    /// a usable session.
    pub fn submit(&mut self, raw: &str) -> Result<String, DashError> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(DashError::EmptyToken);
        }
        self.current = Some(token.to_string());
        self.persist(token)?;
        Ok(token.to_string())
    }

    /// Forget the token in memory and remove the persisted slot.
    ///
    /// Clearing an already empty store is a no-op.
    pub fn clear(&mut self) -> Result<(), DashError> {
        self.current = None;
        let Some(path) = &self.slot else {
            return Ok(());
        };
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load the persisted token, if any, and make it active.
    ///
    /// The token is not validated against the server.
    pub fn restore(&mut self) -> Option<String> {
        let path = self.slot.as_ref()?;
        let content = fs::read_to_string(path).ok()?;
        let token = content.trim();
        if token.is_empty() {
            return None;
        }
        self.current = Some(token.to_string());
        self.current.clone()
    }

    fn persist(&self, token: &str) -> Result<(), DashError> {
        let Some(path) = &self.slot else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(path)?;
        file.write_all(token.as_bytes())?;
        Ok(())
    }
}

/// Render a token for display: a short prefix and suffix around an ellipsis.
///
/// Tokens too short to mask meaningfully are fully hidden.
pub fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "•".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("mapledash-token-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn submit_trims_and_persists() {
        let path = slot("submit");
        let mut store = TokenStore::new(Some(path.clone()));
        let token = store.submit("  sk-abc123  \n").unwrap();
        assert_eq!(token, "sk-abc123");
        assert_eq!(store.current(), Some("sk-abc123"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "sk-abc123");
    }

    #[test]
    fn submit_rejects_blank_input() {
        let mut store = TokenStore::in_memory();
        store.submit("keep-me").unwrap();
        assert_eq!(store.submit("   \t").unwrap_err(), DashError::EmptyToken);
        assert_eq!(store.current(), Some("keep-me"));
    }

    #[test]
    fn restore_reads_persisted_slot() {
        let path = slot("restore");
        TokenStore::new(Some(path.clone())).submit("sk-restored").unwrap();

        let mut fresh = TokenStore::new(Some(path));
        assert_eq!(fresh.current(), None);
        assert_eq!(fresh.restore().as_deref(), Some("sk-restored"));
        assert_eq!(fresh.current(), Some("sk-restored"));
    }

    #[test]
    fn restore_ignores_missing_or_blank_slot() {
        let mut missing = TokenStore::new(Some(slot("never-written")));
        assert_eq!(missing.restore(), None);

        let path = slot("blank");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "  \n").unwrap();
        let mut blank = TokenStore::new(Some(path));
        assert_eq!(blank.restore(), None);
    }

    #[test]
    fn clear_removes_slot_and_is_idempotent() {
        let path = slot("clear");
        let mut store = TokenStore::new(Some(path.clone()));
        store.submit("sk-gone").unwrap();
        store.clear().unwrap();
        assert_eq!(store.current(), None);
        assert!(!path.exists());
        store.clear().unwrap();
    }

    #[test]
    fn mask_hides_the_middle() {
        assert_eq!(mask("sk-1234567890abcd"), "sk-1…abcd");
        assert_eq!(mask("short"), "•••••");
        assert_eq!(mask(""), "");
    }
}
