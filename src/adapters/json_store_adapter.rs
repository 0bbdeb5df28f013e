//! JSON file reference price store implementing StorePort.
//!
//! The file is a date-keyed map of symbol prices:
//!
//! ```json
//! { "2026-10-15": { "sh601991": 3.41, "sz000767": 3.02 } }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::error::DigestError;
use crate::domain::price_history::PriceHistory;
use crate::ports::store_port::StorePort;

pub struct JsonStoreAdapter {
    path: PathBuf,
}

impl JsonStoreAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn error(&self, reason: impl ToString) -> DigestError {
        DigestError::Store {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StorePort for JsonStoreAdapter {
    fn load(&self) -> Result<PriceHistory, DigestError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(PriceHistory::new()),
            Err(e) => return Err(self.error(e)),
        };
        if content.trim().is_empty() {
            return Ok(PriceHistory::new());
        }
        serde_json::from_str(&content).map_err(|e| self.error(e))
    }

    fn save(&self, history: &PriceHistory) -> Result<(), DigestError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.error(e))?;
        }
        let json = serde_json::to_string_pretty(history).map_err(|e| self.error(e))?;
        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|e| self.error(e))?;
        fs::rename(&temp, &self.path).map_err(|e| self.error(e))?;
        Ok(())
    }
}
