//! JSON snapshots of the inventory store.
//!
//! The whole store is rewritten after every successful mutation:
//! serialized to `<file>.tmp` first, then renamed over the live file,
//! so a crash mid-write leaves the previous snapshot intact.

use std::path::{Path, PathBuf};

use anyhow::Context;
use hotel_core::InventoryStore;

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot, or `None` if the file does not exist yet.
    pub async fn load(&self) -> anyhow::Result<Option<InventoryStore>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        let store = serde_json::from_slice(&bytes)
            .with_context(|| format!("decoding snapshot {}", self.path.display()))?;
        Ok(Some(store))
    }

    pub async fn save(&self, store: &InventoryStore) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(store).context("encoding snapshot")?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &json)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}
