//! Per-visitor usage counters.
//!
//! Counts live only on the visitor's machine and are added on top of the
//! base count each offer carries. They are never sent back to the server.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageCounts(HashMap<String, u64>);

impl UsageCounts {
  pub fn get(&self, id: &str) -> u64 {
    self.0.get(id).copied().unwrap_or(0)
  }

  pub fn increment(&mut self, id: &str) -> u64 {
    let count = self.0.entry(id.to_string()).or_insert(0);
    *count = count.saturating_add(1);
    *count
  }
}

/// Usage counters persisted to a local JSON file.
#[derive(Debug)]
pub struct UsageStore {
  path: PathBuf,
  counts: UsageCounts,
}

impl UsageStore {
  /// A missing or unreadable file starts from empty counts.
  pub async fn open(path: impl AsRef<Path>) -> Self {
    let path = path.as_ref().to_path_buf();

    let counts = match tokio::fs::read(&path).await {
      Ok(raw) => json::from_slice(&raw).unwrap_or_else(|err| {
        warn!("Ignoring corrupt usage file {}: {err}", path.display());
        UsageCounts::default()
      }),
      Err(_) => UsageCounts::default(),
    };

    Self { path, counts }
  }

  pub fn counts(&self) -> &UsageCounts {
    &self.counts
  }

  /// Bumps the counter of `id` and writes the file right away.
  pub async fn record(&mut self, id: &str) -> anyhow::Result<u64> {
    let count = self.counts.increment(id);

    let raw = json::to_vec_pretty(&self.counts)?;
    tokio::fs::write(&self.path, raw).await.with_context(|| {
      format!("Failed to write usage file {}", self.path.display())
    })?;

    debug!("Usage of {id} is now {count}");
    Ok(count)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = UsageStore::open(dir.path().join("coupon-uses.json")).await;

    assert_eq!(store.counts(), &UsageCounts::default());
  }

  #[tokio::test]
  async fn test_record_persists_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coupon-uses.json");

    let mut store = UsageStore::open(&path).await;
    assert_eq!(store.record("nike-10off").await.unwrap(), 1);
    assert_eq!(store.record("nike-10off").await.unwrap(), 2);
    assert_eq!(store.record("adidas").await.unwrap(), 1);

    let reopened = UsageStore::open(&path).await;
    assert_eq!(reopened.counts().get("nike-10off"), 2);
    assert_eq!(reopened.counts().get("adidas"), 1);
    assert_eq!(reopened.counts().get("ishop"), 0);
  }

  #[test]
  fn test_increment_saturates() {
    let mut counts = UsageCounts(HashMap::from([("x".to_string(), u64::MAX)]));

    assert_eq!(counts.increment("x"), u64::MAX);
    assert_eq!(counts.get("x"), u64::MAX);
  }

  #[tokio::test]
  async fn test_corrupt_file_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("coupon-uses.json");
    tokio::fs::write(&path, b"{not json").await.unwrap();

    let mut store = UsageStore::open(&path).await;
    assert_eq!(store.counts().get("x"), 0);
    assert_eq!(store.record("x").await.unwrap(), 1);
  }
}
