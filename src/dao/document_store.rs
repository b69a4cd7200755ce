//! Atomic load/save of the shared scoreboard document.
//!
//! Writes go to `<path>.tmp`, are flushed and fsynced, then renamed over the
//! canonical path, so a reader observes either the fully-old or the fully-new
//! content. Every operation serializes through one mutex, which also
//! linearizes the load-then-save sequences of concurrent updates.

use std::{path::PathBuf, time::Duration};

use tokio::{io::AsyncWriteExt, sync::Mutex};
use tracing::warn;

use crate::dao::storage::{StoreError, StoreResult};
use crate::state::document::Document;

/// Attempts made when a read races a concurrent replace.
const READ_ATTEMPTS: u32 = 3;
/// Pause between read attempts.
const READ_BACKOFF: Duration = Duration::from_millis(20);

/// File-backed store owning the scoreboard document.
pub struct DocumentStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl DocumentStore {
    /// Create a store persisting to `path`. The file may not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the persisted document.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read the current document, or an empty one when no file exists yet.
    ///
    /// A transiently malformed file (observed mid-replace on platforms without
    /// atomic rename guarantees) is retried a few times, then degraded to an
    /// empty document rather than failing the caller.
    pub async fn load(&self) -> Document {
        let _guard = self.lock.lock().await;
        self.load_locked().await
    }

    /// Persist `doc` atomically.
    pub async fn save(&self, doc: &Document) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        self.save_locked(doc).await
    }

    /// Merge `update` over the current document, keeping each key in `keys`
    /// from the current document, then persist and return the merged result.
    ///
    /// The load and the save happen under one continuous lock acquisition, so
    /// two concurrent calls can never interleave and lose a preserved key.
    pub async fn save_preserving(
        &self,
        mut update: Document,
        keys: &[String],
    ) -> StoreResult<Document> {
        let _guard = self.lock.lock().await;
        let current = self.load_locked().await;
        update.preserve_from(&current, keys);
        self.save_locked(&update).await?;
        Ok(update)
    }

    /// Load, apply `apply`, and persist, all under one lock acquisition.
    ///
    /// Used by the dedicated port and template operations, which are allowed
    /// to touch server-owned fields.
    pub async fn mutate<F>(&self, apply: F) -> StoreResult<Document>
    where
        F: FnOnce(&mut Document),
    {
        let _guard = self.lock.lock().await;
        let mut doc = self.load_locked().await;
        apply(&mut doc);
        self.save_locked(&doc).await?;
        Ok(doc)
    }

    /// Single-attempt readability probe used by the health check.
    ///
    /// A missing file is healthy (fresh install); an unreadable or
    /// unparseable file is not.
    pub async fn probe(&self) -> bool {
        let _guard = self.lock.lock().await;
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice::<Document>(&bytes).is_ok(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => true,
            Err(_) => false,
        }
    }

    async fn load_locked(&self) -> Document {
        for attempt in 1..=READ_ATTEMPTS {
            match tokio::fs::read(&self.path).await {
                Ok(bytes) => match serde_json::from_slice(&bytes) {
                    Ok(doc) => return doc,
                    Err(err) => {
                        if attempt == READ_ATTEMPTS {
                            warn!(
                                path = %self.path.display(),
                                error = %err,
                                "document read was transiently invalid; returning empty state"
                            );
                        } else {
                            tokio::time::sleep(READ_BACKOFF).await;
                        }
                    }
                },
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    return Document::default();
                }
                Err(err) => {
                    // Possible transient sharing violation during replace.
                    if attempt == READ_ATTEMPTS {
                        warn!(
                            path = %self.path.display(),
                            error = %err,
                            "document read failed; returning empty state"
                        );
                    } else {
                        tokio::time::sleep(READ_BACKOFF).await;
                    }
                }
            }
        }
        Document::default()
    }

    async fn save_locked(&self, doc: &Document) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let tmp = PathBuf::from(format!("{}.tmp", self.path.display()));

        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        file.sync_all().await.map_err(|e| StoreError::io(&tmp, e))?;
        drop(file);

        if let Err(err) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::io(&self.path, err));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::state::document::PlayerCard;

    fn store_in(dir: &TempDir) -> DocumentStore {
        DocumentStore::new(dir.path().join("data.json"))
    }

    fn doc_with_port(port: u16) -> Document {
        Document {
            port: Some(port),
            ..Document::default()
        }
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty_document() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load().await, Document::default());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let doc = Document {
            stage: Some("Top 8".to_string()),
            port: Some(8008),
            ..Document::default()
        };
        store.save(&doc).await.unwrap();
        assert_eq!(store.load().await, doc);
    }

    #[tokio::test]
    async fn temp_file_is_cleaned_up_after_save() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&doc_with_port(8008)).await.unwrap();
        assert!(!dir.path().join("data.json.tmp").exists());
    }

    #[tokio::test]
    async fn malformed_file_degrades_to_empty_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, b"{\"player1\": {\"name\": \"Ali").unwrap();

        let store = DocumentStore::new(path);
        assert_eq!(store.load().await, Document::default());
    }

    #[tokio::test]
    async fn save_preserving_keeps_server_owned_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&doc_with_port(9000)).await.unwrap();

        let merged = store
            .save_preserving(
                doc_with_port(1234),
                &["port".to_string(), "active_template".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(merged.port, Some(9000));
        assert_eq!(store.load().await.port, Some(9000));
    }

    #[tokio::test]
    async fn save_preserving_respects_a_custom_key_set() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&doc_with_port(9000)).await.unwrap();

        let merged = store
            .save_preserving(doc_with_port(1234), &[])
            .await
            .unwrap();
        assert_eq!(merged.port, Some(1234));
    }

    #[tokio::test]
    async fn mutate_applies_under_the_lock() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let doc = store
            .mutate(|doc| doc.active_template = Some("minimal".to_string()))
            .await
            .unwrap();
        assert_eq!(doc.active_template.as_deref(), Some("minimal"));
        assert_eq!(
            store.load().await.active_template.as_deref(),
            Some("minimal")
        );
    }

    /// Concurrent writers: every load must observe one complete save, never a
    /// blend of two. Each writer stamps the same marker into two fields; a
    /// torn read would surface as a mismatched pair.
    #[tokio::test]
    async fn concurrent_saves_never_tear() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(store_in(&dir));

        let mut writers = Vec::new();
        for i in 0..16u32 {
            let store = Arc::clone(&store);
            writers.push(tokio::spawn(async move {
                let marker = format!("writer-{i}");
                let doc = Document {
                    toptext: Some(marker.clone()),
                    player1: Some(PlayerCard {
                        name: Some(marker),
                        score: Some(i),
                        ..PlayerCard::default()
                    }),
                    ..Document::default()
                };
                store.save(&doc).await.unwrap();
            }));
        }

        let readers: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let doc = store.load().await;
                    if let Some(player) = doc.player1 {
                        assert_eq!(doc.toptext, player.name, "torn read observed");
                    }
                })
            })
            .collect();

        for task in writers.into_iter().chain(readers) {
            task.await.unwrap();
        }

        let last = store.load().await;
        assert!(last.player1.is_some());
        assert_eq!(last.toptext, last.player1.unwrap().name);
    }

    #[tokio::test]
    async fn probe_reports_parse_failures() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        let store = DocumentStore::new(path.clone());

        assert!(store.probe().await, "missing file is healthy");
        store.save(&doc_with_port(8008)).await.unwrap();
        assert!(store.probe().await);

        std::fs::write(&path, b"not json").unwrap();
        assert!(!store.probe().await);
    }
}
