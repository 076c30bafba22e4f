use crate::domain::query::{RecentEntry, SavedEntry};
use crate::history::backend::StorageBackend;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const RECENT_KEY: &str = "atr_recent";
pub const SAVED_KEY: &str = "atr_saved";

pub const RECENT_CAP: usize = 10;
pub const SAVED_CAP: usize = 30;

// The persisted copies keep a longer tail than the in-memory lists show.
const RECENT_PERSIST_CAP: usize = 20;
const SAVED_PERSIST_CAP: usize = 50;

/// The two bounded, newest-first history lists, reconciled with the backend
/// after every mutation. Persistence is best-effort: the in-memory list is
/// updated first and the write's `Result` is handed back for the caller to
/// act on or ignore.
#[derive(Debug)]
pub struct HistoryStore<B: StorageBackend> {
    backend: B,
    recent: Vec<RecentEntry>,
    saved: Vec<SavedEntry>,
}

impl<B: StorageBackend> HistoryStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            recent: Vec::new(),
            saved: Vec::new(),
        }
    }

    pub fn recent(&self) -> &[RecentEntry] {
        &self.recent
    }

    pub fn saved(&self) -> &[SavedEntry] {
        &self.saved
    }

    /// Reads both lists. A missing key yields an empty list; an unreadable
    /// or corrupt payload also yields an empty list, with the error returned
    /// so the failure stays visible to tests and logs.
    pub fn load(&mut self) -> anyhow::Result<()> {
        let recent = Self::load_list::<RecentEntry>(&self.backend, RECENT_KEY);
        let saved = Self::load_list::<SavedEntry>(&self.backend, SAVED_KEY);

        let mut first_err = None;
        match recent {
            Ok(list) => self.recent = list,
            Err(e) => {
                self.recent = Vec::new();
                tracing::warn!(key = RECENT_KEY, error = %e, "discarding unreadable history list");
                first_err = Some(e);
            }
        }
        match saved {
            Ok(list) => self.saved = list,
            Err(e) => {
                self.saved = Vec::new();
                tracing::warn!(key = SAVED_KEY, error = %e, "discarding unreadable history list");
                first_err = first_err.or(Some(e));
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Records a submission: any older entry asking the same question is
    /// dropped, the new one goes first, and the list is capped.
    pub fn add_recent(&mut self, entry: RecentEntry) -> anyhow::Result<()> {
        self.recent.retain(|e| e.question != entry.question);
        self.recent.insert(0, entry);
        self.recent.truncate(RECENT_CAP);
        self.persist_recent()
    }

    /// Saves are explicit user actions; no dedup.
    pub fn add_saved(&mut self, entry: SavedEntry) -> anyhow::Result<()> {
        self.saved.insert(0, entry);
        self.saved.truncate(SAVED_CAP);
        self.persist_saved()
    }

    pub fn clear_recent(&mut self) -> anyhow::Result<()> {
        self.recent.clear();
        self.persist_recent()
    }

    pub fn clear_saved(&mut self) -> anyhow::Result<()> {
        self.saved.clear();
        self.persist_saved()
    }

    fn load_list<T: DeserializeOwned>(backend: &B, key: &str) -> anyhow::Result<Vec<T>> {
        let Some(raw) = backend.read(key)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw)
            .with_context(|| format!("stored list at {key} is not valid JSON"))
    }

    fn persist_recent(&self) -> anyhow::Result<()> {
        Self::persist_list(&self.backend, RECENT_KEY, &self.recent, RECENT_PERSIST_CAP)
    }

    fn persist_saved(&self) -> anyhow::Result<()> {
        Self::persist_list(&self.backend, SAVED_KEY, &self.saved, SAVED_PERSIST_CAP)
    }

    fn persist_list<T: Serialize>(
        backend: &B,
        key: &str,
        list: &[T],
        cap: usize,
    ) -> anyhow::Result<()> {
        let tail = &list[..list.len().min(cap)];
        let raw = serde_json::to_string(tail)
            .with_context(|| format!("failed to serialize history list {key}"))?;
        backend.write(key, &raw)
    }
}
