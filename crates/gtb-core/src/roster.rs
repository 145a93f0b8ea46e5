//! The persisted roster: known user ids and the gating channel handles.
//!
//! There is no in-memory cache; every read goes to disk. Mutations run
//! load -> modify -> save under one writer lock so two handlers editing the
//! roster at the same time cannot drop each other's change.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};

use crate::{backup::BackupManager, errors::Error, Result};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RosterDocument {
    pub users: Vec<i64>,
    pub channels: Vec<String>,
}

impl RosterDocument {
    /// Serialize the way the roster file is written on disk (4-space indent, UTF-8).
    pub fn to_pretty_json(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, fmt);
        self.serialize(&mut ser)?;
        Ok(out)
    }
}

pub struct RosterStore {
    path: PathBuf,
    backups: BackupManager,
    writer: Mutex<()>,
}

impl RosterStore {
    pub fn new(path: impl Into<PathBuf>, backups: BackupManager) -> Self {
        Self {
            path: path.into(),
            backups,
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backups(&self) -> &BackupManager {
        &self.backups
    }

    /// Create the backup directory and an empty roster file if none exists yet.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.backups.dir())?;
        if !self.path.exists() {
            self.write_document(&RosterDocument::default())?;
            tracing::info!(path = %self.path.display(), "initialized empty roster");
        }
        Ok(())
    }

    /// Read the roster from disk. A missing file is the empty roster.
    pub fn load(&self) -> Result<RosterDocument> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(RosterDocument::default())
            }
            Err(e) => return Err(Error::Io(e)),
        };
        serde_json::from_slice(&bytes).map_err(|source| Error::StorageCorrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Snapshot the current file, then replace it with `doc`.
    pub fn save(&self, doc: &RosterDocument) -> Result<()> {
        let _guard = self.lock();
        self.save_locked(doc)
    }

    pub fn users(&self) -> Result<Vec<i64>> {
        Ok(self.load()?.users)
    }

    pub fn channels(&self) -> Result<Vec<String>> {
        Ok(self.load()?.channels)
    }

    /// Returns `true` if the user was not known before.
    pub fn add_user(&self, user_id: i64) -> Result<bool> {
        let added = self.mutate(|doc| {
            if doc.users.contains(&user_id) {
                return false;
            }
            doc.users.push(user_id);
            true
        })?;
        if added {
            tracing::info!(user_id, "user added to roster");
        }
        Ok(added)
    }

    /// Returns `true` if the channel was not configured before.
    pub fn add_channel(&self, handle: &str) -> Result<bool> {
        let added = self.mutate(|doc| {
            if doc.channels.iter().any(|c| c == handle) {
                return false;
            }
            doc.channels.push(handle.to_string());
            true
        })?;
        if added {
            tracing::info!(channel = handle, "gating channel added");
        }
        Ok(added)
    }

    /// Returns `true` if the channel was configured and is now gone.
    pub fn remove_channel(&self, handle: &str) -> Result<bool> {
        let removed = self.mutate(|doc| {
            let before = doc.channels.len();
            doc.channels.retain(|c| c != handle);
            doc.channels.len() != before
        })?;
        if removed {
            tracing::info!(channel = handle, "gating channel removed");
        }
        Ok(removed)
    }

    /// Manual snapshot, serialized with writers so it never captures a half-written file.
    pub fn manual_backup(&self) -> Result<String> {
        let _guard = self.lock();
        self.backups.manual_backup()
    }

    /// Overwrite the live roster with a snapshot.
    pub fn restore(&self, file_name: &str) -> Result<()> {
        let _guard = self.lock();
        self.backups.restore(file_name)
    }

    fn mutate(&self, f: impl FnOnce(&mut RosterDocument) -> bool) -> Result<bool> {
        let _guard = self.lock();
        let mut doc = self.load()?;
        if !f(&mut doc) {
            return Ok(false);
        }
        self.save_locked(&doc)?;
        Ok(true)
    }

    fn save_locked(&self, doc: &RosterDocument) -> Result<()> {
        self.backups.auto_backup()?;
        self.write_document(doc)
    }

    fn write_document(&self, doc: &RosterDocument) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, doc.to_pretty_json()?)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store(root: &Path) -> RosterStore {
        let path = root.join("data.json");
        RosterStore::new(
            path.clone(),
            BackupManager::new(path, root.join("backups"), 10),
        )
    }

    fn snapshot_count(store: &RosterStore) -> usize {
        fs::read_dir(store.backups().dir())
            .map(|rd| rd.count())
            .unwrap_or(0)
    }

    #[test]
    fn missing_file_loads_as_empty_roster() {
        let root = tempfile::tempdir().unwrap();
        let s = store(root.path());
        assert_eq!(s.load().unwrap(), RosterDocument::default());
    }

    #[test]
    fn init_writes_empty_document_in_the_on_disk_shape() {
        let root = tempfile::tempdir().unwrap();
        let s = store(root.path());
        s.init().unwrap();

        let txt = fs::read_to_string(s.path()).unwrap();
        assert_eq!(txt, "{\n    \"users\": [],\n    \"channels\": []\n}");
        assert!(s.backups().dir().is_dir());
        assert_eq!(snapshot_count(&s), 0);
    }

    #[test]
    fn malformed_file_is_reported_not_reset() {
        let root = tempfile::tempdir().unwrap();
        let s = store(root.path());
        fs::write(s.path(), "{\"users\": [1,").unwrap();

        assert!(matches!(s.load(), Err(Error::StorageCorrupt { .. })));
        assert!(matches!(s.add_user(5), Err(Error::StorageCorrupt { .. })));
        assert_eq!(fs::read_to_string(s.path()).unwrap(), "{\"users\": [1,");
    }

    #[test]
    fn unexpected_shape_is_corrupt() {
        let root = tempfile::tempdir().unwrap();
        let s = store(root.path());
        fs::write(s.path(), r#"{"users": [], "channels": [], "extra": 1}"#).unwrap();
        assert!(matches!(s.load(), Err(Error::StorageCorrupt { .. })));

        fs::write(s.path(), r#"{"users": []}"#).unwrap();
        assert!(matches!(s.load(), Err(Error::StorageCorrupt { .. })));
    }

    #[test]
    fn add_user_is_idempotent_and_skips_needless_backups() {
        let root = tempfile::tempdir().unwrap();
        let s = store(root.path());
        s.init().unwrap();

        assert!(s.add_user(10).unwrap());
        let after_first = s.load().unwrap();
        let backups_after_first = snapshot_count(&s);

        assert!(!s.add_user(10).unwrap());
        assert_eq!(s.load().unwrap(), after_first);
        assert_eq!(snapshot_count(&s), backups_after_first);
        assert_eq!(after_first.users, vec![10]);
    }

    #[test]
    fn channel_edits_reflect_net_effect_without_duplicates() {
        let root = tempfile::tempdir().unwrap();
        let s = store(root.path());

        let ops: &[(bool, &str)] = &[
            (true, "@a"),
            (true, "@b"),
            (true, "@a"),
            (false, "@c"),
            (true, "@c"),
            (false, "@a"),
            (true, "@d"),
            (true, "@a"),
            (false, "@b"),
            (true, "@d"),
        ];
        let mut model: Vec<String> = Vec::new();
        for (add, ch) in ops {
            if *add {
                s.add_channel(ch).unwrap();
                if !model.iter().any(|c| c == ch) {
                    model.push(ch.to_string());
                }
            } else {
                s.remove_channel(ch).unwrap();
                model.retain(|c| c != ch);
            }
        }

        assert_eq!(s.channels().unwrap(), model);
        assert_eq!(model, vec!["@c", "@d", "@a"]);
    }

    #[test]
    fn every_write_after_the_first_is_preceded_by_a_snapshot() {
        let root = tempfile::tempdir().unwrap();
        let s = store(root.path());

        // No file yet: nothing to snapshot.
        s.add_channel("@one").unwrap();
        assert_eq!(snapshot_count(&s), 0);

        s.add_channel("@two").unwrap();
        assert_eq!(snapshot_count(&s), 1);

        let name = &s.backups().list_recent(1)[0];
        let snap: RosterDocument =
            serde_json::from_slice(&fs::read(s.backups().dir().join(name)).unwrap()).unwrap();
        assert_eq!(snap.channels, vec!["@one"]);
    }

    #[test]
    fn snapshot_count_stays_capped_over_many_saves() {
        let root = tempfile::tempdir().unwrap();
        let s = store(root.path());
        s.init().unwrap();
        for id in 0..25 {
            s.add_user(id).unwrap();
            assert!(snapshot_count(&s) <= 10);
        }
        assert_eq!(snapshot_count(&s), 10);
    }

    #[test]
    fn restore_then_load_matches_snapshot_bytes() {
        let root = tempfile::tempdir().unwrap();
        let s = store(root.path());
        s.init().unwrap();
        s.add_user(1).unwrap();
        s.add_channel("@news").unwrap();
        let name = s.manual_backup().unwrap();

        s.add_user(2).unwrap();
        s.remove_channel("@news").unwrap();

        s.restore(&name).unwrap();
        let snap_bytes = fs::read(s.backups().dir().join(&name)).unwrap();
        assert_eq!(fs::read(s.path()).unwrap(), snap_bytes);
        assert_eq!(s.load().unwrap().to_pretty_json().unwrap(), snap_bytes);
    }

    #[test]
    fn manual_backup_lists_first_with_current_content() {
        let root = tempfile::tempdir().unwrap();
        let s = store(root.path());
        s.init().unwrap();
        for id in [1, 2, 3] {
            s.add_user(id).unwrap();
        }
        s.add_channel("@chan").unwrap();

        let name = s.manual_backup().unwrap();
        assert!(name.starts_with("manual_backup_"));
        assert_eq!(
            fs::read(s.backups().dir().join(&name)).unwrap(),
            fs::read(s.path()).unwrap()
        );
        assert_eq!(s.backups().list_recent(5).first(), Some(&name));
    }

    #[test]
    fn concurrent_writers_do_not_lose_updates() {
        let root = tempfile::tempdir().unwrap();
        let s = Arc::new(store(root.path()));
        s.init().unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let s = Arc::clone(&s);
                std::thread::spawn(move || {
                    s.add_channel(&format!("@c{i}")).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut channels = s.channels().unwrap();
        channels.sort();
        let mut expected: Vec<String> = (0..8).map(|i| format!("@c{i}")).collect();
        expected.sort();
        assert_eq!(channels, expected);
    }
}
