//! Timestamped snapshots of the roster file.
//!
//! Every roster rewrite is preceded by an `automatic` snapshot; the admin can
//! also take `manual` ones. Both kinds live in one flat directory and share a
//! single retention cap, applied by modification time after each creation.

use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use chrono::{Local, NaiveDateTime};

use crate::{errors::Error, Result};

const SNAPSHOT_EXT: &str = ".json";
const LEGACY_AUTOMATIC_PREFIX: &str = "data_backup_";

/// Origin of a snapshot, encoded as the filename prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackupTag {
    Automatic,
    Manual,
}

impl BackupTag {
    pub fn prefix(self) -> &'static str {
        match self {
            BackupTag::Automatic => "automatic_backup_",
            BackupTag::Manual => "manual_backup_",
        }
    }
}

/// A parsed snapshot filename: `<tag>_backup_<YYYYMMDD_HHMMSS>[_<n>].json`.
///
/// The `_<n>` suffix only appears when two snapshots land in the same second.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotName {
    pub file_name: String,
    pub tag: BackupTag,
    pub stamp: String,
    pub seq: u32,
}

impl SnapshotName {
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(SNAPSHOT_EXT)?;

        let (tag, rest) = if let Some(rest) = stem.strip_prefix(BackupTag::Automatic.prefix()) {
            (BackupTag::Automatic, rest)
        } else if let Some(rest) = stem.strip_prefix(BackupTag::Manual.prefix()) {
            (BackupTag::Manual, rest)
        } else if let Some(rest) = stem.strip_prefix(LEGACY_AUTOMATIC_PREFIX) {
            (BackupTag::Automatic, rest)
        } else {
            return None;
        };

        // `get` instead of slicing: a stray non-ASCII name must not split a char.
        let stamp = rest.get(..15).filter(|s| is_valid_stamp(s))?;
        let seq = match rest.get(15..)? {
            "" => 0,
            suffix => {
                let digits = suffix.strip_prefix('_')?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                digits.parse::<u32>().ok()?
            }
        };

        Some(Self {
            file_name: file_name.to_string(),
            tag,
            stamp: stamp.to_string(),
            seq,
        })
    }

    /// Chronological sort key (the stamp is zero-padded, so string order is time order).
    fn order_key(&self) -> (&str, u32) {
        (&self.stamp, self.seq)
    }
}

fn is_valid_stamp(s: &str) -> bool {
    if s.len() != 15 {
        return false;
    }
    let bytes = s.as_bytes();
    if bytes[8] != b'_' {
        return false;
    }
    bytes[..8].iter().all(|b| b.is_ascii_digit()) && bytes[9..].iter().all(|b| b.is_ascii_digit())
}

/// Creates, lists, prunes and restores snapshots of one roster file.
#[derive(Clone, Debug)]
pub struct BackupManager {
    source: PathBuf,
    dir: PathBuf,
    retention: usize,
}

impl BackupManager {
    pub fn new(source: impl Into<PathBuf>, dir: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            source: source.into(),
            dir: dir.into(),
            retention,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Snapshot the live roster before it is rewritten.
    ///
    /// Returns `None` when there is no live roster yet (nothing to protect).
    pub fn auto_backup(&self) -> Result<Option<String>> {
        if !self.source.exists() {
            return Ok(None);
        }
        self.create(BackupTag::Automatic, Local::now().naive_local())
            .map(Some)
    }

    /// Admin-requested snapshot. Returns the created file name.
    pub fn manual_backup(&self) -> Result<String> {
        self.create(BackupTag::Manual, Local::now().naive_local())
    }

    pub(crate) fn create(&self, tag: BackupTag, at: NaiveDateTime) -> Result<String> {
        if !self.source.exists() {
            return Err(Error::MissingRoster(self.source.clone()));
        }
        fs::create_dir_all(&self.dir)?;

        let name = self.free_name(tag, &at.format("%Y%m%d_%H%M%S").to_string());
        fs::copy(&self.source, self.dir.join(&name))?;
        tracing::info!(backup = %name, "roster snapshot created");

        self.retain();
        Ok(name)
    }

    fn free_name(&self, tag: BackupTag, stamp: &str) -> String {
        let base = format!("{}{stamp}{SNAPSHOT_EXT}", tag.prefix());
        if !self.dir.join(&base).exists() {
            return base;
        }
        let mut seq = 1u32;
        loop {
            let candidate = format!("{}{stamp}_{seq}{SNAPSHOT_EXT}", tag.prefix());
            if !self.dir.join(&candidate).exists() {
                return candidate;
            }
            seq += 1;
        }
    }

    /// Up to `n` snapshot file names, newest first, both tags combined.
    ///
    /// An unreadable backup directory lists as empty.
    pub fn list_recent(&self, n: usize) -> Vec<String> {
        let mut snaps = match self.snapshots() {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, "cannot list backup directory");
                return Vec::new();
            }
        };
        newest_first(&mut snaps);
        snaps.into_iter().take(n).map(|s| s.file_name).collect()
    }

    /// Keep the `retention` most recently modified snapshots, delete the rest.
    ///
    /// Best-effort: failures are logged and otherwise ignored.
    pub fn retain(&self) {
        if let Err(e) = self.retain_newest(self.retention) {
            tracing::warn!(error = %e, "backup retention pass failed");
        }
    }

    fn retain_newest(&self, cap: usize) -> Result<()> {
        let mut entries: Vec<(SystemTime, SnapshotName)> = self
            .snapshots()?
            .into_iter()
            .map(|s| {
                let mtime = fs::metadata(self.dir.join(&s.file_name))
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                (mtime, s)
            })
            .collect();

        entries.sort_by(|(ta, a), (tb, b)| {
            tb.cmp(ta)
                .then_with(|| b.order_key().cmp(&a.order_key()))
        });

        for (_, snap) in entries.into_iter().skip(cap) {
            match fs::remove_file(self.dir.join(&snap.file_name)) {
                Ok(()) => tracing::debug!(backup = %snap.file_name, "old snapshot removed"),
                Err(e) => {
                    tracing::debug!(backup = %snap.file_name, error = %e, "cannot remove snapshot")
                }
            }
        }
        Ok(())
    }

    /// Copy the named snapshot over the live roster file.
    ///
    /// Only bare snapshot file names are accepted; anything that would resolve
    /// outside the backup directory is rejected before touching the disk.
    pub fn restore(&self, file_name: &str) -> Result<()> {
        let Some(snap) = SnapshotName::parse(file_name) else {
            return Err(Error::InvalidBackupName(file_name.to_string()));
        };

        let path = self.dir.join(&snap.file_name);
        if !path.is_file() {
            return Err(Error::BackupNotFound(snap.file_name));
        }

        fs::copy(&path, &self.source)?;
        tracing::info!(backup = %snap.file_name, "roster restored from snapshot");
        Ok(())
    }

    fn snapshots(&self) -> Result<Vec<SnapshotName>> {
        let mut out = Vec::new();
        for ent in fs::read_dir(&self.dir)?.flatten() {
            if !ent.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let name = ent.file_name().to_string_lossy().to_string();
            if let Some(snap) = SnapshotName::parse(&name) {
                out.push(snap);
            }
        }
        Ok(out)
    }
}

/// Sort snapshot names newest first by their encoded timestamp.
fn newest_first(names: &mut [SnapshotName]) {
    names.sort_by(|a, b| b.order_key().cmp(&a.order_key()));
}
