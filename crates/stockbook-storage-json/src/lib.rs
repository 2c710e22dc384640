use std::{
    cmp::Reverse,
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use stockbook_core::{storage::LedgerStore, CoreError};
use stockbook_domain::{Branch, Department, LedgerKey, LedgerRecord, LineItem};
use tracing::{debug, warn};

const RECORD_EXTENSION: &str = "json";
const DATE_FORMAT: &str = "%Y-%m-%d";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S%3f";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// Root directories for ledger records and their overwrite backups.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub ledger_root: PathBuf,
    pub backup_root: PathBuf,
}

/// Describes a persisted backup of one ledger record.
#[derive(Debug, Clone)]
pub struct LedgerBackupInfo {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub path: PathBuf,
}

/// On-disk shape of a record: the key plus the flat item list (main rows, then prep rows).
#[derive(Debug, Serialize, Deserialize)]
struct StoredLedger {
    date: NaiveDate,
    branch: Branch,
    department: Department,
    #[serde(default)]
    items: Vec<LineItem>,
}

/// Filesystem-backed JSON persistence for daily ledgers and their backups.
#[derive(Debug, Clone)]
pub struct JsonLedgerStore {
    ledger_root: PathBuf,
    backup_root: PathBuf,
    retention: usize,
}

impl JsonLedgerStore {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.ledger_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            ledger_root: paths.ledger_root,
            backup_root: paths.backup_root,
            retention: retention.max(1),
        })
    }

    pub fn ledger_path(&self, key: &LedgerKey) -> PathBuf {
        self.partition_dir(&self.ledger_root, &key.branch, key.department)
            .join(format!("{}.{}", key.date.format(DATE_FORMAT), RECORD_EXTENSION))
    }

    fn partition_dir(&self, root: &Path, branch: &Branch, department: Department) -> PathBuf {
        root.join(branch.slug()).join(department.slug())
    }

    fn backup_dir(&self, key: &LedgerKey) -> PathBuf {
        self.partition_dir(&self.backup_root, &key.branch, key.department)
    }

    /// Backups of the record, newest first.
    pub fn list_backups(&self, key: &LedgerKey) -> Result<Vec<LedgerBackupInfo>, CoreError> {
        let dir = self.backup_dir(key);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = format!("{}_", key.date.format(DATE_FORMAT));
        let mut entries: Vec<(LedgerBackupInfo, u32)> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            if !file_name.starts_with(&prefix) {
                continue;
            }
            let parsed = parse_backup_name(file_name);
            entries.push((
                LedgerBackupInfo {
                    id: file_name.to_string(),
                    created_at: parsed.map(|(at, _)| at),
                    path: path.clone(),
                },
                parsed.map(|(_, sequence)| sequence).unwrap_or(0),
            ));
        }
        entries.sort_by_key(|(info, sequence)| Reverse((info.created_at, *sequence)));
        Ok(entries.into_iter().map(|(info, _)| info).collect())
    }

    /// Copies a backup over the current record and returns the restored record.
    pub fn restore_backup(
        &self,
        key: &LedgerKey,
        backup: &LedgerBackupInfo,
    ) -> Result<LedgerRecord, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!("backup `{}` not found", backup.id)));
        }
        let target = self.ledger_path(key);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&backup.path, &target)?;
        self.load(key)?
            .ok_or_else(|| CoreError::Storage(format!("backup `{}` could not be read", backup.id)))
    }

    fn backup_existing_file(&self, key: &LedgerKey, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(key);
        fs::create_dir_all(&dir)?;
        let stem = format!(
            "{}_{}",
            key.date.format(DATE_FORMAT),
            Utc::now().format(BACKUP_TIMESTAMP_FORMAT)
        );
        // Saves inside the same millisecond get a `-<n>` suffix instead of overwriting.
        let mut file_name = format!("{}.{}", stem, RECORD_EXTENSION);
        let mut sequence = 0u32;
        while dir.join(&file_name).exists() {
            sequence += 1;
            file_name = format!("{}-{}.{}", stem, sequence, RECORD_EXTENSION);
        }
        fs::copy(path, dir.join(&file_name))?;
        debug!(key = %key, backup = %file_name, "backed up previous ledger file");
        self.prune_backups(key)
    }

    fn prune_backups(&self, key: &LedgerKey) -> Result<(), CoreError> {
        for entry in self.list_backups(key)?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                warn!(backup = %entry.id, error = %err, "failed to prune ledger backup");
            }
        }
        Ok(())
    }
}

impl LedgerStore for JsonLedgerStore {
    fn load(&self, key: &LedgerKey) -> Result<Option<LedgerRecord>, CoreError> {
        let path = self.ledger_path(key);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let stored: StoredLedger = serde_json::from_str(&data)
            .map_err(|err| CoreError::Serde(format!("{}: {}", path.display(), err)))?;
        if !stored.branch.matches(key.branch.as_str()) {
            return Err(CoreError::Storage(format!(
                "{} holds a ledger for branch `{}`, not `{}`",
                path.display(),
                stored.branch,
                key.branch
            )));
        }
        if stored.date != key.date || stored.department != key.department {
            warn!(key = %key, path = %path.display(), "ledger file header does not match its location");
        }
        Ok(Some(LedgerRecord::from_flat(key.clone(), stored.items)))
    }

    fn save(&self, record: &LedgerRecord) -> Result<(), CoreError> {
        let path = self.ledger_path(&record.key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.backup_existing_file(&record.key, &path)?;
        let stored = StoredLedger {
            date: record.key.date,
            branch: record.key.branch.clone(),
            department: record.key.department,
            items: record.to_flat(),
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|err| CoreError::Serde(err.to_string()))?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, key: &LedgerKey) -> Result<bool, CoreError> {
        match fs::remove_file(self.ledger_path(key)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn list_dates(
        &self,
        branch: &Branch,
        department: Department,
    ) -> Result<Vec<NaiveDate>, CoreError> {
        let dir = self.partition_dir(&self.ledger_root, branch, department);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut dates = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION)
            {
                continue;
            }
            if let Some(date) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| NaiveDate::parse_from_str(stem, DATE_FORMAT).ok())
            {
                dates.push(date);
            }
        }
        dates.sort();
        Ok(dates)
    }
}

/// Timestamp and same-millisecond sequence from `<date>_<YYYYmmdd>_<HHMMSS[fff]>[-n].json`.
fn parse_backup_name(name: &str) -> Option<(DateTime<Utc>, u32)> {
    let trimmed = name.strip_suffix(&format!(".{}", RECORD_EXTENSION))?;
    let mut segments = trimmed.split('_').collect::<Vec<_>>();
    if segments.len() < 3 {
        return None;
    }
    let last = segments.pop()?;
    let (time, sequence) = match last.split_once('-') {
        Some((time, sequence)) => (time, sequence.parse::<u32>().ok()?),
        None => (last, 0),
    };
    let date = segments.pop()?;
    if !is_digits(date, 8) || !(is_digits(time, 6) || is_digits(time, 9)) {
        return None;
    }
    let (seconds, millis) = time.split_at(6);
    let naive = NaiveDateTime::parse_from_str(&format!("{}{}", date, seconds), "%Y%m%d%H%M%S")
        .ok()?
        .checked_add_signed(Duration::milliseconds(millis.parse().unwrap_or(0)))?;
    Some((DateTime::from_naive_utc_and_offset(naive, Utc), sequence))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
