//! Persistence of the library collections as JSON files

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::StorageConfig,
    error::AppResult,
    models::{LibrarySnapshot, UserPrefs},
    repository::{BorrowerRecords, Catalog, LoanRecords},
};

/// Load each persisted collection and save them together
#[cfg_attr(test, mockall::automock)]
pub trait LibraryStorage {
    fn load_catalog(&self) -> AppResult<Option<Catalog>>;
    fn load_loans(&self) -> AppResult<Option<LoanRecords>>;
    fn load_borrowers(&self) -> AppResult<Option<BorrowerRecords>>;
    fn load_prefs(&self) -> AppResult<Option<UserPrefs>>;

    /// Save every collection. Nothing already on disk may change unless all
    /// of them can be written.
    fn save_snapshot(&self, snapshot: &LibrarySnapshot) -> AppResult<()>;
}

/// Load every collection; missing ones start empty, missing prefs fall back to `default_prefs`
pub fn load_snapshot(storage: &dyn LibraryStorage, default_prefs: UserPrefs) -> AppResult<LibrarySnapshot> {
    let prefs = storage.load_prefs()?.unwrap_or(default_prefs);
    prefs.validate().map_err(|e| {
        tracing::warn!("Rejected stored preferences: {}", e);
        e
    })?;
    Ok(LibrarySnapshot {
        catalog: storage.load_catalog()?.unwrap_or_default(),
        loans: storage.load_loans()?.unwrap_or_default(),
        borrowers: storage.load_borrowers()?.unwrap_or_default(),
        prefs,
    })
}

/// One pretty-printed JSON file per collection
#[derive(Debug, Clone)]
pub struct JsonStorage {
    catalog_path: PathBuf,
    loans_path: PathBuf,
    borrowers_path: PathBuf,
    prefs_path: PathBuf,
}

impl JsonStorage {
    pub fn new(config: &StorageConfig) -> Self {
        let dir = Path::new(&config.data_dir);
        Self {
            catalog_path: dir.join(&config.catalog_file),
            loans_path: dir.join(&config.loans_file),
            borrowers_path: dir.join(&config.borrowers_file),
            prefs_path: dir.join(&config.prefs_file),
        }
    }

    /// Storage with the default file names under `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(&StorageConfig { data_dir: dir.as_ref().display().to_string(), ..Default::default() })
    }

    fn read<T: DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("{} not found, starting with an empty collection", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let value = serde_json::from_str(&content).map_err(|e| {
            tracing::warn!("Could not parse {}: {}", path.display(), e);
            e
        })?;
        tracing::debug!("Loaded {}", path.display());
        Ok(Some(value))
    }

    /// `path` with `.tmp` appended, where a file is written before it replaces `path`
    fn staging_path(path: &Path) -> PathBuf {
        let mut staging = path.as_os_str().to_owned();
        staging.push(".tmp");
        PathBuf::from(staging)
    }

    fn stage<T: Serialize>(path: &Path, value: &T) -> AppResult<(PathBuf, String)> {
        Ok((path.to_path_buf(), serde_json::to_string_pretty(value)?))
    }

    /// Write every file next to its target, then rename them all into place.
    /// A failed write removes the staged files and leaves the targets untouched.
    fn write_all(files: &[(PathBuf, String)]) -> AppResult<()> {
        for parent in files.iter().filter_map(|(path, _)| path.parent()) {
            fs::create_dir_all(parent)?;
        }
        for (path, content) in files {
            if let Err(e) = fs::write(Self::staging_path(path), content) {
                for (staged, _) in files {
                    let _ = fs::remove_file(Self::staging_path(staged));
                }
                return Err(e.into());
            }
        }
        for (path, _) in files {
            fs::rename(Self::staging_path(path), path)?;
            tracing::debug!("Saved {}", path.display());
        }
        Ok(())
    }
}

impl LibraryStorage for JsonStorage {
    fn load_catalog(&self) -> AppResult<Option<Catalog>> {
        Self::read(&self.catalog_path)
    }

    fn load_loans(&self) -> AppResult<Option<LoanRecords>> {
        Self::read(&self.loans_path)
    }

    fn load_borrowers(&self) -> AppResult<Option<BorrowerRecords>> {
        Self::read(&self.borrowers_path)
    }

    fn load_prefs(&self) -> AppResult<Option<UserPrefs>> {
        Self::read(&self.prefs_path)
    }

    fn save_snapshot(&self, snapshot: &LibrarySnapshot) -> AppResult<()> {
        let files = [
            Self::stage(&self.catalog_path, &snapshot.catalog)?,
            Self::stage(&self.loans_path, &snapshot.loans)?,
            Self::stage(&self.borrowers_path, &snapshot.borrowers)?,
            Self::stage(&self.prefs_path, &snapshot.prefs)?,
        ];
        Self::write_all(&files)
    }
}
