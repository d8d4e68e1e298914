//! Reading the configuration document from disk and writing it back.
//!
//! [`Config::load`] parses a YAML document, [`Config::sync`] persists it with
//! owner-only permissions, and [`SharedConfig`] serializes every mutation of
//! one tree behind a lock so that the in-memory tree and the file never
//! diverge.

use std::fs;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use log::debug;

use crate::config::schema::Config;
use crate::config::status::ClusterLifecycle;
use crate::config::validator::absolute;
use crate::error::{Error, Result};

impl Config {
    /// Loads the document at `path` and records its absolute path in
    /// [`Config::config_path`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] when the file cannot be read and
    /// [`Error::Yaml`] when it is not a valid document.
    ///
    /// # Examples
    ///
    /// ```
    /// use eksconfig::Config;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let path = dir.path().join("c1.yaml");
    /// std::fs::write(&path, "name: c1\nregion: us-east-1\n").unwrap();
    ///
    /// let cfg = Config::load(&path).unwrap();
    /// assert_eq!(cfg.name, "c1");
    /// assert_eq!(cfg.config_path, path.display().to_string());
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("failed to read configuration file: {e}"),
        })?;

        let mut cfg: Self = serde_yaml::from_str(&contents)?;
        cfg.config_path = absolute(&path.display().to_string()).display().to_string();
        debug!("loaded configuration {:?} from {}", cfg.name, cfg.config_path);
        Ok(cfg)
    }

    /// Writes the document to [`Config::config_path`].
    ///
    /// The config and kubeconfig paths are made absolute first and the parent
    /// directory is created when missing. On Unix the file is owner
    /// read-write only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] when `config_path` is empty, and I/O or
    /// YAML errors from writing.
    pub fn sync(&mut self) -> Result<()> {
        if self.config_path.is_empty() {
            return Err(Error::InvalidPath {
                path: self.config_path.clone().into(),
                reason: "empty config path".to_string(),
            });
        }
        self.config_path = absolute(&self.config_path).display().to_string();
        if !self.kubeconfig_path.is_empty() {
            self.kubeconfig_path = absolute(&self.kubeconfig_path).display().to_string();
        }

        let path = Path::new(&self.config_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let document = serde_yaml::to_string(self)?;
        write_private(path, document.as_bytes())?;
        debug!("synced configuration to {}", self.config_path);
        Ok(())
    }

    /// Records a cluster lifecycle transition observed now.
    pub fn record_status(&mut self, status: ClusterLifecycle) {
        self.status.record(status, Utc::now());
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents)?;
    Ok(())
}

/// One configuration tree shared between threads.
///
/// Readers take the read lock; every mutation takes the write lock and
/// persists the tree before releasing it. A poisoned lock is recovered, since
/// a panicking writer leaves the tree as valid as any committed state.
///
/// # Examples
///
/// ```
/// use eksconfig::{Config, SharedConfig};
///
/// let dir = tempfile::tempdir().unwrap();
/// let mut cfg = Config::new_default();
/// cfg.name = "c1".to_string();
/// cfg.config_path = dir.path().join("c1.yaml").display().to_string();
///
/// let shared = SharedConfig::new(cfg);
/// shared.sync().unwrap();
/// assert_eq!(shared.read().name, "c1");
/// assert!(dir.path().join("c1.yaml").exists());
/// ```
#[derive(Debug, Default)]
pub struct SharedConfig {
    inner: RwLock<Config>,
}

impl SharedConfig {
    /// Wraps `cfg`.
    #[must_use]
    pub fn new(cfg: Config) -> Self {
        Self {
            inner: RwLock::new(cfg),
        }
    }

    /// Loads the document at `path`; see [`Config::load`].
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Config::load(path).map(Self::new)
    }

    /// Takes the read lock.
    pub fn read(&self) -> RwLockReadGuard<'_, Config> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Config> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `f` to the tree and persists the result under the write lock.
    ///
    /// Nothing is written when `f` fails.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`, or of [`Config::sync`].
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Config) -> Result<()>,
    {
        let mut cfg = self.write();
        f(&mut cfg)?;
        cfg.sync()
    }

    /// Overlays the process environment and persists the tree.
    ///
    /// # Errors
    ///
    /// See [`Config::update_from_env`] and [`Config::sync`].
    pub fn update_from_env(&self) -> Result<()> {
        self.update(Config::update_from_env)
    }

    /// Validates, fills defaults and persists the tree.
    ///
    /// # Errors
    ///
    /// See [`Config::validate_and_set_defaults`] and [`Config::sync`].
    pub fn validate_and_set_defaults(&self) -> Result<()> {
        self.update(Config::validate_and_set_defaults)
    }

    /// Records a lifecycle transition and persists the tree.
    ///
    /// # Errors
    ///
    /// See [`Config::sync`].
    pub fn record_status(&self, status: ClusterLifecycle) -> Result<()> {
        self.update(|cfg| {
            cfg.record_status(status);
            Ok(())
        })
    }

    /// Persists the tree.
    ///
    /// # Errors
    ///
    /// See [`Config::sync`].
    pub fn sync(&self) -> Result<()> {
        self.write().sync()
    }

    /// Returns the tree, consuming the lock.
    #[must_use]
    pub fn into_inner(self) -> Config {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Config> for SharedConfig {
    fn from(cfg: Config) -> Self {
        Self::new(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut cfg = Config::new_default();
        cfg.name = "c1".to_string();
        cfg.config_path = dir.path().join("c1.yaml").display().to_string();
        cfg
    }

    #[test]
    fn test_load_nonexistent_file() {
        let err = Config::load("/nonexistent/path/c1.yaml").unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "name: [unclosed").unwrap();
        assert!(matches!(Config::load(&path).unwrap_err(), Error::Yaml(_)));
    }

    #[test]
    fn test_partial_document_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c1.yaml");
        fs::write(
            &path,
            "name: c1\nadd-on-jobs-echo:\n  enable: true\n  echo-size: 10\n",
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.add_on_jobs_echo.as_ref().unwrap().echo_size, 10);
        assert!(cfg.add_on_node_groups.is_none());
    }

    #[test]
    fn test_sync_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config_in(&dir);
        cfg.kubeconfig_path = "relative.kubeconfig".to_string();
        cfg.sync().unwrap();
        assert!(Path::new(&cfg.kubeconfig_path).is_absolute());

        let back = Config::load(&cfg.config_path).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_sync_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config_in(&dir);
        cfg.config_path = dir.path().join("nested/deeper/c1.yaml").display().to_string();
        cfg.sync().unwrap();
        assert!(dir.path().join("nested/deeper/c1.yaml").exists());
    }

    #[test]
    fn test_sync_requires_path() {
        let mut cfg = Config::new_default();
        cfg.config_path.clear();
        assert!(matches!(cfg.sync().unwrap_err(), Error::InvalidPath { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let mut cfg = config_in(&dir);
        fs::write(&cfg.config_path, "").unwrap();
        fs::set_permissions(&cfg.config_path, fs::Permissions::from_mode(0o644)).unwrap();
        cfg.sync().unwrap();
        let mode = fs::metadata(&cfg.config_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_record_status_persists() {
        let dir = TempDir::new().unwrap();
        let shared = SharedConfig::new(config_in(&dir));
        shared.record_status(ClusterLifecycle::Active).unwrap();
        assert!(shared.read().status.up);

        let back = Config::load(dir.path().join("c1.yaml")).unwrap();
        assert_eq!(back.status.cluster_status_current, Some(ClusterLifecycle::Active));
        assert_eq!(back.status.cluster_status.len(), 1);
    }

    #[test]
    fn test_failed_update_is_not_written() {
        let dir = TempDir::new().unwrap();
        let shared = SharedConfig::new(config_in(&dir));
        let err = shared
            .update(|_| Err(Error::cross("refused")))
            .unwrap_err();
        assert!(err.is_cross_constraint());
        assert!(!dir.path().join("c1.yaml").exists());
    }

    #[test]
    fn test_concurrent_status_updates() {
        let dir = TempDir::new().unwrap();
        let shared = Arc::new(SharedConfig::new(config_in(&dir)));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for _ in 0..5 {
                        shared.record_status(ClusterLifecycle::Creating).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.read().status.cluster_status.len(), 20);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let dir = TempDir::new().unwrap();
        let shared = Arc::new(SharedConfig::new(config_in(&dir)));
        let poisoner = Arc::clone(&shared);
        let _ = thread::spawn(move || {
            let _guard = poisoner.write();
            panic!("poison");
        })
        .join();
        assert_eq!(shared.read().name, "c1");
        shared.sync().unwrap();
    }
}
