//! The set of databases a process administers.
//!
//! A [`Registry`] maps short logical names to open [`Database`] handles.
//! Names come from the file stem of each path (`data/app.db` is `app`),
//! membership is fixed once the registry is built, and enumeration follows
//! registration order.
//!
//! # Example
//!
//! ```no_run
//! use sqlite_admin_db::Registry;
//!
//! # async fn demo() -> sqlite_admin_db::Result<()> {
//! let registry = Registry::open(["data/app.db", "data/reports.db"])?;
//! for summary in registry.summaries().await? {
//!     println!("{}: {} tables", summary.name, summary.tables.len());
//! }
//!
//! let app = registry.get("app")?;
//! let rows = app.rows("users", registry.row_limit()).await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sqlite_admin_core::TableDescriptor;
use sqlite_admin_sqlite::Database;
use tracing::info;

use crate::config::{DEFAULT_ROW_LIMIT, RegistryConfig};
use crate::error::{RegistryError, Result};

/// Landing-page data for one registered database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSummary {
    /// Logical name.
    pub name: String,
    /// Tables with their row and column counts.
    pub tables: Vec<TableDescriptor>,
}

#[derive(Debug)]
struct Entry {
    name: String,
    path: PathBuf,
    database: Database,
}

/// Logical-name lookup over a fixed set of open databases.
#[derive(Debug)]
pub struct Registry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    row_limit: u64,
}

impl Registry {
    /// Opens one database per path.
    ///
    /// # Errors
    ///
    /// Fails on the first path that has no file stem
    /// ([`RegistryError::InvalidPath`]), whose stem is already taken
    /// ([`RegistryError::DuplicateName`]) or that cannot be opened
    /// ([`RegistryError::Open`]). No partial registry is returned.
    pub fn open<I, P>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut registry = Self {
            entries: Vec::new(),
            index: HashMap::new(),
            row_limit: DEFAULT_ROW_LIMIT,
        };
        for path in paths {
            registry.register(path.as_ref())?;
        }
        info!(databases = registry.len(), "registry opened");
        Ok(registry)
    }

    /// Opens the databases named by `config` and adopts its row limit.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::open`].
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let mut registry = Self::open(&config.databases)?;
        registry.row_limit = config.row_limit;
        Ok(registry)
    }

    fn register(&mut self, path: &Path) -> Result<()> {
        let name = logical_name(path)?;
        if let Some(&existing) = self.index.get(&name) {
            return Err(RegistryError::DuplicateName {
                name,
                first: self.entries[existing].path.clone(),
                second: path.to_path_buf(),
            });
        }

        let database = Database::open(path).map_err(|source| RegistryError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        info!(name = %name, path = %path.display(), "registered database");

        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(Entry {
            name,
            path: path.to_path_buf(),
            database,
        });
        Ok(())
    }

    /// Looks up a database by logical name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unregistered name.
    pub fn get(&self, name: &str) -> Result<&Database> {
        self.index
            .get(name)
            .map(|&idx| &self.entries[idx].database)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Logical names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Name and database pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Database)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), &entry.database))
    }

    /// Number of registered databases.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no database is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows a table listing should return.
    pub fn row_limit(&self) -> u64 {
        self.row_limit
    }

    /// Every database with its tables and row counts, in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Database`] if any catalog read fails.
    pub async fn summaries(&self) -> Result<Vec<DatabaseSummary>> {
        let mut summaries = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            summaries.push(DatabaseSummary {
                name: entry.name.clone(),
                tables: entry.database.tables().await?,
            });
        }
        Ok(summaries)
    }
}

/// Derives the logical name of a database file from its stem.
fn logical_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(String::from)
        .ok_or_else(|| RegistryError::InvalidPath(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_name_is_file_stem() {
        assert_eq!(logical_name(Path::new("data/app.db")).unwrap(), "app");
        assert_eq!(logical_name(Path::new("reports")).unwrap(), "reports");
        assert_eq!(logical_name(Path::new("/tmp/a.b.sqlite")).unwrap(), "a.b");
    }

    #[test]
    fn test_logical_name_rejects_stemless_paths() {
        assert!(matches!(
            logical_name(Path::new("/")),
            Err(RegistryError::InvalidPath(_))
        ));
        assert!(matches!(
            logical_name(Path::new("data/..")),
            Err(RegistryError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::open(Vec::<PathBuf>::new()).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.row_limit(), DEFAULT_ROW_LIMIT);
        assert!(matches!(
            registry.get("app"),
            Err(RegistryError::NotFound(name)) if name == "app"
        ));
    }
}
