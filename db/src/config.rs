//! Registry configuration.
//!
//! Names the database files to administer and how many rows a listing
//! returns. Each file becomes one registry entry named after its stem.
//!
//! # Example YAML
//!
//! ```yaml
//! databases:
//!   - data/app.db
//!   - /var/lib/reports.db
//! row_limit: 100
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Rows returned by a table listing when the configuration does not say.
pub const DEFAULT_ROW_LIMIT: u64 = 100;

fn default_row_limit() -> u64 {
    DEFAULT_ROW_LIMIT
}

/// Top-level registry configuration.
///
/// # Examples
///
/// ```
/// # use sqlite_admin_db::RegistryConfig;
/// let config: RegistryConfig = serde_yaml::from_str("databases: [a.db, b.db]").unwrap();
/// assert_eq!(config.databases.len(), 2);
/// assert_eq!(config.row_limit, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Database files, in registration order.
    #[serde(default)]
    pub databases: Vec<PathBuf>,
    /// Maximum rows returned by a table listing.
    #[serde(default = "default_row_limit")]
    pub row_limit: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            databases: Vec::new(),
            row_limit: DEFAULT_ROW_LIMIT,
        }
    }
}

impl RegistryConfig {
    /// Creates a configuration for `databases` with the default row limit.
    pub fn new<I, P>(databases: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            databases: databases.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Loads configuration from a YAML file.
    ///
    /// Relative database paths are kept as written; they resolve against
    /// the working directory when the registry opens them.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::RegistryError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::RegistryError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Appends `paths` after the configured databases.
    ///
    /// Paths already listed are skipped, so a file named both in the
    /// configuration and on the command line is registered once.
    pub fn merge_paths<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for path in paths {
            let path = path.into();
            if !self.databases.contains(&path) {
                self.databases.push(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert!(config.databases.is_empty());
        assert_eq!(config.row_limit, DEFAULT_ROW_LIMIT);
    }

    #[test]
    fn test_yaml_with_explicit_limit() {
        let yaml = "databases:\n  - one.db\n  - dir/two.sqlite\nrow_limit: 25\n";
        let config: RegistryConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.databases,
            vec![PathBuf::from("one.db"), PathBuf::from("dir/two.sqlite")]
        );
        assert_eq!(config.row_limit, 25);
    }

    #[test]
    fn test_empty_document_fields_default() {
        let config: RegistryConfig = serde_yaml::from_str("row_limit: 5").unwrap();
        assert!(config.databases.is_empty());
        assert_eq!(config.row_limit, 5);
    }

    #[test]
    fn test_merge_paths_skips_duplicates() {
        let mut config = RegistryConfig::new(["a.db"]);
        config.merge_paths(["b.db", "a.db", "c.db"]);
        assert_eq!(
            config.databases,
            vec![
                PathBuf::from("a.db"),
                PathBuf::from("b.db"),
                PathBuf::from("c.db")
            ]
        );
    }
}
