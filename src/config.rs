use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DbRecordConfig {
    /// SQLite database file
    pub database: Option<String>,
    /// Primary key column used when a command doesn't name one
    pub primary_key: Option<String>,
}

impl DbRecordConfig {
    pub fn primary_key_or_default(&self) -> &str {
        self.primary_key
            .as_deref()
            .unwrap_or(crate::record::DEFAULT_PRIMARY_KEY)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("dbrecord.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".dbrecord").join("dbrecord.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<DbRecordConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: DbRecordConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &DbRecordConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbrecord.toml");
        let config = DbRecordConfig {
            database: Some("app.db".to_string()),
            primary_key: Some("uid".to_string()),
        };

        write_config(&path, &config, false).unwrap();
        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.database.as_deref(), Some("app.db"));
        assert_eq!(loaded.primary_key_or_default(), "uid");

        // refuses to clobber without force
        assert!(write_config(&path, &config, false).is_err());
        assert!(write_config(&path, &DbRecordConfig::default(), true).is_ok());
        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.primary_key_or_default(), "id");
    }

    #[test]
    fn test_ensure_db_dir() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = default_database_path_in(dir.path());
        ensure_db_dir(&db_path).unwrap();
        assert!(db_path.parent().unwrap().is_dir());
    }
}
