//! The table registry: tracks every table in creation order and owns
//! the optional on-disk snapshot file.

use std::path::{Path, PathBuf};

use crate::error::{Result, SimpleDbError};
use crate::types::ColumnDef;

use super::snapshot;
use super::table::Table;

/// A collection of tables, optionally backed by a snapshot file on disk.
pub struct Database {
    tables: Vec<Table>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open an in-memory database with no persistence.
    pub fn in_memory() -> Self {
        Self {
            tables: Vec::new(),
            path: None,
        }
    }

    /// Open a database backed by `path`. If the file already exists and
    /// is non-empty, its contents are loaded immediately.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut db = Self {
            tables: Vec::new(),
            path: Some(path.clone()),
        };
        if path.exists() && path.metadata().map(|m| m.len() > 0).unwrap_or(false) {
            db.load()?;
        }
        Ok(db)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.tables.iter().position(|t| t.name == name)
    }

    pub fn create_table(
        &mut self,
        name: impl Into<String>,
        columns: Vec<ColumnDef>,
        if_not_exists: bool,
    ) -> Result<bool> {
        let name = name.into();
        if self.index_of(&name).is_some() {
            if if_not_exists {
                return Ok(false);
            }
            return Err(SimpleDbError::parse(format!(
                "Table '{}' already exists",
                name
            )));
        }
        self.tables.push(Table::new(name, columns));
        Ok(true)
    }

    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        match self.index_of(name) {
            Some(i) => {
                self.tables.remove(i);
                Ok(())
            }
            None => Err(SimpleDbError::table_not_found(name)),
        }
    }

    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.index_of(name)
            .map(|i| &self.tables[i])
            .ok_or_else(|| SimpleDbError::table_not_found(name))
    }

    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        match self.index_of(name) {
            Some(i) => Ok(&mut self.tables[i]),
            None => Err(SimpleDbError::table_not_found(name)),
        }
    }

    pub fn list_tables(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Overwrite the snapshot file with the database's current contents.
    /// A no-op when no persistence path was configured.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        snapshot::save(path, &self.tables)
    }

    fn load(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        self.tables = snapshot::load(&path)?;
        Ok(())
    }
}
