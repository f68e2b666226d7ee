//! Draft store persisted to a YAML file.
//!
//! Every completed mutation is written to disk before it becomes visible, so
//! a crashed session can resume from the last good draft.

use super::{DraftStore, MemoryStore};
use crate::draft::{Category, Draft, DraftError, Field, FieldValue};
use log::*;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

/// Draft store that mirrors its draft to a file.
///
pub struct FileStore {
    inner: MemoryStore,
    path: PathBuf,
}

impl FileStore {
    /// Open the store at the given path, loading the saved draft if the file
    /// exists or starting a fresh draft of the category otherwise.
    ///
    pub fn open(path: impl Into<PathBuf>, category: Category) -> Result<Self, DraftError> {
        let path = path.into();
        let draft = match FileStore::load(&path)? {
            Some(draft) => {
                info!(
                    "Recovered {} draft from {}",
                    draft.category(),
                    path.display()
                );
                draft
            }
            None => Draft::new(category),
        };
        Ok(FileStore {
            inner: MemoryStore::with_draft(draft),
            path,
        })
    }

    /// Read a saved draft, returning None when no file exists.
    ///
    pub fn load(path: &Path) -> Result<Option<Draft>, DraftError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path).map_err(|e| DraftError::LoadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let draft: Draft = serde_yaml::from_str(&contents)
            .map_err(|e| DraftError::DeserializationFailed(e.to_string()))?;
        Ok(Some(draft))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the saved file, keeping the in-memory draft.
    ///
    pub fn discard(&mut self) -> Result<(), DraftError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| DraftError::PersistFailed {
                path: self.path.clone(),
                source: e,
            })?;
            debug!("Removed saved draft {}", self.path.display());
        }
        Ok(())
    }

    /// Serialize the draft and write it to disk.
    ///
    fn persist(&self, draft: &Draft) -> Result<(), DraftError> {
        let content = serde_yaml::to_string(draft)
            .map_err(|e| DraftError::SerializationFailed(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| DraftError::PersistFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        // Write beside the target and rename over it so a torn write never
        // replaces the last good draft
        let tmp = tmp_path(&self.path);
        let persist_failed = |source| DraftError::PersistFailed {
            path: self.path.clone(),
            source,
        };
        let mut file = fs::File::create(&tmp).map_err(persist_failed)?;
        file.write_all(content.as_bytes()).map_err(persist_failed)?;
        file.sync_all().map_err(persist_failed)?;
        fs::rename(&tmp, &self.path).map_err(persist_failed)?;
        Ok(())
    }

    /// Apply a change to a copy, persist it, then commit it in memory.
    ///
    fn commit<F>(&mut self, change: F) -> Result<(), DraftError>
    where
        F: FnOnce(&mut MemoryStore) -> Result<(), DraftError>,
    {
        let mut next = self.inner.clone();
        change(&mut next)?;
        self.persist(next.draft())?;
        self.inner = next;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => "tmp".to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

impl DraftStore for FileStore {
    fn get(&self) -> Draft {
        self.inner.get()
    }

    fn set(&mut self, field: Field, value: FieldValue) -> Result<(), DraftError> {
        self.commit(|store| store.set(field, value))
    }

    fn replace_all(&mut self, draft: Draft) -> Result<(), DraftError> {
        self.commit(|store| store.replace_all(draft))
    }

    fn reset_fields(&mut self, fields: &[Field]) -> Result<(), DraftError> {
        self.commit(|store| store.reset_fields(fields))
    }
}
