//! File-backed simulated catalog
//!
//! ```text
//! <root>/
//! ├── types/
//! │   └── tests.device_info.json
//! └── entities/
//!     └── 3fa85f64-5717-4562-b3fc-2c963f66afa6.json
//! ```
//!
//! Files are written before the in-memory state is updated, so a failed write
//! leaves the catalog unchanged. Each document goes to a hidden `.tmp` sibling
//! first and is renamed into place, so a crash never leaves a truncated
//! `.json` behind.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::memory::InMemoryCatalog;
use super::{CatalogClient, EntityId, TypeHandle};
use crate::error::Result;
use crate::schema::EntityTypeDefinition;
use crate::serializer::{serialize_instance, serialize_instance_with, serialize_type_with, OutputFormat};

/// Catalog persisted as JSON documents under a root directory
#[derive(Debug)]
pub struct DirectoryCatalog {
    root: PathBuf,
    format: OutputFormat,
    state: InMemoryCatalog,
}

impl DirectoryCatalog {
    /// Open an existing catalog directory or create a new one
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, OutputFormat::Pretty)
    }

    /// Open a catalog directory, writing documents in `format`
    pub fn open_with(path: impl AsRef<Path>, format: OutputFormat) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        fs::create_dir_all(root.join("types"))?;
        fs::create_dir_all(root.join("entities"))?;

        let mut catalog = Self {
            root,
            format,
            state: InMemoryCatalog::new(),
        };
        catalog.load()?;

        info!(
            root = %catalog.root.display(),
            types = catalog.state.type_names().len(),
            entities = catalog.state.entity_count(),
            "opened catalog directory"
        );
        Ok(catalog)
    }

    /// Get the root path of the catalog
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a registered definition
    pub fn definition(&self, type_name: &str) -> Option<&EntityTypeDefinition> {
        self.state.definition(type_name)
    }

    /// Number of stored entities
    pub fn entity_count(&self) -> usize {
        self.state.entity_count()
    }

    fn type_path(&self, type_name: &str) -> PathBuf {
        self.root.join("types").join(format!("{}.json", type_name))
    }

    fn entity_path(&self, id: &EntityId) -> PathBuf {
        self.root.join("entities").join(format!("{}.json", id))
    }

    /// Load all documents from disk
    fn load(&mut self) -> Result<()> {
        for path in json_files(&self.root.join("types"))? {
            let content = fs::read_to_string(&path)?;
            let (definition, _) = self.state.prepare_type(&content)?;
            self.state.commit_type(definition);
        }

        for path in json_files(&self.root.join("entities"))? {
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| EntityId::parse(s).ok())
            else {
                warn!(path = %path.display(), "skipping entity file without an id name");
                continue;
            };
            let content = fs::read_to_string(&path)?;
            let instance = self.state.prepare_entity(&content)?;
            let created_at = fs::metadata(&path)
                .and_then(|m| m.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            self.state.commit_entity(id, instance, created_at);
        }

        Ok(())
    }
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "json") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Replace `path` with `content` in one rename
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");
    let staging = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&staging, content)?;
    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(e.into());
    }
    Ok(())
}

impl CatalogClient for DirectoryCatalog {
    fn type_names(&self) -> Vec<String> {
        self.state.type_names()
    }

    fn register_type(&mut self, definition_text: &str) -> Result<TypeHandle> {
        let (definition, is_new) = self.state.prepare_type(definition_text)?;
        if !is_new {
            debug!(type_name = definition.type_name(), "type already registered");
            return Ok(TypeHandle {
                type_name: definition.type_name().to_string(),
                checksum: definition.checksum(),
            });
        }

        let content = serialize_type_with(&definition, self.format)?;
        write_atomic(&self.type_path(definition.type_name()), &content)?;
        Ok(self.state.commit_type(definition))
    }

    fn create_entity(&mut self, instance_text: &str) -> Result<EntityId> {
        let instance = self.state.prepare_entity(instance_text)?;
        let id = EntityId::new();

        let content = serialize_instance_with(&instance, self.format)?;
        write_atomic(&self.entity_path(&id), &content)?;
        self.state.commit_entity(id, instance, Utc::now());
        Ok(id)
    }

    fn get_entity(&self, id: &EntityId) -> Result<String> {
        serialize_instance(&self.state.stored(id)?.instance)
    }
}
