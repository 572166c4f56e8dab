//! One JSON file per collection.
//!
//! # Invariants
//! - Files live at `<dir>/<domain>.json`.
//! - Writes go through a temp file in the same directory and an atomic
//!   rename, so readers never see a half-written document.
//! - A missing or blank file reads as an empty collection.

use super::{ensure_domain, CollectionStore, Document, Domain, StoreError, StoreResult};
use log::debug;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File-per-domain JSON collection store.
#[derive(Debug, Clone)]
pub struct JsonFileCollectionStore {
    dir: PathBuf,
}

impl JsonFileCollectionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, domain: Domain) -> PathBuf {
        self.dir.join(format!("{}.json", domain.as_str()))
    }
}

impl CollectionStore for JsonFileCollectionStore {
    fn read(&self, domain: Domain) -> StoreResult<Document> {
        let path = self.path_for(domain);
        match fs::read_to_string(&path) {
            Ok(body) if body.trim().is_empty() => Ok(Document::empty(domain)),
            Ok(body) => Document::from_json_str(domain, &body),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(
                    "event=store_read module=store status=missing backend=json domain={}",
                    domain
                );
                Ok(Document::empty(domain))
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write(&self, domain: Domain, document: &Document) -> StoreResult<()> {
        ensure_domain(domain, document)?;
        let body = document.to_json_string()?;
        let path = self.path_for(domain);
        let io_error = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let mut staged = NamedTempFile::new_in(&self.dir).map_err(io_error)?;
        staged.write_all(body.as_bytes()).map_err(io_error)?;
        staged.as_file().sync_all().map_err(io_error)?;
        staged
            .persist(&path)
            .map_err(|err| io_error(err.error))?;

        debug!(
            "event=store_write module=store status=ok backend=json domain={} bytes={}",
            domain,
            body.len()
        );
        Ok(())
    }
}
