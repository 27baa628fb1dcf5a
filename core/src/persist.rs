//! Optional on-disk snapshot of one index generation.
//!
//! A directory holds exactly one generation: `index.bin` (bincode) plus a
//! human-readable `meta.json`. Saving replaces whatever was there.

use crate::{IndexError, InvertedIndex, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;

pub const INDEX_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn index(&self) -> PathBuf { self.root.join("index.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn staging(&self) -> PathBuf { self.root.join("index.bin.tmp") }
}

/// Write `index` as the directory's only generation.
///
/// The encoded index goes to a temporary file first and is renamed into
/// place, so a crash leaves either the old generation or the new one.
pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<MetaFile> {
    create_dir_all(&paths.root)?;
    {
        let mut f = BufWriter::new(File::create(paths.staging())?);
        bincode::serialize_into(&mut f, index)?;
        f.flush()?;
    }
    fs::rename(paths.staging(), paths.index())?;

    let meta = MetaFile {
        num_docs: index.num_docs() as u32,
        num_terms: index.num_terms() as u32,
        created_at: time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
        version: INDEX_VERSION,
    };
    save_meta(paths, &meta)?;
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, "index saved");
    Ok(meta)
}

pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let meta = load_meta(paths)?;
    if meta.version != INDEX_VERSION {
        return Err(IndexError::Version { found: meta.version, expected: INDEX_VERSION });
    }
    let f = BufReader::new(File::open(paths.index())?);
    let index: InvertedIndex = bincode::deserialize_from(f)?;
    tracing::info!(root = %paths.root.display(), num_docs = index.num_docs(), "index loaded");
    Ok(index)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}
