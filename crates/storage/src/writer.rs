//! Catalog writer
//!
//! Writes catalogs the same way the model does:
//!
//! 1. A zeroed placeholder header of `T + 2` int32 values
//! 2. Galaxy records appended tree by tree, in tree order
//! 3. Seek back to byte 0 and overwrite the header with the final counts
//!
//! Used for fixtures and for rewriting filtered catalogs.

use crate::header::{header_size_for, CatalogHeader};
use sage_core::{Error, GalaxyRecord, RecordLayout, Result};
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

/// Streaming catalog writer
#[derive(Debug)]
pub struct CatalogWriter<W: Write + Seek> {
    writer: W,
    galaxies_per_tree: Vec<u32>,
    current_tree: usize,
    layout: &'static RecordLayout,
    buf: Vec<u8>,
}

impl CatalogWriter<BufWriter<File>> {
    /// Create (or truncate) a catalog file with `tree_count` trees
    pub fn create<P: AsRef<Path>>(path: P, tree_count: usize) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        debug!(path = %path.as_ref().display(), tree_count, "Creating catalog");
        Self::new(BufWriter::new(file), tree_count)
    }
}

impl<W: Write + Seek> CatalogWriter<W> {
    /// Start a catalog on `writer`, which must be positioned at byte 0
    pub fn new(mut writer: W, tree_count: usize) -> Result<Self> {
        if tree_count > i32::MAX as usize {
            return Err(Error::config(format!(
                "{} trees exceed the int32 tree count",
                tree_count
            )));
        }
        let placeholder = vec![0u8; header_size_for(tree_count) as usize];
        writer.write_all(&placeholder)?;

        let layout = RecordLayout::sage();
        Ok(CatalogWriter {
            writer,
            galaxies_per_tree: vec![0; tree_count],
            current_tree: 0,
            layout,
            buf: vec![0u8; layout.record_size()],
        })
    }

    /// Append one galaxy to `tree`.
    ///
    /// Trees must be written in non-decreasing order.
    pub fn write_galaxy(&mut self, tree: usize, galaxy: &GalaxyRecord) -> Result<()> {
        let tree_count = self.galaxies_per_tree.len();
        if tree >= tree_count {
            return Err(Error::IndexOutOfRange {
                index: tree,
                tree_count,
            });
        }
        if tree < self.current_tree {
            return Err(Error::NonSequentialAccess {
                expected: self.current_tree,
                requested: tree,
            });
        }

        self.layout.encode_into(galaxy, &mut self.buf)?;
        self.writer.write_all(&self.buf)?;
        self.current_tree = tree;
        self.galaxies_per_tree[tree] += 1;
        Ok(())
    }

    /// Append every galaxy of `tree`
    pub fn write_tree(&mut self, tree: usize, galaxies: &[GalaxyRecord]) -> Result<()> {
        for galaxy in galaxies {
            self.write_galaxy(tree, galaxy)?;
        }
        Ok(())
    }

    /// Rewrite the header with the final counts and flush.
    ///
    /// Returns the header and the underlying writer.
    pub fn finish_into_inner(mut self) -> Result<(CatalogHeader, W)> {
        let header = CatalogHeader::new(self.galaxies_per_tree)?;
        self.writer.flush()?;
        self.writer.seek(SeekFrom::Start(0))?;
        header.write_to(&mut self.writer)?;
        self.writer.seek(SeekFrom::End(0))?;
        self.writer.flush()?;
        debug!(
            trees = header.tree_count(),
            galaxies = header.total_galaxies(),
            "Finalized catalog header"
        );
        Ok((header, self.writer))
    }

    /// Rewrite the header with the final counts and flush
    pub fn finish(self) -> Result<CatalogHeader> {
        self.finish_into_inner().map(|(header, _)| header)
    }
}

/// Write `trees` as a catalog file at `path`
pub fn write_catalog<P: AsRef<Path>>(path: P, trees: &[Vec<GalaxyRecord>]) -> Result<CatalogHeader> {
    let mut writer = CatalogWriter::create(path, trees.len())?;
    for (tree, galaxies) in trees.iter().enumerate() {
        writer.write_tree(tree, galaxies)?;
    }
    let (header, buffered) = writer.finish_into_inner()?;
    let file = buffered.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(header)
}

/// Encode `trees` as catalog bytes in memory
pub fn encode_catalog(trees: &[Vec<GalaxyRecord>]) -> Result<Vec<u8>> {
    let mut writer = CatalogWriter::new(Cursor::new(Vec::new()), trees.len())?;
    for (tree, galaxies) in trees.iter().enumerate() {
        writer.write_tree(tree, galaxies)?;
    }
    let (_, cursor) = writer.finish_into_inner()?;
    Ok(cursor.into_inner())
}
