//! Forward-only catalog reader
//!
//! Consumes the header and then each tree's bytes straight off a stream, in
//! index order, without seeking. This is the access pattern of full-catalog
//! sweeps and works on any `Read`, including pipes and in-memory buffers.
//! A tree once passed cannot be re-read.

use crate::header::{check_file_size, read_full, CatalogHeader, SizeCheck};
use crate::offsets::OffsetTable;
use crate::source::{TreeBatch, TreeSource};
use sage_core::{Error, GalaxyRecord, RecordLayout, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, trace};

/// Catalog opened for a single in-order pass
#[derive(Debug)]
pub struct SequentialCatalog<R> {
    source: String,
    reader: R,
    header: CatalogHeader,
    offsets: OffsetTable,
    layout: &'static RecordLayout,
    next_tree: usize,
    failed: bool,
    size_check: Option<SizeCheck>,
}

impl SequentialCatalog<BufReader<File>> {
    /// Open a catalog file for one sequential pass
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        if file_size == 0 {
            return Err(Error::EmptyFile(name));
        }
        let mut catalog = Self::from_reader_named(BufReader::new(file), name)?;
        catalog.size_check = Some(check_file_size(
            &catalog.source,
            &catalog.header,
            catalog.layout.record_size(),
            file_size,
        ));
        Ok(catalog)
    }
}

impl<R: Read> SequentialCatalog<R> {
    /// Read the header from `reader`; tree data follows on the same stream
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::from_reader_named(reader, "<stream>".to_string())
    }

    /// As [`from_reader`](Self::from_reader), naming the source for messages
    pub fn from_reader_named(mut reader: R, source: String) -> Result<Self> {
        let header = CatalogHeader::read_from(&mut reader, &source)?;
        let layout = RecordLayout::sage();
        let offsets = OffsetTable::new(&header, layout.record_size());

        debug!(
            source = %source,
            trees = header.tree_count(),
            galaxies = header.total_galaxies(),
            "Opened catalog for sequential reading"
        );

        Ok(SequentialCatalog {
            source,
            reader,
            header,
            offsets,
            layout,
            next_tree: 0,
            failed: false,
            size_check: None,
        })
    }

    /// Parsed header
    pub fn header(&self) -> &CatalogHeader {
        &self.header
    }

    /// File length against the header, for catalogs opened from a path.
    ///
    /// Streams have no known length and report `None`.
    pub fn size_check(&self) -> Option<SizeCheck> {
        self.size_check
    }

    /// Index of the next tree the stream will yield
    pub fn next_index(&self) -> usize {
        self.next_tree
    }

    /// Whether every tree has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.next_tree >= self.header.tree_count()
    }

    /// Decode the next tree, or `None` after the last one
    pub fn next_tree(&mut self) -> Result<Option<TreeBatch>> {
        let index = self.next_tree;
        let Some(extent) = self.offsets.extent(index) else {
            return Ok(None);
        };

        if extent.is_empty() {
            self.next_tree += 1;
            return Ok(Some(TreeBatch::empty(index)));
        }

        let mut buf = Vec::new();
        self.reader
            .by_ref()
            .take(extent.byte_len)
            .read_to_end(&mut buf)?;
        trace!(source = %self.source, tree = index, bytes = buf.len(), "Sequential tree read");

        if (buf.len() as u64) < extent.byte_len {
            self.failed = true;
            return Err(Error::truncated(
                format!("tree {}", index),
                extent.offset,
                extent.byte_len,
                buf.len() as u64,
            ));
        }

        self.next_tree += 1;
        let records = self.layout.decode_batch(&buf)?;
        Ok(Some(TreeBatch::new(index, records)))
    }

    /// Decode every remaining galaxy, trees concatenated in order
    pub fn read_all(&mut self) -> Result<Vec<GalaxyRecord>> {
        let mut all = Vec::new();
        while let Some(batch) = self.next_tree()? {
            all.extend(batch.into_records());
        }
        Ok(all)
    }

    /// Check for bytes after the last tree.
    ///
    /// Only meaningful once every tree has been consumed. Returns the number
    /// of trailing bytes, up to `limit`.
    pub fn trailing_bytes(&mut self, limit: usize) -> Result<usize> {
        let mut probe = vec![0u8; limit];
        Ok(read_full(&mut self.reader, &mut probe)?)
    }
}

impl<R: Read> Iterator for SequentialCatalog<R> {
    type Item = Result<TreeBatch>;

    /// Yields each tree once; stops after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_tree() {
            Ok(batch) => batch.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> TreeSource for SequentialCatalog<R> {
    fn header(&self) -> &CatalogHeader {
        &self.header
    }

    fn record_size(&self) -> usize {
        self.layout.record_size()
    }

    fn describe(&self) -> &str {
        &self.source
    }

    fn read_tree(&mut self, index: usize) -> Result<TreeBatch> {
        let tree_count = self.header.tree_count();
        if index >= tree_count {
            return Err(Error::IndexOutOfRange { index, tree_count });
        }
        if index != self.next_tree {
            return Err(Error::NonSequentialAccess {
                expected: self.next_tree,
                requested: index,
            });
        }
        match self.next_tree()? {
            Some(batch) => Ok(batch),
            // unreachable while index < tree_count, kept total
            None => Err(Error::IndexOutOfRange { index, tree_count }),
        }
    }
}
