//! Random-access catalog reader
//!
//! `CatalogFile` reads the header once, derives the offset table, and then
//! serves any tree with a single positioned read. Positioned reads never
//! touch a shared cursor, so one `CatalogFile` can be read from several
//! threads at once and in any order.
//!
//! ## Usage
//!
//! ```ignore
//! let catalog = CatalogFile::open("model_z0.000_0")?;
//! for tree in 0..catalog.header().tree_count() {
//!     let batch = catalog.read_tree(tree)?;
//!     // ...
//! }
//! ```

use crate::header::{check_file_size, CatalogHeader, SizeCheck};
use crate::offsets::{OffsetTable, TreeExtent};
use crate::pread::read_full_at;
use crate::source::{TreeBatch, TreeSource};
use sage_core::{Error, GalaxyRecord, RecordLayout, Result};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Counters of positioned reads issued by a [`CatalogFile`]
#[derive(Debug, Default)]
pub struct ReadStats {
    reads: AtomicU64,
    bytes_read: AtomicU64,
}

impl ReadStats {
    fn record(&self, bytes: usize) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Positioned reads issued for tree data
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Bytes returned by those reads
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }
}

/// Header-level facts about a catalog file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    /// File path
    pub path: String,
    /// Number of trees
    pub tree_count: usize,
    /// Total galaxies
    pub total_galaxies: u64,
    /// Trees with no galaxies
    pub empty_trees: usize,
    /// Record size in bytes
    pub record_size: usize,
    /// Header size in bytes
    pub header_size: u64,
    /// Size a well-formed file with this header has
    pub expected_size: u64,
    /// Size on disk
    pub file_size: u64,
}

impl CatalogSummary {
    /// Whether the file is shorter than its header requires
    pub fn is_truncated(&self) -> bool {
        self.file_size < self.expected_size
    }
}

/// Catalog opened for random access
#[derive(Debug)]
pub struct CatalogFile {
    path: PathBuf,
    name: String,
    file: File,
    file_size: u64,
    size_check: SizeCheck,
    header: CatalogHeader,
    offsets: OffsetTable,
    layout: &'static RecordLayout,
    stats: ReadStats,
}

impl CatalogFile {
    /// Open a catalog and read its header.
    ///
    /// A zero-byte file is `EmptyFile`; inconsistent counts are
    /// `CorruptHeader`. A file shorter than the header requires opens fine;
    /// the trees past the end fail with `TruncatedFile` when read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let name = path.display().to_string();
        let file = File::open(&path)?;
        let file_size = file.metadata()?.len();
        if file_size == 0 {
            return Err(Error::EmptyFile(name));
        }

        // `&File` reads move this handle's own cursor only; tree reads below
        // are positioned and ignore it.
        let header = CatalogHeader::read_from(&mut BufReader::new(&file), &name)?;
        let layout = RecordLayout::sage();
        let offsets = OffsetTable::new(&header, layout.record_size());

        let size_check = check_file_size(&name, &header, layout.record_size(), file_size);

        debug!(
            path = %name,
            trees = header.tree_count(),
            galaxies = header.total_galaxies(),
            file_size,
            "Opened catalog for random access"
        );

        Ok(CatalogFile {
            path,
            name,
            file,
            file_size,
            size_check,
            header,
            offsets,
            layout,
            stats: ReadStats::default(),
        })
    }

    /// File path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed header
    pub fn header(&self) -> &CatalogHeader {
        &self.header
    }

    /// Offset table derived from the header
    pub fn offsets(&self) -> &OffsetTable {
        &self.offsets
    }

    /// Record layout in use
    pub fn layout(&self) -> &'static RecordLayout {
        self.layout
    }

    /// Size on disk at open time
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// File length against the header, as found at open time
    pub fn size_check(&self) -> SizeCheck {
        self.size_check
    }

    /// Read counters
    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    /// Extent of `index`, or `IndexOutOfRange`
    pub fn extent(&self, index: usize) -> Result<TreeExtent> {
        self.offsets.extent(index).ok_or(Error::IndexOutOfRange {
            index,
            tree_count: self.header.tree_count(),
        })
    }

    /// Decode tree `index` with one positioned read.
    ///
    /// Trees with no galaxies return an empty batch without touching the file.
    /// A tree reaching past the end of the file fails before any buffer is
    /// allocated.
    pub fn read_tree(&self, index: usize) -> Result<TreeBatch> {
        let extent = self.extent(index)?;
        if extent.is_empty() {
            return Ok(TreeBatch::empty(index));
        }

        let available = self.file_size.saturating_sub(extent.offset);
        if available < extent.byte_len {
            return Err(Error::truncated(
                format!("tree {}", index),
                extent.offset,
                extent.byte_len,
                available,
            ));
        }

        let mut buf = vec![0u8; extent.byte_len as usize];
        let got = read_full_at(&self.file, &mut buf, extent.offset)?;
        self.stats.record(got);
        trace!(
            path = %self.name,
            tree = index,
            offset = extent.offset,
            bytes = got,
            "Positioned tree read"
        );

        if got < buf.len() {
            return Err(Error::truncated(
                format!("tree {}", index),
                extent.offset,
                extent.byte_len,
                got as u64,
            ));
        }

        let records = self.layout.decode_batch(&buf)?;
        Ok(TreeBatch::new(index, records))
    }

    /// Iterate over every tree in index order
    pub fn trees(&self) -> impl Iterator<Item = Result<TreeBatch>> + '_ {
        (0..self.header.tree_count()).map(move |i| self.read_tree(i))
    }

    /// Decode every galaxy of the catalog, trees concatenated in order
    pub fn read_all(&self) -> Result<Vec<GalaxyRecord>> {
        let on_disk = self.file_size.saturating_sub(self.header.header_size())
            / self.layout.record_size() as u64;
        let mut all = Vec::with_capacity(self.header.total_galaxies().min(on_disk) as usize);
        for batch in self.trees() {
            all.extend(batch?.into_records());
        }
        Ok(all)
    }

    /// Header-level facts for reporting
    pub fn summary(&self) -> CatalogSummary {
        let record_size = self.layout.record_size();
        CatalogSummary {
            path: self.name.clone(),
            tree_count: self.header.tree_count(),
            total_galaxies: self.header.total_galaxies(),
            empty_trees: self.header.empty_trees(),
            record_size,
            header_size: self.header.header_size(),
            expected_size: self.header.expected_file_size(record_size),
            file_size: self.file_size,
        }
    }
}

impl TreeSource for CatalogFile {
    fn header(&self) -> &CatalogHeader {
        &self.header
    }

    fn record_size(&self) -> usize {
        self.layout.record_size()
    }

    fn describe(&self) -> &str {
        &self.name
    }

    fn read_tree(&mut self, index: usize) -> Result<TreeBatch> {
        CatalogFile::read_tree(self, index)
    }
}
