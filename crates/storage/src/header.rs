//! Catalog file header
//!
//! # File Structure
//!
//! ```text
//! +------------------------+ 0
//! | tree count T    (i32)  |
//! +------------------------+ 4
//! | galaxy count N  (i32)  |
//! +------------------------+ 8
//! | galaxies in tree 0     |
//! | ...             (i32)  | T entries
//! | galaxies in tree T-1   |
//! +------------------------+ 8 + 4T
//! | tree 0 records         |
//! | ...                    |
//! +------------------------+
//! ```
//!
//! All integers are little-endian. `sum(galaxies per tree) == N` must hold.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use sage_core::{Error, Result};
use std::io::{self, Read, Write};
use tracing::warn;

/// Bytes taken by the tree and galaxy counts
pub const HEADER_PREAMBLE_SIZE: u64 = 8;

/// Bytes per per-tree count entry
pub const TREE_COUNT_ENTRY_SIZE: u64 = 4;

/// Parsed catalog header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogHeader {
    total_galaxies: u32,
    galaxies_per_tree: Vec<u32>,
}

impl CatalogHeader {
    /// Build a header from per-tree counts; the total is derived.
    ///
    /// Fails if a count or the total does not fit the on-disk `i32`.
    pub fn new(galaxies_per_tree: Vec<u32>) -> Result<Self> {
        if galaxies_per_tree.len() > i32::MAX as usize {
            return Err(Error::corrupt_header(format!(
                "{} trees exceed the int32 tree count",
                galaxies_per_tree.len()
            )));
        }
        let total: u64 = galaxies_per_tree.iter().map(|&n| n as u64).sum();
        if total > i32::MAX as u64 {
            return Err(Error::corrupt_header(format!(
                "{} galaxies exceed the int32 galaxy count",
                total
            )));
        }
        Ok(CatalogHeader {
            total_galaxies: total as u32,
            galaxies_per_tree,
        })
    }

    /// Validate raw on-disk counts
    pub fn from_raw(tree_count: i32, total_galaxies: i32, galaxies_per_tree: &[i32]) -> Result<Self> {
        if tree_count < 0 {
            return Err(Error::corrupt_header(format!(
                "negative tree count {}",
                tree_count
            )));
        }
        if total_galaxies < 0 {
            return Err(Error::corrupt_header(format!(
                "negative galaxy count {}",
                total_galaxies
            )));
        }
        if galaxies_per_tree.len() != tree_count as usize {
            return Err(Error::corrupt_header(format!(
                "{} per-tree counts for {} trees",
                galaxies_per_tree.len(),
                tree_count
            )));
        }

        let mut counts = Vec::with_capacity(galaxies_per_tree.len());
        let mut sum: u64 = 0;
        for (tree, &n) in galaxies_per_tree.iter().enumerate() {
            if n < 0 {
                return Err(Error::corrupt_header(format!(
                    "tree {} has negative galaxy count {}",
                    tree, n
                )));
            }
            sum += n as u64;
            counts.push(n as u32);
        }

        if sum != total_galaxies as u64 {
            return Err(Error::corrupt_header(format!(
                "per-tree counts sum to {} but header declares {} galaxies",
                sum, total_galaxies
            )));
        }

        Ok(CatalogHeader {
            total_galaxies: total_galaxies as u32,
            galaxies_per_tree: counts,
        })
    }

    /// Read a header from the start of a stream.
    ///
    /// Leaves the stream positioned at the first tree's data. A stream that
    /// yields no bytes at all is `EmptyFile`; one that ends inside the header
    /// is `TruncatedFile`.
    pub fn read_from<R: Read>(reader: &mut R, source: &str) -> Result<Self> {
        let mut preamble = [0u8; HEADER_PREAMBLE_SIZE as usize];
        let got = read_full(reader, &mut preamble)?;
        if got == 0 {
            return Err(Error::EmptyFile(source.to_string()));
        }
        if got < preamble.len() {
            return Err(Error::truncated(
                "header",
                0,
                HEADER_PREAMBLE_SIZE,
                got as u64,
            ));
        }

        let tree_count = LittleEndian::read_i32(&preamble[0..4]);
        let total_galaxies = LittleEndian::read_i32(&preamble[4..8]);
        if tree_count < 0 {
            return Err(Error::corrupt_header(format!(
                "negative tree count {}",
                tree_count
            )));
        }

        let table_len = tree_count as u64 * TREE_COUNT_ENTRY_SIZE;
        // grow as bytes arrive instead of trusting the declared count up front
        let mut table = Vec::new();
        reader.by_ref().take(table_len).read_to_end(&mut table)?;
        if (table.len() as u64) < table_len {
            return Err(Error::truncated(
                "header",
                HEADER_PREAMBLE_SIZE,
                table_len,
                table.len() as u64,
            ));
        }

        let mut counts = vec![0i32; tree_count as usize];
        LittleEndian::read_i32_into(&table, &mut counts);
        Self::from_raw(tree_count, total_galaxies, &counts)
    }

    /// Serialize in on-disk form
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i32::<LittleEndian>(self.tree_count() as i32)?;
        writer.write_i32::<LittleEndian>(self.total_galaxies as i32)?;
        for &n in &self.galaxies_per_tree {
            writer.write_i32::<LittleEndian>(n as i32)?;
        }
        Ok(())
    }

    /// On-disk bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.header_size() as usize);
        // writing into a Vec cannot fail
        let _ = self.write_to(&mut out);
        out
    }

    /// Number of trees `T`
    pub fn tree_count(&self) -> usize {
        self.galaxies_per_tree.len()
    }

    /// Total galaxies `N`
    pub fn total_galaxies(&self) -> u64 {
        self.total_galaxies as u64
    }

    /// Galaxy count of every tree, in tree order
    pub fn galaxies_per_tree(&self) -> &[u32] {
        &self.galaxies_per_tree
    }

    /// Galaxy count of one tree
    pub fn galaxies_in_tree(&self, tree: usize) -> Option<u32> {
        self.galaxies_per_tree.get(tree).copied()
    }

    /// Header size in bytes: `8 + 4T`
    pub fn header_size(&self) -> u64 {
        header_size_for(self.tree_count())
    }

    /// Byte length of a well-formed file with this header
    pub fn expected_file_size(&self, record_size: usize) -> u64 {
        self.header_size() + self.total_galaxies() * record_size as u64
    }

    /// Number of trees with no galaxies
    pub fn empty_trees(&self) -> usize {
        self.galaxies_per_tree.iter().filter(|&&n| n == 0).count()
    }

    /// How `file_size` compares with the size this header declares
    pub fn size_check(&self, record_size: usize, file_size: u64) -> SizeCheck {
        let expected = self.expected_file_size(record_size);
        match file_size.cmp(&expected) {
            std::cmp::Ordering::Equal => SizeCheck::Exact,
            std::cmp::Ordering::Greater => SizeCheck::Trailing(file_size - expected),
            std::cmp::Ordering::Less => SizeCheck::Short(expected - file_size),
        }
    }
}

/// File length against the header's declared size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCheck {
    /// Exactly header plus records
    Exact,
    /// Bytes past the last tree
    Trailing(u64),
    /// Bytes missing from the last trees
    Short(u64),
}

/// Size check at open time; any difference is logged as a warning
pub(crate) fn check_file_size(
    source: &str,
    header: &CatalogHeader,
    record_size: usize,
    file_size: u64,
) -> SizeCheck {
    let expected = header.expected_file_size(record_size);
    let check = header.size_check(record_size, file_size);
    match check {
        SizeCheck::Exact => {}
        SizeCheck::Trailing(_) => warn!(
            path = %source,
            file_size,
            expected,
            "Catalog has trailing bytes after the last tree"
        ),
        SizeCheck::Short(_) => warn!(
            path = %source,
            file_size,
            expected,
            "Catalog is shorter than its header declares"
        ),
    }
    check
}

/// Header size for `tree_count` trees
pub fn header_size_for(tree_count: usize) -> u64 {
    HEADER_PREAMBLE_SIZE + tree_count as u64 * TREE_COUNT_ENTRY_SIZE
}

/// Read a catalog header from a stream
pub fn read_header<R: Read>(reader: &mut R) -> Result<CatalogHeader> {
    CatalogHeader::read_from(reader, "<stream>")
}

/// Fill `buf` from `reader`, stopping early only at end of stream.
///
/// Returns the number of bytes read.
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
