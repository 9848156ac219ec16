//! Fixed record layout of a galaxy catalog
//!
//! The producer dumps its output struct verbatim, so the on-disk record is
//! the C layout of that struct: each field aligned to its own scalar
//! alignment, the total rounded up to the widest alignment in the record.
//!
//! ```text
//! offset  field
//! 0       SnapNum               i32
//! 4       Type                  i32
//! 8       GalaxyIndex           i64
//! 16      CentralGalaxyIndex    i64
//! 24      SAGEHaloIndex         i32
//! 28      SAGETreeIndex         i32
//! 32      SimulationHaloIndex   i64
//! 40      mergeType ... dT      4 x 4 bytes
//! 56      Pos, Vel, Spin        3 x 12 bytes
//! 92      Len                   i32
//! 96      Mvir ... infallVmax   33 x f32
//! 228     (tail padding)        4 bytes
//! 232     end of record
//! ```
//!
//! All values are little-endian.

use crate::error::{Error, Result};
use crate::field::{FieldId, FieldKind, FieldValue, GalaxyRecord};
use byteorder::{ByteOrder, LittleEndian};
use once_cell::sync::Lazy;

/// Placement of one field inside a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field identifier
    pub id: FieldId,
    /// Encoded kind
    pub kind: FieldKind,
    /// Byte offset from the start of the record
    pub offset: usize,
}

impl FieldSpec {
    /// Encoded width in bytes
    pub const fn width(&self) -> usize {
        self.kind.width()
    }

    /// One past the last byte of this field
    pub const fn end(&self) -> usize {
        self.offset + self.kind.width()
    }
}

/// Ordered field table plus the derived record size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    fields: Vec<FieldSpec>,
    record_size: usize,
    align: usize,
}

static SAGE_LAYOUT: Lazy<RecordLayout> = Lazy::new(|| RecordLayout::from_fields(FieldId::ALL));

fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

impl RecordLayout {
    /// The galaxy output layout
    pub fn sage() -> &'static RecordLayout {
        &SAGE_LAYOUT
    }

    /// Lay out `fields` in order with C struct packing rules
    fn from_fields(fields: &[FieldId]) -> Self {
        let mut offset = 0;
        let mut align = 1;
        let specs = fields
            .iter()
            .map(|&id| {
                let kind = id.kind();
                align = align.max(kind.align());
                offset = align_up(offset, kind.align());
                let spec = FieldSpec { id, kind, offset };
                offset += kind.width();
                spec
            })
            .collect();

        RecordLayout {
            fields: specs,
            record_size: align_up(offset, align),
            align,
        }
    }

    /// Size of one encoded record, including padding
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Widest alignment in the record
    pub fn align(&self) -> usize {
        self.align
    }

    /// Field table in on-disk order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Placement of `id`
    pub fn spec(&self, id: FieldId) -> &FieldSpec {
        &self.fields[id.index()]
    }

    /// Decode one record.
    ///
    /// `bytes` must be exactly `record_size()` long.
    pub fn decode(&self, bytes: &[u8]) -> Result<GalaxyRecord> {
        if bytes.len() != self.record_size {
            return Err(Error::MalformedRecord {
                expected: self.record_size,
                actual: bytes.len(),
            });
        }

        let mut record = GalaxyRecord::default();
        for spec in &self.fields {
            let raw = &bytes[spec.offset..spec.end()];
            let value = match spec.kind {
                FieldKind::I32 => FieldValue::I32(LittleEndian::read_i32(raw)),
                FieldKind::I64 => FieldValue::I64(LittleEndian::read_i64(raw)),
                FieldKind::F32 => FieldValue::F32(LittleEndian::read_f32(raw)),
                FieldKind::Vec3 => {
                    let mut v = [0f32; 3];
                    LittleEndian::read_f32_into(raw, &mut v);
                    FieldValue::Vec3(v)
                }
            };
            record.set(spec.id, value)?;
        }
        Ok(record)
    }

    /// Decode a run of back-to-back records
    pub fn decode_batch(&self, bytes: &[u8]) -> Result<Vec<GalaxyRecord>> {
        let chunks = bytes.chunks_exact(self.record_size);
        let rest = chunks.remainder().len();
        if rest != 0 {
            return Err(Error::MalformedRecord {
                expected: self.record_size,
                actual: rest,
            });
        }
        chunks.map(|chunk| self.decode(chunk)).collect()
    }

    /// Encode one record into `out`; padding bytes are zeroed.
    pub fn encode_into(&self, record: &GalaxyRecord, out: &mut [u8]) -> Result<()> {
        if out.len() != self.record_size {
            return Err(Error::MalformedRecord {
                expected: self.record_size,
                actual: out.len(),
            });
        }

        out.fill(0);
        for spec in &self.fields {
            let raw = &mut out[spec.offset..spec.end()];
            match record.get(spec.id) {
                FieldValue::I32(v) => LittleEndian::write_i32(raw, v),
                FieldValue::I64(v) => LittleEndian::write_i64(raw, v),
                FieldValue::F32(v) => LittleEndian::write_f32(raw, v),
                FieldValue::Vec3(v) => LittleEndian::write_f32_into(&v, raw),
            }
        }
        Ok(())
    }

    /// Encode one record
    pub fn encode(&self, record: &GalaxyRecord) -> Vec<u8> {
        let mut out = vec![0u8; self.record_size];
        // `out` is sized from the layout, so this cannot fail
        let _ = self.encode_into(record, &mut out);
        out
    }
}
