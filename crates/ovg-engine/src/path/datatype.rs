//! Coordinate storage in the path's declared datatype.
//!
//! Values are kept in their raw encoded form; the decoded user-space value is
//! `raw * scale + bias`.

use crate::error::{VgError, VgResult};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PathDatatype {
    S8,
    S16,
    S32,
    F32,
}

impl PathDatatype {
    #[inline]
    pub const fn byte_size(self) -> usize {
        match self {
            PathDatatype::S8 => 1,
            PathDatatype::S16 => 2,
            PathDatatype::S32 | PathDatatype::F32 => 4,
        }
    }
}

/// Raw coordinates of one datatype.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordBuffer {
    S8(Vec<i8>),
    S16(Vec<i16>),
    S32(Vec<i32>),
    F32(Vec<f32>),
}

impl CoordBuffer {
    pub fn with_capacity(datatype: PathDatatype, capacity: usize) -> Self {
        match datatype {
            PathDatatype::S8 => CoordBuffer::S8(Vec::with_capacity(capacity)),
            PathDatatype::S16 => CoordBuffer::S16(Vec::with_capacity(capacity)),
            PathDatatype::S32 => CoordBuffer::S32(Vec::with_capacity(capacity)),
            PathDatatype::F32 => CoordBuffer::F32(Vec::with_capacity(capacity)),
        }
    }

    pub fn datatype(&self) -> PathDatatype {
        match self {
            CoordBuffer::S8(_) => PathDatatype::S8,
            CoordBuffer::S16(_) => PathDatatype::S16,
            CoordBuffer::S32(_) => PathDatatype::S32,
            CoordBuffer::F32(_) => PathDatatype::F32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CoordBuffer::S8(v) => v.len(),
            CoordBuffer::S16(v) => v.len(),
            CoordBuffer::S32(v) => v.len(),
            CoordBuffer::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }

    pub fn truncate(&mut self, len: usize) {
        match self {
            CoordBuffer::S8(v) => v.truncate(len),
            CoordBuffer::S16(v) => v.truncate(len),
            CoordBuffer::S32(v) => v.truncate(len),
            CoordBuffer::F32(v) => v.truncate(len),
        }
    }

    /// Raw value at `i` widened to `f32`.
    pub fn raw(&self, i: usize) -> f32 {
        match self {
            CoordBuffer::S8(v) => v[i] as f32,
            CoordBuffer::S16(v) => v[i] as f32,
            CoordBuffer::S32(v) => v[i] as f32,
            CoordBuffer::F32(v) => v[i],
        }
    }

    /// Decoded value at `i`.
    #[inline]
    pub fn value(&self, i: usize, scale: f32, bias: f32) -> f32 {
        self.raw(i) * scale + bias
    }

    /// Encodes `value` and appends it. Integer types round to nearest and
    /// saturate at the type's range.
    pub fn push_value(&mut self, value: f32, scale: f32, bias: f32) {
        let raw = (value - bias) / scale;
        match self {
            CoordBuffer::S8(v) => v.push(round_raw(raw) as i8),
            CoordBuffer::S16(v) => v.push(round_raw(raw) as i16),
            CoordBuffer::S32(v) => v.push(round_raw(raw) as i32),
            CoordBuffer::F32(v) => v.push(raw),
        }
    }

    /// Encodes `value` over the existing entry at `i`.
    pub fn set_value(&mut self, i: usize, value: f32, scale: f32, bias: f32) {
        let raw = (value - bias) / scale;
        match self {
            CoordBuffer::S8(v) => v[i] = round_raw(raw) as i8,
            CoordBuffer::S16(v) => v[i] = round_raw(raw) as i16,
            CoordBuffer::S32(v) => v[i] = round_raw(raw) as i32,
            CoordBuffer::F32(v) => v[i] = raw,
        }
    }

    /// Decodes `count` little-endian raw values of `datatype` from `bytes`.
    pub fn from_le_bytes(datatype: PathDatatype, bytes: &[u8], count: usize) -> VgResult<Self> {
        let size = datatype.byte_size();
        let needed = count
            .checked_mul(size)
            .ok_or(VgError::IllegalArgument("coordinate count overflow"))?;
        if bytes.len() < needed {
            return Err(VgError::IllegalArgument("not enough coordinate data"));
        }

        let chunks = bytes[..needed].chunks_exact(size);
        Ok(match datatype {
            PathDatatype::S8 => CoordBuffer::S8(chunks.map(|c| c[0] as i8).collect()),
            PathDatatype::S16 => {
                CoordBuffer::S16(chunks.map(|c| i16::from_le_bytes([c[0], c[1]])).collect())
            }
            PathDatatype::S32 => CoordBuffer::S32(
                chunks
                    .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
            PathDatatype::F32 => CoordBuffer::F32(
                chunks
                    .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect(),
            ),
        })
    }

    /// True when every decoded value is finite.
    pub fn all_finite(&self, scale: f32, bias: f32) -> bool {
        (0..self.len()).all(|i| self.value(i, scale, bias).is_finite())
    }

    /// Moves the values of `other` onto the end of this buffer.
    pub fn append(&mut self, other: CoordBuffer) -> VgResult<()> {
        match (self, other) {
            (CoordBuffer::S8(a), CoordBuffer::S8(b)) => a.extend(b),
            (CoordBuffer::S16(a), CoordBuffer::S16(b)) => a.extend(b),
            (CoordBuffer::S32(a), CoordBuffer::S32(b)) => a.extend(b),
            (CoordBuffer::F32(a), CoordBuffer::F32(b)) => a.extend(b),
            _ => return Err(VgError::IllegalArgument("coordinate datatype mismatch")),
        }
        Ok(())
    }
}

#[inline]
fn round_raw(raw: f32) -> f32 {
    (raw + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_encoding_applies_scale_and_bias() {
        let mut buf = CoordBuffer::with_capacity(PathDatatype::F32, 1);
        buf.push_value(10.0, 2.0, 4.0);
        assert_eq!(buf.raw(0), 3.0);
        assert_eq!(buf.value(0, 2.0, 4.0), 10.0);
    }

    #[test]
    fn integer_encoding_rounds_half_up() {
        let mut buf = CoordBuffer::with_capacity(PathDatatype::S16, 3);
        buf.push_value(2.5, 1.0, 0.0);
        buf.push_value(-2.5, 1.0, 0.0);
        buf.push_value(0.49, 1.0, 0.0);
        assert_eq!(buf, CoordBuffer::S16(vec![3, -2, 0]));
    }

    #[test]
    fn s8_saturates() {
        let mut buf = CoordBuffer::with_capacity(PathDatatype::S8, 2);
        buf.push_value(1000.0, 1.0, 0.0);
        buf.push_value(-1000.0, 1.0, 0.0);
        assert_eq!(buf, CoordBuffer::S8(vec![127, -128]));
    }

    #[test]
    fn le_bytes_decode_per_datatype() {
        let s16 = CoordBuffer::from_le_bytes(PathDatatype::S16, &[0x01, 0x00, 0xff, 0xff], 2).unwrap();
        assert_eq!(s16, CoordBuffer::S16(vec![1, -1]));

        let f = CoordBuffer::from_le_bytes(PathDatatype::F32, &1.5f32.to_le_bytes(), 1).unwrap();
        assert_eq!(f.raw(0), 1.5);
    }

    #[test]
    fn short_byte_slice_is_rejected() {
        assert!(CoordBuffer::from_le_bytes(PathDatatype::S32, &[0; 6], 2).is_err());
        assert!(CoordBuffer::from_le_bytes(PathDatatype::S32, &[0; 8], 2).is_ok());
    }

    #[test]
    fn finiteness_is_checked_after_scale() {
        let raw = CoordBuffer::F32(vec![1.0, f32::NAN]);
        assert!(!raw.all_finite(1.0, 0.0));
        let big = CoordBuffer::S32(vec![i32::MAX]);
        assert!(big.all_finite(1.0, 0.0));
        assert!(!big.all_finite(f32::MAX, 0.0));
    }

    #[test]
    fn append_requires_matching_datatype() {
        let mut buf = CoordBuffer::S16(vec![1]);
        buf.append(CoordBuffer::S16(vec![2, 3])).unwrap();
        assert_eq!(buf, CoordBuffer::S16(vec![1, 2, 3]));
        assert!(buf.append(CoordBuffer::S8(vec![4])).is_err());
        assert_eq!(buf.len(), 3);
    }
}
