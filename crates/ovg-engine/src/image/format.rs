use crate::error::{VgError, VgResult};

/// Internal texel: straight-alpha RGBA8 in sRGB encoding.
pub type Texel = [u8; 4];

/// External pixel layouts accepted by image upload and read-back.
///
/// Multi-byte packed formats (565, 5551, 4444) are little-endian `u16`
/// words with red in the high bits.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ImageFormat {
    SRgbx8888,
    SRgba8888,
    SRgba8888Pre,
    SRgb565,
    SRgba5551,
    SRgba4444,
    SL8,
    LRgbx8888,
    LRgba8888,
    LRgba8888Pre,
    LL8,
    A8,
    Bw1,
    A1,
    A4,
}

impl ImageFormat {
    pub const SUPPORTED: [ImageFormat; 12] = [
        ImageFormat::SRgbx8888,
        ImageFormat::SRgba8888,
        ImageFormat::SRgba8888Pre,
        ImageFormat::SRgb565,
        ImageFormat::SRgba5551,
        ImageFormat::SRgba4444,
        ImageFormat::SL8,
        ImageFormat::LRgbx8888,
        ImageFormat::LRgba8888,
        ImageFormat::LRgba8888Pre,
        ImageFormat::LL8,
        ImageFormat::A8,
    ];

    /// Bytes per pixel, or `None` for sub-byte formats.
    pub fn bytes_per_pixel(self) -> Option<usize> {
        use ImageFormat::*;
        match self {
            SRgbx8888 | SRgba8888 | SRgba8888Pre | LRgbx8888 | LRgba8888 | LRgba8888Pre => Some(4),
            SRgb565 | SRgba5551 | SRgba4444 => Some(2),
            SL8 | LL8 | A8 => Some(1),
            Bw1 | A1 | A4 => None,
        }
    }

    #[inline]
    pub fn is_supported(self) -> bool {
        self.bytes_per_pixel().is_some()
    }

    pub(crate) fn require_supported(self) -> VgResult<usize> {
        self.bytes_per_pixel().ok_or(VgError::UnsupportedFormat)
    }

    #[inline]
    fn is_premultiplied(self) -> bool {
        matches!(self, ImageFormat::SRgba8888Pre | ImageFormat::LRgba8888Pre)
    }
}

// ── transfer functions ──

fn srgb_to_linear(v: u8) -> f32 {
    let c = v as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> u8 {
    let c = c.clamp(0.0, 1.0);
    let s = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    unit_to_u8(s)
}

#[inline]
fn unit_to_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

#[inline]
fn expand(v: u16, bits: u32) -> u8 {
    let max = (1u32 << bits) - 1;
    ((v as u32 * 255 + max / 2) / max) as u8
}

#[inline]
fn quantize(v: u8, bits: u32) -> u16 {
    let max = (1u32 << bits) - 1;
    ((v as u32 * max + 127) / 255) as u16
}

fn unpremultiply(px: Texel) -> Texel {
    let a = px[3] as u32;
    if a == 0 {
        return [0; 4];
    }
    let un = |c: u8| ((c as u32 * 255 + a / 2) / a).min(255) as u8;
    [un(px[0]), un(px[1]), un(px[2]), px[3]]
}

fn premultiply(px: Texel) -> Texel {
    let a = px[3] as u32;
    let pre = |c: u8| ((c as u32 * a + 127) / 255) as u8;
    [pre(px[0]), pre(px[1]), pre(px[2]), px[3]]
}

fn luminance(px: Texel) -> f32 {
    0.2126 * srgb_to_linear(px[0]) + 0.7152 * srgb_to_linear(px[1]) + 0.0722 * srgb_to_linear(px[2])
}

/// Decodes one pixel of `format` from `src` into a texel.
///
/// `src` must hold at least `format.bytes_per_pixel()` bytes.
pub(crate) fn decode(format: ImageFormat, src: &[u8]) -> Texel {
    use ImageFormat::*;
    let word = || u16::from_le_bytes([src[0], src[1]]);
    match format {
        SRgbx8888 => [src[0], src[1], src[2], 255],
        SRgba8888 => [src[0], src[1], src[2], src[3]],
        SRgba8888Pre => unpremultiply([src[0], src[1], src[2], src[3]]),
        LRgbx8888 | LRgba8888 | LRgba8888Pre => {
            let mut px = [src[0], src[1], src[2], if format == LRgbx8888 { 255 } else { src[3] }];
            if format.is_premultiplied() {
                px = unpremultiply(px);
            }
            let enc = |c: u8| linear_to_srgb(c as f32 / 255.0);
            [enc(px[0]), enc(px[1]), enc(px[2]), px[3]]
        }
        SRgb565 => {
            let w = word();
            [expand(w >> 11, 5), expand((w >> 5) & 0x3f, 6), expand(w & 0x1f, 5), 255]
        }
        SRgba5551 => {
            let w = word();
            [
                expand(w >> 11, 5),
                expand((w >> 6) & 0x1f, 5),
                expand((w >> 1) & 0x1f, 5),
                if w & 1 != 0 { 255 } else { 0 },
            ]
        }
        SRgba4444 => {
            let w = word();
            [expand(w >> 12, 4), expand((w >> 8) & 0xf, 4), expand((w >> 4) & 0xf, 4), expand(w & 0xf, 4)]
        }
        SL8 => [src[0], src[0], src[0], 255],
        LL8 => {
            let l = linear_to_srgb(src[0] as f32 / 255.0);
            [l, l, l, 255]
        }
        A8 => [255, 255, 255, src[0]],
        // Filtered by `require_supported` before any decode.
        Bw1 | A1 | A4 => [0; 4],
    }
}

/// Encodes a texel as one pixel of `format` into `dst`.
pub(crate) fn encode(format: ImageFormat, px: Texel, dst: &mut [u8]) {
    use ImageFormat::*;
    match format {
        SRgbx8888 => {
            let mut out = px;
            out[3] = 255;
            write_texel(dst, &out);
        }
        SRgba8888 => write_texel(dst, &px),
        SRgba8888Pre => write_texel(dst, &premultiply(px)),
        LRgbx8888 | LRgba8888 | LRgba8888Pre => {
            let dec = |c: u8| unit_to_u8(srgb_to_linear(c));
            let mut out = [dec(px[0]), dec(px[1]), dec(px[2]), px[3]];
            if format == LRgbx8888 {
                out[3] = 255;
            }
            if format.is_premultiplied() {
                out = premultiply(out);
            }
            write_texel(dst, &out);
        }
        SRgb565 => write_u16(
            dst,
            (quantize(px[0], 5) << 11) | (quantize(px[1], 6) << 5) | quantize(px[2], 5),
        ),
        SRgba5551 => write_u16(
            dst,
            (quantize(px[0], 5) << 11)
                | (quantize(px[1], 5) << 6)
                | (quantize(px[2], 5) << 1)
                | u16::from(px[3] >= 128),
        ),
        SRgba4444 => write_u16(
            dst,
            (quantize(px[0], 4) << 12)
                | (quantize(px[1], 4) << 8)
                | (quantize(px[2], 4) << 4)
                | quantize(px[3], 4),
        ),
        SL8 => dst[0] = linear_to_srgb(luminance(px)),
        LL8 => dst[0] = unit_to_u8(luminance(px)),
        A8 => dst[0] = px[3],
        Bw1 | A1 | A4 => {}
    }
}

#[inline]
fn write_texel(dst: &mut [u8], px: &Texel) {
    dst[..4].copy_from_slice(px);
}

#[inline]
fn write_u16(dst: &mut [u8], w: u16) {
    dst[..2].copy_from_slice(&w.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(format: ImageFormat, px: Texel) -> Texel {
        let mut bytes = [0u8; 4];
        encode(format, px, &mut bytes);
        decode(format, &bytes)
    }

    #[test]
    fn rgba8888_is_byte_order_rgba() {
        assert_eq!(decode(ImageFormat::SRgba8888, &[1, 2, 3, 4]), [1, 2, 3, 4]);
        assert_eq!(decode(ImageFormat::SRgbx8888, &[1, 2, 3, 4]), [1, 2, 3, 255]);
        assert_eq!(round_trip(ImageFormat::SRgba8888, [9, 8, 7, 6]), [9, 8, 7, 6]);
    }

    #[test]
    fn rgb565_expands_full_range() {
        assert_eq!(decode(ImageFormat::SRgb565, &0xffffu16.to_le_bytes()), [255, 255, 255, 255]);
        assert_eq!(decode(ImageFormat::SRgb565, &0xf800u16.to_le_bytes()), [255, 0, 0, 255]);
        assert_eq!(round_trip(ImageFormat::SRgb565, [0, 255, 0, 255]), [0, 255, 0, 255]);
    }

    #[test]
    fn packed_alpha_formats() {
        assert_eq!(decode(ImageFormat::SRgba5551, &0x0001u16.to_le_bytes()), [0, 0, 0, 255]);
        assert_eq!(decode(ImageFormat::SRgba4444, &0xf00fu16.to_le_bytes()), [255, 0, 0, 255]);
        assert_eq!(round_trip(ImageFormat::SRgba4444, [255, 0, 255, 0]), [255, 0, 255, 0]);
    }

    #[test]
    fn alpha_and_luminance() {
        assert_eq!(decode(ImageFormat::A8, &[7]), [255, 255, 255, 7]);
        assert_eq!(decode(ImageFormat::SL8, &[40]), [40, 40, 40, 255]);
        assert_eq!(round_trip(ImageFormat::SL8, [200, 200, 200, 255]), [200, 200, 200, 255]);
    }

    #[test]
    fn premultiplied_input_is_unpremultiplied() {
        assert_eq!(decode(ImageFormat::SRgba8888Pre, &[64, 0, 0, 128]), [128, 0, 0, 128]);
        assert_eq!(decode(ImageFormat::SRgba8888Pre, &[10, 10, 10, 0]), [0, 0, 0, 0]);
    }

    #[test]
    fn linear_extremes_survive() {
        assert_eq!(round_trip(ImageFormat::LRgba8888, [255, 0, 255, 200]), [255, 0, 255, 200]);
        assert_eq!(decode(ImageFormat::LL8, &[255]), [255, 255, 255, 255]);
    }

    #[test]
    fn sub_byte_formats_are_unsupported() {
        assert!(!ImageFormat::A1.is_supported());
        assert_eq!(ImageFormat::Bw1.require_supported(), Err(VgError::UnsupportedFormat));
        assert!(ImageFormat::SUPPORTED.iter().all(|f| f.is_supported()));
    }
}
