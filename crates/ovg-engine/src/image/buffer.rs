use super::format::Texel;

/// Region of a pixel buffer in texel coordinates.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Checks an `i32` rectangle against a `width × height` extent.
    ///
    /// Negative offsets, non-positive sizes and regions reaching past the
    /// extent are all rejected.
    pub fn checked(x: i32, y: i32, width: i32, height: i32, extent: (u32, u32)) -> Option<Self> {
        if x < 0 || y < 0 || width <= 0 || height <= 0 {
            return None;
        }
        let (x, y, w, h) = (x as u32, y as u32, width as u32, height as u32);
        let fits_x = x.checked_add(w).is_some_and(|r| r <= extent.0);
        let fits_y = y.checked_add(h).is_some_and(|b| b <= extent.1);
        (fits_x && fits_y).then_some(Self::new(x, y, w, h))
    }

    /// Intersection of an `i32` rectangle with a `width × height` extent;
    /// `None` when nothing is left.
    pub fn clipped(x: i32, y: i32, width: i32, height: i32, extent: (u32, u32)) -> Option<Self> {
        let x0 = i64::from(x.max(0));
        let y0 = i64::from(y.max(0));
        let x1 = (i64::from(x) + i64::from(width)).min(i64::from(extent.0));
        let y1 = (i64::from(y) + i64::from(height)).min(i64::from(extent.1));
        (x1 > x0 && y1 > y0)
            .then(|| Self::new(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
    }

    /// Same rectangle moved by `(dx, dy)`.
    #[inline]
    pub fn offset(self, dx: u32, dy: u32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Backing store shared by a root image and all of its children.
///
/// `version` increases on every write so GPU copies can be refreshed lazily.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    texels: Vec<Texel>,
    version: u64,
}

impl PixelBuffer {
    /// Transparent black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            texels: vec![[0; 4]; width as usize * height as usize],
            version: 0,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    /// Raw RGBA8 bytes, row-major, `width * 4` bytes per row.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> Texel {
        self.texels[self.index(x, y)]
    }

    /// Mutable row slice covering `rect`'s columns at row `rect.y + row`.
    fn row_mut(&mut self, rect: PixelRect, row: u32) -> &mut [Texel] {
        let start = self.index(rect.x, rect.y + row);
        &mut self.texels[start..start + rect.width as usize]
    }

    fn row(&self, rect: PixelRect, row: u32) -> &[Texel] {
        let start = self.index(rect.x, rect.y + row);
        &self.texels[start..start + rect.width as usize]
    }

    /// Calls `f(column, row, texel)` for every texel of `rect`.
    ///
    /// `rect` must lie inside the buffer.
    pub fn write_rect(&mut self, rect: PixelRect, mut f: impl FnMut(u32, u32, &mut Texel)) {
        for row in 0..rect.height {
            for (col, texel) in self.row_mut(rect, row).iter_mut().enumerate() {
                f(col as u32, row, texel);
            }
        }
        self.version += 1;
    }

    pub fn read_rect(&self, rect: PixelRect, mut f: impl FnMut(u32, u32, Texel)) {
        for row in 0..rect.height {
            for (col, texel) in self.row(rect, row).iter().enumerate() {
                f(col as u32, row, *texel);
            }
        }
    }

    pub fn fill_rect(&mut self, rect: PixelRect, texel: Texel) {
        self.write_rect(rect, |_, _, t| *t = texel);
    }

    /// Copies `src` to `dst_x, dst_y` within this buffer; overlapping regions
    /// copy as if through a temporary.
    pub fn copy_within(&mut self, src: PixelRect, dst_x: u32, dst_y: u32) {
        let staged = self.copy_out(src);
        self.paste(&staged, PixelRect::new(dst_x, dst_y, src.width, src.height));
    }

    /// Copies a region into a packed `Vec`.
    pub fn copy_out(&self, rect: PixelRect) -> Vec<Texel> {
        let mut out = Vec::with_capacity(rect.width as usize * rect.height as usize);
        for row in 0..rect.height {
            out.extend_from_slice(self.row(rect, row));
        }
        out
    }

    /// Writes packed texels (`rect.width` per row) into `rect`.
    pub fn paste(&mut self, texels: &[Texel], rect: PixelRect) {
        let w = rect.width as usize;
        for (row, chunk) in texels.chunks_exact(w).take(rect.height as usize).enumerate() {
            self.row_mut(rect, row as u32).copy_from_slice(chunk);
        }
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipped_rect_keeps_overlap() {
        let ext = (10, 10);
        assert_eq!(PixelRect::clipped(-2, 8, 5, 5, ext), Some(PixelRect::new(0, 8, 3, 2)));
        assert_eq!(PixelRect::clipped(10, 0, 5, 5, ext), None);
        assert_eq!(PixelRect::clipped(i32::MAX, 0, i32::MAX, 1, ext), None);
    }

    #[test]
    fn checked_rect_boundaries() {
        let ext = (4, 3);
        assert!(PixelRect::checked(0, 0, 4, 3, ext).is_some());
        assert!(PixelRect::checked(3, 2, 1, 1, ext).is_some());
        assert!(PixelRect::checked(4, 0, 1, 1, ext).is_none());
        assert!(PixelRect::checked(-1, 0, 1, 1, ext).is_none());
        assert!(PixelRect::checked(0, 0, 0, 1, ext).is_none());
        assert!(PixelRect::checked(1, 0, i32::MAX, 1, ext).is_none());
    }

    #[test]
    fn fill_and_read_back() {
        let mut buf = PixelBuffer::new(4, 4);
        let v0 = buf.version();
        buf.fill_rect(PixelRect::new(1, 1, 2, 2), [9, 9, 9, 9]);
        assert!(buf.version() > v0);
        assert_eq!(buf.texel(0, 0), [0; 4]);
        assert_eq!(buf.texel(2, 2), [9; 4]);
        assert_eq!(buf.as_bytes().len(), 64);
    }

    #[test]
    fn overlapping_copy_within() {
        let mut buf = PixelBuffer::new(4, 1);
        buf.write_rect(PixelRect::new(0, 0, 4, 1), |x, _, t| *t = [x as u8; 4]);
        buf.copy_within(PixelRect::new(0, 0, 3, 1), 1, 0);
        let row: Vec<u8> = buf.texels().iter().map(|t| t[0]).collect();
        assert_eq!(row, vec![0, 0, 1, 2]);
    }
}
