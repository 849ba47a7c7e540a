use crate::error::{VgError, VgResult};
use crate::image::{
    decode, encode, Image, ImageFormat, ImageQuality, PixelBuffer, PixelRect, MAX_IMAGE_DIMENSION,
};
use crate::paint::color::clamp_straight;

use super::{ImageHandle, Resources};

fn positive_size(width: i32, height: i32) -> VgResult<()> {
    if width > 0 && height > 0 {
        Ok(())
    } else {
        Err(VgError::IllegalArgument("image region must have a positive size"))
    }
}

/// Bytes an external pixel block of `height` rows needs for `stride`.
fn required_len(stride: usize, row_bytes: usize, height: u32) -> usize {
    stride * (height as usize - 1) + row_bytes
}

fn checked_stride(stride: i32, row_bytes: usize) -> VgResult<usize> {
    usize::try_from(stride)
        .ok()
        .filter(|&s| s >= row_bytes)
        .ok_or(VgError::IllegalArgument("data stride shorter than a row"))
}

impl Resources {
    /// Creates a root image backed by a fresh transparent pixel buffer.
    pub fn create_image(
        &mut self,
        format: ImageFormat,
        width: i32,
        height: i32,
        allowed_quality: ImageQuality,
    ) -> VgResult<ImageHandle> {
        format.require_supported()?;
        positive_size(width, height)?;
        if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
            return Err(VgError::IllegalArgument("image dimension too large"));
        }

        let (w, h) = (width as u32, height as u32);
        let buffer = self.buffers.insert(PixelBuffer::new(w, h));
        let handle = self.images.insert(Image::root(format, w, h, allowed_quality, buffer));
        log::debug!("image created: {handle:?} {format:?} {w}x{h}");
        Ok(handle)
    }

    /// Creates a view of `parent`'s `(x, y, width, height)` region that shares
    /// its pixels.
    pub fn child_image(
        &mut self,
        parent: ImageHandle,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> VgResult<ImageHandle> {
        let parent_image = self.image(parent)?;
        positive_size(width, height)?;
        let local = PixelRect::checked(x, y, width, height, (parent_image.width(), parent_image.height()))
            .ok_or(VgError::OutOfBounds)?;

        let child = parent_image.child(parent, local);
        let handle = self.images.insert(child);
        if let Some(p) = self.images.get_mut(parent) {
            p.children += 1;
        }
        log::debug!("child image created: {handle:?} of {parent:?} at {local:?}");
        Ok(handle)
    }

    /// Destroys an image. An image with live children is kept and
    /// `ImageInUse` is returned.
    pub fn destroy_image(&mut self, handle: ImageHandle) -> VgResult<()> {
        let image = self.image(handle)?;
        if image.has_children() {
            log::warn!("refusing to destroy {handle:?}: {} child image(s) alive", image.children);
            return Err(VgError::ImageInUse);
        }

        let (parent, buffer) = (image.parent, image.buffer);
        self.images.remove(handle);
        match parent {
            Some(parent) => {
                if let Some(p) = self.images.get_mut(parent) {
                    p.children = p.children.saturating_sub(1);
                }
            }
            None => {
                self.buffers.remove(buffer);
            }
        }
        log::debug!("image destroyed: {handle:?}");
        Ok(())
    }

    pub fn image_parent(&self, handle: ImageHandle) -> VgResult<Option<ImageHandle>> {
        Ok(self.image(handle)?.parent())
    }

    /// Converts `data` from `format` and writes it to the `(x, y, width,
    /// height)` region of `image`.
    ///
    /// Row `r` of the block starts at `r * stride` bytes.
    #[allow(clippy::too_many_arguments)]
    pub fn image_sub_data(
        &mut self,
        image: ImageHandle,
        data: &[u8],
        stride: i32,
        format: ImageFormat,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> VgResult<()> {
        let target = self.image(image)?;
        let bpp = format.require_supported()?;
        positive_size(width, height)?;
        let rect = target.map_rect(x, y, width, height).ok_or(VgError::OutOfBounds)?;

        let row_bytes = rect.width as usize * bpp;
        let stride = checked_stride(stride, row_bytes)?;
        if data.len() < required_len(stride, row_bytes, rect.height) {
            return Err(VgError::IllegalArgument("pixel data shorter than region"));
        }

        let buffer = target.buffer;
        self.image_buffer_mut(buffer)?.write_rect(rect, |col, row, texel| {
            let at = row as usize * stride + col as usize * bpp;
            *texel = decode(format, &data[at..at + bpp]);
        });
        Ok(())
    }

    /// Reads the `(x, y, width, height)` region of `image` converted to
    /// `format`, `stride` bytes per row.
    #[allow(clippy::too_many_arguments)]
    pub fn get_image_sub_data(
        &self,
        image: ImageHandle,
        stride: i32,
        format: ImageFormat,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> VgResult<Vec<u8>> {
        let source = self.image(image)?;
        let bpp = format.require_supported()?;
        positive_size(width, height)?;
        let rect = source.map_rect(x, y, width, height).ok_or(VgError::OutOfBounds)?;

        let row_bytes = rect.width as usize * bpp;
        let stride = checked_stride(stride, row_bytes)?;
        let mut out = vec![0u8; required_len(stride, row_bytes, rect.height)];
        self.image_buffer(source)?.read_rect(rect, |col, row, texel| {
            let at = row as usize * stride + col as usize * bpp;
            encode(format, texel, &mut out[at..at + bpp]);
        });
        Ok(out)
    }

    /// Fills a region with a straight RGBA color; the region is clipped to
    /// the image.
    pub fn clear_image(
        &mut self,
        image: ImageHandle,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        rgba: [f32; 4],
    ) -> VgResult<()> {
        let target = self.image(image)?;
        positive_size(width, height)?;
        let Some(clip) = PixelRect::clipped(x, y, width, height, (target.width(), target.height())) else {
            return Ok(());
        };
        let rect = clip.offset(target.region.x, target.region.y);

        let texel = clamp_straight(rgba).map(|c| (c * 255.0 + 0.5) as u8);
        let buffer = target.buffer;
        self.image_buffer_mut(buffer)?.fill_rect(rect, texel);
        Ok(())
    }

    /// Copies a `width × height` block from `src` at `(sx, sy)` to `dst` at
    /// `(dx, dy)`, clipped to both images. Overlapping copies within the
    /// same storage behave as if staged through a temporary.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_image(
        &mut self,
        dst: ImageHandle,
        dx: i32,
        dy: i32,
        src: ImageHandle,
        sx: i32,
        sy: i32,
        width: i32,
        height: i32,
    ) -> VgResult<()> {
        let src_image = self.image(src)?;
        let dst_image = self.image(dst)?;
        positive_size(width, height)?;

        let Some((s, d)) = clip_copy(
            (sx, sy, src_image.width(), src_image.height()),
            (dx, dy, dst_image.width(), dst_image.height()),
            width,
            height,
        ) else {
            return Ok(());
        };
        let s = s.offset(src_image.region.x, src_image.region.y);
        let d = d.offset(dst_image.region.x, dst_image.region.y);

        let (src_buf, dst_buf) = (src_image.buffer, dst_image.buffer);
        if src_buf == dst_buf {
            self.image_buffer_mut(dst_buf)?.copy_within(s, d.x, d.y);
        } else {
            let staged = self.buffers.get(src_buf).ok_or(VgError::InvalidHandle)?.copy_out(s);
            self.image_buffer_mut(dst_buf)?.paste(&staged, d);
        }
        Ok(())
    }
}

/// Clips a copy between two images of the given sizes; returns the matching
/// source and destination rectangles in each image's own space.
fn clip_copy(
    src: (i32, i32, u32, u32),
    dst: (i32, i32, u32, u32),
    width: i32,
    height: i32,
) -> Option<(PixelRect, PixelRect)> {
    let (mut sx, mut sy, sw, sh) = (src.0 as i64, src.1 as i64, src.2 as i64, src.3 as i64);
    let (mut dx, mut dy, dw, dh) = (dst.0 as i64, dst.1 as i64, dst.2 as i64, dst.3 as i64);
    let (mut w, mut h) = (width as i64, height as i64);

    for (s, d, len) in [(&mut sx, &mut dx, &mut w), (&mut sy, &mut dy, &mut h)] {
        let shift = (-*s).max(-*d).max(0);
        *s += shift;
        *d += shift;
        *len -= shift;
    }
    w = w.min(sw - sx).min(dw - dx);
    h = h.min(sh - sy).min(dh - dy);
    if w <= 0 || h <= 0 {
        return None;
    }

    let (w, h) = (w as u32, h as u32);
    Some((
        PixelRect::new(sx as u32, sy as u32, w, h),
        PixelRect::new(dx as u32, dy as u32, w, h),
    ))
}
