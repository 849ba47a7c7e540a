use crate::coords::Rect;
use crate::error::{VgError, VgResult};
use crate::math::Mat3;
use crate::path::{Path, PathCapabilities, PathDesc, Segment};

use super::{PathHandle, Resources};

impl Resources {
    /// Creates an empty path; fails with `UnsupportedFormat` for any format
    /// other than the standard one.
    pub fn create_path(&mut self, desc: PathDesc) -> VgResult<PathHandle> {
        let path = Path::new(desc)?;
        let handle = self.paths.insert(path);
        log::debug!(
            "path created: {handle:?} datatype={:?} caps={:?}",
            desc.datatype,
            desc.capabilities
        );
        Ok(handle)
    }

    pub fn destroy_path(&mut self, handle: PathHandle) -> VgResult<()> {
        self.paths.remove(handle).ok_or(VgError::InvalidHandle)?;
        log::debug!("path destroyed: {handle:?}");
        Ok(())
    }

    /// Appends segments with `f32` coordinates, encoded into the path's
    /// datatype.
    pub fn append_path_segments(
        &mut self,
        handle: PathHandle,
        segments: &[Segment],
        coords: &[f32],
    ) -> VgResult<()> {
        self.path_mut(handle)?.append(segments, coords)
    }

    /// Appends segments with little-endian coordinate bytes in the path's
    /// datatype.
    pub fn append_path_data(
        &mut self,
        handle: PathHandle,
        segments: &[Segment],
        data: &[u8],
    ) -> VgResult<()> {
        self.path_mut(handle)?.append_raw(segments, data)
    }

    /// Appends a copy of `src` to `dst`; `src == dst` doubles the path.
    pub fn append_path(&mut self, dst: PathHandle, src: PathHandle) -> VgResult<()> {
        let src = self.path(src)?.clone();
        self.path_mut(dst)?.append_path(&src)
    }

    pub fn modify_path_coords(
        &mut self,
        handle: PathHandle,
        start_segment: usize,
        num_segments: usize,
        coords: &[f32],
    ) -> VgResult<()> {
        self.path_mut(handle)?.modify_coords(start_segment, num_segments, coords)
    }

    pub fn clear_path(&mut self, handle: PathHandle, capabilities: PathCapabilities) -> VgResult<()> {
        self.path_mut(handle)?.clear(capabilities);
        Ok(())
    }

    pub fn remove_path_capabilities(
        &mut self,
        handle: PathHandle,
        capabilities: PathCapabilities,
    ) -> VgResult<()> {
        self.path_mut(handle)?.remove_capabilities(capabilities);
        Ok(())
    }

    pub fn path_capabilities(&self, handle: PathHandle) -> VgResult<PathCapabilities> {
        Ok(self.path(handle)?.capabilities())
    }

    /// Appends `src` transformed by `m` to `dst`.
    pub fn transform_path(&mut self, dst: PathHandle, src: PathHandle, m: Mat3) -> VgResult<()> {
        let src = self.path(src)?.clone();
        self.path_mut(dst)?.append_transformed(&src, m)
    }

    pub fn path_bounds(&mut self, handle: PathHandle, tolerance: f32) -> VgResult<Option<Rect>> {
        self.path_mut(handle)?.bounds(tolerance)
    }

    pub fn path_transformed_bounds(
        &mut self,
        handle: PathHandle,
        m: Mat3,
        tolerance: f32,
    ) -> VgResult<Option<Rect>> {
        self.path_mut(handle)?.transformed_bounds(m, tolerance)
    }
}
