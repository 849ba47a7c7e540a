use crate::error::{VgError, VgResult};
use crate::math::Mat4;

/// Surface → clip projection with a stack of pushed orthographic cameras.
///
/// A push saves the current projection and makes the camera current; a pop
/// restores exactly what was saved.
#[derive(Debug, Clone)]
pub struct CameraStack {
    surface: Mat4,
    current: Mat4,
    saved: Vec<Mat4>,
}

impl CameraStack {
    /// Stack whose base maps `width × height` surface pixels (origin
    /// bottom-left) to clip space.
    pub fn new(width: u32, height: u32) -> VgResult<Self> {
        let surface = surface_projection(width, height)?;
        Ok(Self {
            surface,
            current: surface,
            saved: Vec::new(),
        })
    }

    #[inline]
    pub fn current(&self) -> Mat4 {
        self.current
    }

    /// Number of pushed cameras.
    #[inline]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn push_ortho(&mut self, l: f32, r: f32, b: f32, t: f32, n: f32, f: f32) -> VgResult<()> {
        let ortho = Mat4::ortho(l, r, b, t, n, f)?;
        self.saved.push(self.current);
        self.current = ortho;
        Ok(())
    }

    pub fn pop(&mut self) -> VgResult<()> {
        let prev = self.saved.pop().ok_or(VgError::StackUnderflow)?;
        self.current = prev;
        Ok(())
    }

    /// Drops every pushed camera.
    pub fn reset(&mut self) {
        self.saved.clear();
        self.current = self.surface;
    }

    /// Rebuilds the base projection; pushed cameras are left alone.
    pub fn resize(&mut self, width: u32, height: u32) -> VgResult<()> {
        let surface = surface_projection(width, height)?;
        if self.saved.is_empty() {
            self.current = surface;
        } else if let Some(base) = self.saved.first_mut() {
            *base = surface;
        }
        self.surface = surface;
        Ok(())
    }
}

fn surface_projection(width: u32, height: u32) -> VgResult<Mat4> {
    Mat4::ortho(0.0, width as f32, 0.0, height as f32, -1.0, 1.0)
}
