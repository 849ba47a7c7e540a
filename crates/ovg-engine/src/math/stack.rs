use crate::error::{VgError, VgResult};

use super::Mat3;

/// Named transform slot, each with an independent stack.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MatrixMode {
    PathUserToSurface,
    ImageUserToSurface,
    FillPaintToUser,
    StrokePaintToUser,
}

impl MatrixMode {
    pub const ALL: [MatrixMode; 4] = [
        MatrixMode::PathUserToSurface,
        MatrixMode::ImageUserToSurface,
        MatrixMode::FillPaintToUser,
        MatrixMode::StrokePaintToUser,
    ];

    #[inline]
    const fn index(self) -> usize {
        match self {
            MatrixMode::PathUserToSurface => 0,
            MatrixMode::ImageUserToSurface => 1,
            MatrixMode::FillPaintToUser => 2,
            MatrixMode::StrokePaintToUser => 3,
        }
    }

    /// Only the image transform may carry a projective last row.
    #[inline]
    pub const fn allows_projective(self) -> bool {
        matches!(self, MatrixMode::ImageUserToSurface)
    }
}

/// Stack of transforms over an identity base that is never popped.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    entries: Vec<Mat3>,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self {
            entries: vec![Mat3::identity()],
        }
    }
}

impl MatrixStack {
    #[inline]
    pub fn top(&self) -> Mat3 {
        // `entries` always holds the base.
        self.entries.last().copied().unwrap_or_default()
    }

    fn top_mut(&mut self) -> &mut Mat3 {
        if self.entries.is_empty() {
            self.entries.push(Mat3::identity());
        }
        let last = self.entries.len() - 1;
        &mut self.entries[last]
    }

    /// Number of entries above the base.
    #[inline]
    pub fn depth(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    pub fn push(&mut self) {
        let top = self.top();
        self.entries.push(top);
    }

    pub fn pop(&mut self) -> VgResult<()> {
        if self.entries.len() <= 1 {
            return Err(VgError::StackUnderflow);
        }
        self.entries.pop();
        Ok(())
    }

    pub fn load(&mut self, m: Mat3) {
        *self.top_mut() = m;
    }

    /// `top = top · op`.
    pub fn post_multiply(&mut self, op: Mat3) {
        let top = self.top_mut();
        *top = *top * op;
    }
}

/// One stack per [`MatrixMode`] plus the mode selected for subsequent calls.
#[derive(Debug, Clone)]
pub struct MatrixStacks {
    mode: MatrixMode,
    stacks: [MatrixStack; 4],
}

impl Default for MatrixStacks {
    fn default() -> Self {
        Self {
            mode: MatrixMode::PathUserToSurface,
            stacks: Default::default(),
        }
    }
}

impl MatrixStacks {
    #[inline]
    pub fn mode(&self) -> MatrixMode {
        self.mode
    }

    #[inline]
    pub fn set_mode(&mut self, mode: MatrixMode) {
        self.mode = mode;
    }

    #[inline]
    pub fn stack(&self, mode: MatrixMode) -> &MatrixStack {
        &self.stacks[mode.index()]
    }

    #[inline]
    fn current_mut(&mut self) -> &mut MatrixStack {
        &mut self.stacks[self.mode.index()]
    }

    /// Top of the currently selected stack.
    #[inline]
    pub fn current(&self) -> Mat3 {
        self.stack(self.mode).top()
    }

    /// Top of the stack for `mode`, regardless of the selection.
    #[inline]
    pub fn top(&self, mode: MatrixMode) -> Mat3 {
        self.stack(mode).top()
    }

    pub fn push(&mut self) {
        self.current_mut().push();
    }

    pub fn pop(&mut self) -> VgResult<()> {
        self.current_mut().pop()
    }

    pub fn load_identity(&mut self) {
        self.current_mut().load(Mat3::identity());
    }

    pub fn load(&mut self, m: Mat3) {
        let m = self.sanitize(m);
        self.current_mut().load(m);
    }

    pub fn multiply(&mut self, m: Mat3) {
        let m = self.sanitize(m);
        self.current_mut().post_multiply(m);
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.current_mut().post_multiply(Mat3::translation(dx, dy));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.current_mut().post_multiply(Mat3::scaling(sx, sy));
    }

    pub fn shear(&mut self, shx: f32, shy: f32) {
        self.current_mut().post_multiply(Mat3::shearing(shx, shy));
    }

    pub fn rotate(&mut self, degrees: f32) {
        self.current_mut()
            .post_multiply(Mat3::rotation(degrees.to_radians()));
    }

    fn sanitize(&self, m: Mat3) -> Mat3 {
        if self.mode.allows_projective() { m } else { m.to_affine() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;

    const EPS: f32 = 1e-5;

    fn messy(stacks: &mut MatrixStacks) {
        stacks.translate(13.0, -4.0);
        stacks.rotate(33.0);
        stacks.scale(1.5, 0.25);
        stacks.shear(0.1, 0.0);
    }

    // ── push / pop ────────────────────────────────────────────────────────

    #[test]
    fn pop_at_base_underflows() {
        let mut stacks = MatrixStacks::default();
        assert_eq!(stacks.pop(), Err(VgError::StackUnderflow));
    }

    #[test]
    fn balanced_push_pop_restores_top() {
        for n in [1usize, 2, 7, 32] {
            let mut stacks = MatrixStacks::default();
            messy(&mut stacks);
            let before = stacks.current();

            for i in 0..n {
                stacks.push();
                stacks.translate(i as f32, 1.0);
                stacks.rotate(10.0);
            }
            for _ in 0..n {
                stacks.pop().unwrap();
            }

            assert_eq!(stacks.current(), before, "n = {n}");
            assert_eq!(stacks.stack(stacks.mode()).depth(), 0);
        }
    }

    #[test]
    fn push_copies_top() {
        let mut stacks = MatrixStacks::default();
        stacks.translate(5.0, 6.0);
        stacks.push();
        assert_eq!(stacks.current(), Mat3::translation(5.0, 6.0));
    }

    // ── modes ─────────────────────────────────────────────────────────────

    #[test]
    fn modes_are_independent() {
        let mut stacks = MatrixStacks::default();
        stacks.set_mode(MatrixMode::ImageUserToSurface);
        stacks.translate(10.0, 0.0);
        stacks.push();

        stacks.set_mode(MatrixMode::PathUserToSurface);
        assert_eq!(stacks.current(), Mat3::identity());
        assert_eq!(stacks.pop(), Err(VgError::StackUnderflow));

        assert_eq!(stacks.top(MatrixMode::ImageUserToSurface), Mat3::translation(10.0, 0.0));
        assert_eq!(stacks.stack(MatrixMode::ImageUserToSurface).depth(), 1);
    }

    #[test]
    fn rotate_takes_degrees() {
        let mut stacks = MatrixStacks::default();
        stacks.rotate(90.0);
        let p = stacks.current().transform_point(Vec2::new(1.0, 0.0));
        assert!(p.x.abs() < EPS && (p.y - 1.0).abs() < EPS);
    }

    #[test]
    fn operations_post_multiply() {
        let mut stacks = MatrixStacks::default();
        stacks.translate(400.0, 300.0);
        stacks.scale(2.0, 2.0);
        let p = stacks.current().transform_point(Vec2::new(10.0, 10.0));
        assert_eq!(p, Vec2::new(420.0, 320.0));
    }

    #[test]
    fn load_identity_replaces_top_only() {
        let mut stacks = MatrixStacks::default();
        stacks.translate(1.0, 2.0);
        stacks.push();
        stacks.load_identity();
        assert_eq!(stacks.current(), Mat3::identity());
        stacks.pop().unwrap();
        assert_eq!(stacks.current(), Mat3::translation(1.0, 2.0));
    }

    #[test]
    fn path_mode_forces_affine_input() {
        let projective = Mat3::from_rows([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.5, 0.0, 1.0]]);

        let mut stacks = MatrixStacks::default();
        stacks.load(projective);
        assert!(stacks.current().is_affine());

        stacks.set_mode(MatrixMode::ImageUserToSurface);
        stacks.multiply(projective);
        assert!(!stacks.current().is_affine());
    }
}
