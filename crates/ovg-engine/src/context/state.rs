/// Lifecycle of a [`Context`](super::Context).
///
/// `Created → Configuring → Drawing → Configuring → … → Destroyed`.
/// Setup calls move a fresh context to `Configuring`; draws move it to
/// `Drawing` (opening a frame if none is open); `end_frame` returns it to
/// `Configuring`. `Destroyed` is terminal.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum ContextState {
    #[default]
    Created,
    Configuring,
    Drawing,
    Destroyed,
}

impl ContextState {
    #[inline]
    pub fn is_alive(self) -> bool {
        self != ContextState::Destroyed
    }

    /// Whether a frame is open on the backend.
    #[inline]
    pub fn in_frame(self) -> bool {
        self == ContextState::Drawing
    }
}
