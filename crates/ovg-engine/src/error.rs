//! Engine error type.
//!
//! Every fallible engine call reports synchronously through [`VgResult`].
//! Backend construction (adapter/device acquisition) uses `anyhow` instead,
//! since those failures come from the platform rather than from API misuse.

use thiserror::Error;

/// Contract violations reported by the engine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VgError {
    /// The path's capability mask does not permit the operation.
    #[error("capability denied: {0}")]
    CapabilityDenied(&'static str),

    /// A rectangle exceeds the dimensions of the image it addresses.
    #[error("region out of bounds")]
    OutOfBounds,

    /// A matrix or camera pop without a matching push.
    #[error("stack underflow")]
    StackUnderflow,

    /// The handle refers to a destroyed or unknown object.
    #[error("invalid handle")]
    InvalidHandle,

    /// Format, datatype or pixel layout not implemented.
    #[error("unsupported format")]
    UnsupportedFormat,

    /// A numeric or structural argument is outside its legal range.
    #[error("illegal argument: {0}")]
    IllegalArgument(&'static str),

    /// The image still has live child images.
    #[error("image still has live children")]
    ImageInUse,

    /// The context was destroyed.
    #[error("context destroyed")]
    ContextDestroyed,
}

pub type VgResult<T> = Result<T, VgError>;
