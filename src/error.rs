use thiserror::Error;

/// Failures reported by [`BlockDeque`](crate::BlockDeque) operations and
/// position arithmetic.
#[derive(Error, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Error {
    /// The operation needs at least one element.
    #[error("container is empty")]
    EmptyContainer,

    /// An index or a position move falls outside the stored sequence.
    #[error("index out of bound")]
    OutOfBound,

    /// The position belongs to another deque, or does not address a
    /// usable slot for the requested operation.
    #[error("invalid position")]
    InvalidPosition,
}
