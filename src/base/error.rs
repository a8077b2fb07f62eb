//! Domain errors that callers may want to match on.
//!
//! These travel inside `anyhow::Error` like everything else and can be
//! recovered with `downcast_ref::<RelayError>()`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    /// A required field of an inbound event was empty.
    #[error("Inbound event is missing `{0}`.")]
    MissingField(&'static str),

    /// Both a local image path and a remote image url were passed to one reply.
    #[error("A reply may carry either an image path or an image url, not both.")]
    ConflictingImages,

    #[error("Keyword triggers must not be empty.")]
    EmptyTrigger,

    #[error("Keyword trigger `{0}` is defined more than once.")]
    DuplicateTrigger(String),

    /// The platform answered with a non-success status.
    #[error("Request to `{endpoint}` failed with status {status}: {body}")]
    Api { endpoint: String, status: u16, body: String },
}
