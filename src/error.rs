//! # Error Types
//!
//! Recoverable failures raised by the map and by the dataset layer.
//!
//! The map never catches anything it raises. Misuse of the container contract (reading or
//! stepping past the end sentinel of a cursor, using a stale handle) is a programming error and
//! panics instead of returning an [`Error`].
//!
//! Errors surfaced by the dataset layer carry a short user-facing rendering through
//! [`Error::user_message`], which is what [`Datasets::run`](crate::Datasets::run)
//! prints before moving on to the next command line.

use alloc::string::String;

use thiserror::Error;

/// Errors returned by fallible operations of this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A keyed lookup (`try_get`, `try_get_mut`) did not find the key.
    #[error("key not found")]
    KeyNotFound,

    /// A command referred to a dataset name that is not bound.
    #[error("unknown dataset `{0}`")]
    UnknownDataset(String),

    /// `print` was asked to render a dataset without entries.
    #[error("dataset `{0}` is empty")]
    EmptyDataset(String),

    /// The command word is unknown or the argument count is wrong.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    /// A dataset key in the input text was not followed by a value.
    #[error("key `{0}` has no value")]
    MissingValue(String),

    /// Writing command output to the sink failed.
    #[error("failed to write output")]
    Output(#[from] core::fmt::Error),
}

impl Error {
    /// The text shown to a user when a command fails.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::EmptyDataset(_) => "<EMPTY>",
            _ => "<INVALID COMMAND>",
        }
    }
}

/// Shorthand for results carrying this crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
