//! Error types for dictionary I/O, user-db access, and pipeline execution.
//!
//! Low-level loaders return `Result<T, String>` for the same reason the
//! teacher's `Lexicon::load_from_fst_bincode` does (the underlying `fst`/
//! `bincode`/`redb` error types don't share a common trait object story);
//! anything a caller might want to match on is wrapped one layer up in
//! [`CoreError`].

use std::fmt;

#[derive(Debug)]
pub enum CoreError {
    Io(std::io::Error),
    Corrupt(String),
    Redb(String),
    NotFound(String),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Io(e) => write!(f, "io error: {e}"),
            CoreError::Corrupt(msg) => write!(f, "corrupt artifact: {msg}"),
            CoreError::Redb(msg) => write!(f, "user database error: {msg}"),
            CoreError::NotFound(msg) => write!(f, "not found: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Io(e)
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
