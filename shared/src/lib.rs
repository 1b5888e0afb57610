// shared/src/lib.rs

/// Every failure the resolver and its adapters can report.
///
/// `NotFoundLocal` and `AlreadyExists` are control-flow signals between the
/// store and the resolver; callers of the resolver never see them.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("character not found in local store")]
    NotFoundLocal,
    #[error("character not found in external api")]
    NotFoundRemote,
    #[error("character already exists: {0}")]
    AlreadyExists(String),
    #[error("upstream: {0}")]
    Upstream(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("character not deleted in local store: {0}")]
    NotDeleted(String),
    #[error("config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
