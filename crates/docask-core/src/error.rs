use crate::types::ChunkId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Two distinct chunks share id '{0}'")]
    ChunkIdCollision(ChunkId),
}

pub type Result<T> = std::result::Result<T, Error>;
