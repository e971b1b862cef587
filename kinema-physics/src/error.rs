use kinema_collision::PolyhedronError;
use kinema_core::MapFull;
use thiserror::Error;

use crate::BodyIndex;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Body {0} does not exist")]
    BodyNotFound(BodyIndex),

    #[error("Invalid polyhedron")]
    InvalidPolyhedron(#[from] PolyhedronError),

    #[error("Failed to grow the contact cache")]
    ContactCache(#[from] MapFull),

    #[error("Host world has {host} bodies but the device world has {device}")]
    BodyCountMismatch { host: usize, device: usize },
}
