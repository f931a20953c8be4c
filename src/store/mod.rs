use thiserror::Error;

pub mod keys;
pub mod messages;
pub mod mutator;
pub mod state;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} is neither a track nor an artist")]
    UnsupportedUri(String),
}
