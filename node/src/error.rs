use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("chain error: {0}")]
    Chain(#[from] meridian_chain::ChainError),

    #[error("key error: {0}")]
    Key(#[from] meridian_crypto::KeyFileError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
