use thiserror::Error;

/// Error types.
#[derive(Debug, Error)]
pub enum Error {
    #[cfg(test)]
    #[error(transparent)]
    FromHexError(#[from] hex::FromHexError),

    #[error("unexpected state")]
    UnexpectedState,

    #[error("invalid length")]
    InvalidLength,

    #[error("parameter out of valid range")]
    ParameterOutOfRange,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("data parse error: {0}")]
    BinRwError(#[from] binrw::Error),
}
