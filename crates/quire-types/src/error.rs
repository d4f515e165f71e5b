use thiserror::Error;

/// Errors produced by type construction and parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid address {input:?}: {reason}")]
    InvalidAddress { input: String, reason: String },

    #[error("invalid content id {0:?}")]
    InvalidContentId(String),

    #[error("price must not be negative: {0}")]
    NegativePrice(String),

    #[error("price {0} cannot be expressed in base units")]
    PriceOverflow(String),

    #[error("invalid price {0:?}")]
    InvalidPrice(String),
}
