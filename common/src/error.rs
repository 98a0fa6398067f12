use thiserror::Error;

/// Errors raised while constructing or validating a [`crate::money::Money`]
/// amount.
#[derive(Debug, Error)]
pub enum MoneyError {
    #[error("amount overflow")]
    Overflow,

    #[error("insufficient balance: need {need}, have {have}")]
    Insufficient { need: String, have: String },

    #[error("invalid decimal amount: {0}")]
    InvalidAmount(String),

    #[error("scale {0} exceeds the maximum supported precision")]
    ScaleTooLarge(u32),
}
