//! The module contains the errors the engine can throw.
//!
//! The errors are:
//!
//! - [`InsufficientStock`] thrown when a purchase would drive an ingredient
//!   below zero. It carries the ingredient name.
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`InvalidQuantity`], [`InvalidName`], [`InvalidUnit`] thrown by input
//!   validation, before anything is written.
//!
//!  [`InsufficientStock`]: EngineError::InsufficientStock
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidQuantity`]: EngineError::InvalidQuantity
//!  [`InvalidName`]: EngineError::InvalidName
//!  [`InvalidUnit`]: EngineError::InvalidUnit
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Not enough {0} in inventory")]
    InsufficientStock(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid unit: {0}")]
    InvalidUnit(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// `true` for errors caused by caller input rather than storage.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuantity(_)
                | Self::InvalidName(_)
                | Self::InvalidUnit(_)
                | Self::InvalidId(_)
                | Self::InvalidCursor(_)
                | Self::InvalidRange(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InsufficientStock(a), Self::InsufficientStock(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidQuantity(a), Self::InvalidQuantity(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidUnit(a), Self::InvalidUnit(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::InvalidRange(a), Self::InvalidRange(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_names_the_ingredient() {
        let err = EngineError::InsufficientStock("Bun".to_string());
        assert_eq!(err.to_string(), "Not enough Bun in inventory");
    }

    #[test]
    fn validation_errors_are_flagged() {
        assert!(EngineError::InvalidQuantity("x".to_string()).is_validation());
        assert!(EngineError::InvalidRange("x".to_string()).is_validation());
        assert!(!EngineError::InsufficientStock("x".to_string()).is_validation());
        assert!(!EngineError::KeyNotFound("x".to_string()).is_validation());
    }
}
