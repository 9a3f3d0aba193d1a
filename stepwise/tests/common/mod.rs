#![allow(dead_code)]

use stepwise::{ActionError, Context, Message, Request};
use thiserror::Error;

// ============================================================================
// Test Input Types
// ============================================================================

#[derive(Clone, Debug)]
pub struct Order {
    pub id: u32,
    pub item: String,
    pub quantity: u32,
}

impl Order {
    pub fn new(id: u32, item: &str, quantity: u32) -> Self {
        Self {
            id,
            item: item.to_string(),
            quantity,
        }
    }
}

// ============================================================================
// Test Errors
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("quantity must be positive")]
    EmptyOrder,

    #[error("out of stock: {0}")]
    OutOfStock(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<ActionError> for OrderError {
    fn from(err: ActionError) -> Self {
        OrderError::Internal(err.to_string())
    }
}

// ============================================================================
// Test Steps
// ============================================================================

/// A one-key context patch.
pub fn patch<T: Send + Sync + 'static>(key: &str, value: T) -> Context {
    Context::new().with(key, value)
}

/// Read a string value the steps put into the context.
pub fn text<In: Message>(request: &Request<In>, key: &str) -> String {
    request
        .context
        .get::<String>(key)
        .cloned()
        .unwrap_or_default()
}
