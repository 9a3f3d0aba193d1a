//! # stepwise-std
//!
//! Standard implementations for the Stepwise action pipeline.
//!
//! This crate provides:
//! - **Actions**: [`ActionBuilder`](action::ActionBuilder) and
//!   [`Action`](action::Action), with throwing and safe flavors
//! - **Composition**: [`flow`](compose::flow) and [`pipe`](compose::pipe)
//! - **Standard steps**: Logging, When, Branch, Timeout
//! - **Testing utilities**: recording steps and counting handlers

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use stepwise_core;

// Modules
pub mod action;
pub mod compose;
pub mod steps;
pub mod testing;
