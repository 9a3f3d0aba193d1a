//! Standard middleware.

pub mod conditional;
pub mod logging;
#[cfg(feature = "timeout")]
pub mod timeout;

pub use conditional::{Branch, When, when};
pub use logging::LoggingStep;
#[cfg(feature = "timeout")]
pub use timeout::TimeoutStep;
