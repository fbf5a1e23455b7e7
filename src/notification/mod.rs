//! Handles the dispatching of check-result batches to notification backends.
//!
//! Every backend implements [`Notifier`](crate::core::Notifier); the
//! [`NotifierRegistry`] fans a batch out to all of them and reports which
//! ones failed, without letting one backend affect another.
pub mod custom;
pub mod log;
pub mod registry;
pub mod slack;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use custom::CustomNotifier;
pub use log::LogNotifier;
pub use registry::{DeliveryFailure, DeliveryOutcome, DispatchReport, NotifierRegistry};
pub use slack::SlackNotifier;
