//! Listing approval and status reconciliation engine.
//!
//! - [`Reconciler`] rebuilds the canonical listing set from both backend
//!   collections.
//! - [`Dispatcher`] executes an admin intent through the candidate chain
//!   picked by the capability matrix.
//! - [`AdminConsole`] is the caller side: it serializes actions per listing,
//!   reports outcomes through an injected [`Notifier`], and refetches after
//!   every successful action.

pub mod console;
pub mod dispatcher;
pub mod error;
pub mod notifier;
pub mod reconciler;

pub use console::{ActionOutcome, AdminConsole};
pub use dispatcher::{DispatchAck, Dispatcher};
pub use error::{ConsoleError, DispatchError, FetchError, PartialFetchError};
pub use notifier::{BroadcastNotifier, Notification, NotificationLevel, Notifier, NoopNotifier, TracingNotifier};
pub use reconciler::Reconciler;
