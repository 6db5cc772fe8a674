//! Bulk Operation Monitoring
//!
//! The APM module provides an interface for monitoring and responding to runtime information
//! about bulk writes submitted to the store. Every submitted batch triggers the start hooks
//! registered on its model before the request is sent, and the completion hooks once the store
//! reports back.
mod event;
mod listener;

pub use self::event::{BulkStarted, BulkCompleted};
pub use self::listener::{CompletionHook, Listener, StartHook};
