//! Core reactive plumbing for Canopy.
//!
//! This crate provides the notification primitives that the Canopy selection
//! engine and its embedding view layers share:
//!
//! - **Signal/Slot System**: type-safe, re-entrant change notification
//! - **Property System**: value cells with change detection
//! - **Logging**: tracing targets, perf spans and tree-dump options
//!
//! # Signal/Slot Example
//!
//! ```
//! use canopy_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod property;
pub mod signal;

pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use property::Property;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
