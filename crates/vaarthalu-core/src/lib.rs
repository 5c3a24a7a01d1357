//! Vaarthalu Core Library
//!
//! Configuration, error handling, the analytics event model and the host
//! capability ports shared by the page runtime and the offline worker.

pub mod config;
pub mod error;
pub mod event;
pub mod ports;

pub use config::Config;
pub use error::{CoreError, PortError, Result};
pub use event::{AnalyticsEvent, EventSink, MemorySink, ParamValue, Params};
pub use ports::{Clock, FlagStore, MemoryFlags, Scheduler, VirtualClock};
