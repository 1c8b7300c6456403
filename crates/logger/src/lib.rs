//! Shared tracing bootstrap for downtrack binaries.

mod subscriber;

pub use subscriber::{LogFormat, init, init_with_level};
