// lib.rs - Library exports for the CLI and integration tests

pub mod config;
pub mod error;
pub mod math;
pub mod pool;
pub mod records;

pub use error::{Error, PreconditionError, Result};
pub use pool::slot0::{PoolStateProvider, Slot0};
pub use pool::swap::{swap, SwapDirection, SwapParams, SwapResult};
pub use pool::tick_storage::{Tick, TickReader, TickStorage};
