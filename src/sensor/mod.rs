pub mod mock;
pub mod protocol;
pub mod worker;

pub use protocol::OutputRate;
pub use worker::{spawn, SensorWorkerHandle};
