pub mod publisher;

pub use publisher::{spawn, MqttPublisherHandle};
