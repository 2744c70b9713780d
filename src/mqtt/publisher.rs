//! Republishes acquired samples to an MQTT broker as JSON, for downstream
//! collectors. Two threads: one drives the rumqttc event loop, the other
//! drains the publish channel. Broker failures are logged and retried by
//! the event loop; they never stop acquisition.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{error, info, warn};
use rumqttc::{Client, Connection, Event, MqttOptions, QoS};
use serde::Serialize;

use crate::config::MqttConfig;
use crate::types::SensorSample;

#[derive(Debug, Serialize)]
struct SamplePayload {
    acc_x: f64,
    acc_y: f64,
    acc_z: f64,
    timestamp: i64,
}

impl From<&SensorSample> for SamplePayload {
    fn from(sample: &SensorSample) -> Self {
        Self {
            acc_x: sample.acc[0],
            acc_y: sample.acc[1],
            acc_z: sample.acc[2],
            timestamp: sample.timestamp,
        }
    }
}

fn qos_from_level(level: u8) -> QoS {
    match level {
        0 => QoS::AtMostOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}

pub struct MqttPublisherHandle {
    stop_flag: Arc<AtomicBool>,
    publish_handle: Option<thread::JoinHandle<()>>,
    pump_handle: Option<thread::JoinHandle<()>>,
}

impl MqttPublisherHandle {
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        for handle in [self.publish_handle.take(), self.pump_handle.take()]
            .into_iter()
            .flatten()
        {
            if handle.join().is_err() {
                error!("MQTT publisher thread panicked");
            }
        }
    }
}

impl Drop for MqttPublisherHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn spawn(config: MqttConfig, samples: Receiver<SensorSample>) -> MqttPublisherHandle {
    let stop_flag = Arc::new(AtomicBool::new(false));

    let mut options = MqttOptions::new(&config.client_id, &config.broker, config.port);
    options.set_keep_alive(Duration::from_secs(config.keep_alive_secs as u64));
    let (client, connection) = Client::new(options, 10);

    info!(
        "MQTT publisher starting: broker={}:{}, topic={}",
        config.broker, config.port, config.topic
    );

    let pump_flag = Arc::clone(&stop_flag);
    let pump_handle = thread::spawn(move || pump_events(connection, &pump_flag));

    let publish_flag = Arc::clone(&stop_flag);
    let publish_handle =
        thread::spawn(move || publish_loop(client, &config, &samples, &publish_flag));

    MqttPublisherHandle {
        stop_flag,
        publish_handle: Some(publish_handle),
        pump_handle: Some(pump_handle),
    }
}

fn pump_events(mut connection: Connection, stop_flag: &AtomicBool) {
    for event in connection.iter() {
        if stop_flag.load(Ordering::Relaxed) {
            break;
        }
        match event {
            Ok(Event::Incoming(_)) | Ok(Event::Outgoing(_)) => {}
            Err(e) => {
                error!("MQTT connection error: {}", e);
                thread::sleep(Duration::from_secs(1));
            }
        }
    }
    info!("MQTT event loop stopped");
}

fn publish_loop(
    client: Client,
    config: &MqttConfig,
    samples: &Receiver<SensorSample>,
    stop_flag: &AtomicBool,
) {
    let qos = qos_from_level(config.qos);
    while !stop_flag.load(Ordering::Relaxed) {
        let sample = match samples.recv_timeout(Duration::from_millis(200)) {
            Ok(sample) => sample,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                info!("Publish channel disconnected, MQTT publisher exiting");
                break;
            }
        };
        let payload = match serde_json::to_vec(&SamplePayload::from(&sample)) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize sample: {}", e);
                continue;
            }
        };
        // try_publish keeps the drain loop responsive when the broker is
        // unreachable and the request queue fills up.
        if let Err(e) = client.try_publish(&config.topic, qos, false, payload) {
            warn!("MQTT publish failed: {}", e);
        }
    }
    let _ = client.disconnect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_shape() {
        let sample = SensorSample::new([0.1, -0.2, 1.0], [0.0; 3], [0.0; 3], 1700000000000);
        let json = serde_json::to_value(SamplePayload::from(&sample)).unwrap();
        assert_eq!(json["acc_x"], 0.1);
        assert_eq!(json["acc_y"], -0.2);
        assert_eq!(json["acc_z"], 1.0);
        assert_eq!(json["timestamp"], 1700000000000i64);
    }

    #[test]
    fn qos_levels_map_with_fallback() {
        assert_eq!(qos_from_level(0), QoS::AtMostOnce);
        assert_eq!(qos_from_level(1), QoS::AtLeastOnce);
        assert_eq!(qos_from_level(2), QoS::ExactlyOnce);
        assert_eq!(qos_from_level(9), QoS::AtLeastOnce);
    }
}
