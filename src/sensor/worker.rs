//! Acquisition worker thread. Owns the serial port (or the mock source),
//! decodes the byte stream and forwards complete samples over a bounded
//! channel. The GUI never touches the port directly.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{SendTimeoutError, Sender};
use log::{error, info, warn};

use crate::config::LinkConfig;
use crate::sensor::mock::MockSignalSource;
use crate::sensor::protocol::{rate_command, SampleAssembler, WitFrameDecoder};
use crate::types::{LinkEvent, SensorSample};

const READ_TIMEOUT: Duration = Duration::from_millis(100);
const SEND_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("serial port error: {0}")]
    Port(#[from] serialport::Error),
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to a running acquisition worker. Dropping it stops the thread and
/// waits for the port to be released.
pub struct SensorWorkerHandle {
    stop_flag: Arc<AtomicBool>,
    join_handle: Option<thread::JoinHandle<()>>,
}

impl SensorWorkerHandle {
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            if handle.join().is_err() {
                error!("Sensor worker panicked");
            }
        }
    }
}

impl Drop for SensorWorkerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn spawn(
    link: LinkConfig,
    samples: Sender<SensorSample>,
    status: Sender<LinkEvent>,
) -> SensorWorkerHandle {
    let stop_flag = Arc::new(AtomicBool::new(false));
    let thread_flag = Arc::clone(&stop_flag);

    let join_handle = thread::spawn(move || {
        info!(
            "Sensor worker starting: port={}, baud={}, rate={}, mock={}",
            link.port,
            link.baud_rate,
            link.output_rate.label(),
            link.mock
        );
        let result = if link.mock {
            run_mock(&link, &samples, &status, &thread_flag)
        } else {
            run_serial(&link, &samples, &status, &thread_flag)
        };
        match result {
            Ok(()) => {
                info!("Sensor worker stopped");
                let _ = status.send(LinkEvent::down("Disconnected"));
            }
            Err(e) => {
                error!("Sensor worker failed: {}", e);
                let _ = status.send(LinkEvent::down(format!("Connection error: {}", e)));
            }
        }
    });

    SensorWorkerHandle {
        stop_flag,
        join_handle: Some(join_handle),
    }
}

fn run_serial(
    link: &LinkConfig,
    samples: &Sender<SensorSample>,
    status: &Sender<LinkEvent>,
    stop_flag: &AtomicBool,
) -> Result<(), SensorError> {
    let mut port = serialport::new(&link.port, link.baud_rate)
        .timeout(READ_TIMEOUT)
        .open()?;

    // Ask the device for the configured output rate before streaming.
    let cmd = rate_command(link.output_rate);
    if let Err(e) = port.write_all(&cmd) {
        warn!("Failed to configure output rate: {}", e);
    } else {
        info!("Output rate set to {}", link.output_rate.label());
        thread::sleep(Duration::from_millis(100));
    }

    let _ = status.send(LinkEvent::up(format!(
        "Connected to {} at {} baud",
        link.port, link.baud_rate
    )));

    let mut decoder = WitFrameDecoder::new();
    let mut assembler = SampleAssembler::new();
    let mut buf = [0u8; 512];

    while !stop_flag.load(Ordering::Relaxed) {
        let n = match port.read(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Err(e) => return Err(e.into()),
        };
        for &byte in &buf[..n] {
            let Some(packet) = decoder.push(byte) else {
                continue;
            };
            if let Some(sample) = assembler.push(packet) {
                if !forward_sample(samples, stop_flag, sample) {
                    return Ok(());
                }
            }
        }
    }
    Ok(())
}

/// Sends with a timeout so a full channel never wedges shutdown. Returns
/// false when the worker should exit.
fn forward_sample(
    samples: &Sender<SensorSample>,
    stop_flag: &AtomicBool,
    sample: SensorSample,
) -> bool {
    let mut pending = sample;
    loop {
        if stop_flag.load(Ordering::Relaxed) {
            return false;
        }
        match samples.send_timeout(pending, SEND_TIMEOUT) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(s)) => pending = s,
            Err(SendTimeoutError::Disconnected(_)) => {
                info!("Sample channel disconnected, sensor worker exiting");
                return false;
            }
        }
    }
}

fn run_mock(
    link: &LinkConfig,
    samples: &Sender<SensorSample>,
    status: &Sender<LinkEvent>,
    stop_flag: &AtomicBool,
) -> Result<(), SensorError> {
    let _ = status.send(LinkEvent::up(format!(
        "Mock sensor running (ignoring {})",
        link.port
    )));

    let mut source = MockSignalSource::new(link.output_rate.dt());
    let interval = Duration::from_secs_f64(source.dt());

    while !stop_flag.load(Ordering::Relaxed) {
        if !forward_sample(samples, stop_flag, source.next_sample()) {
            return Ok(());
        }
        thread::sleep(interval);
    }
    Ok(())
}
