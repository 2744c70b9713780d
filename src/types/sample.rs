use serde::Serialize;

/// One complete reading from the IMU. Acceleration is in g, angular rate
/// in deg/s, tilt angle in deg. The wire protocol carries no clock, so the
/// timestamp is wall-clock milliseconds taken when the sample was decoded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorSample {
    pub acc: [f64; 3],
    pub gyro: [f64; 3],
    pub angle: [f64; 3],
    pub timestamp: i64,
}

impl SensorSample {
    pub fn new(acc: [f64; 3], gyro: [f64; 3], angle: [f64; 3], timestamp: i64) -> Self {
        Self {
            acc,
            gyro,
            angle,
            timestamp,
        }
    }
}

/// Axis index used throughout the processing pipeline.
pub const AXES: [&str; 3] = ["X", "Y", "Z"];
