use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analysis::SpectrumWindow;
use crate::sensor::OutputRate;

/// Application configuration. Every section has embedded defaults so the
/// application runs without a config file; `validate` is called after
/// loading so a hand-edited file cannot smuggle in nonsense.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub link: LinkConfig,
    pub plot: PlotConfig,
    pub processing: ProcessingConfig,
    pub spectrum: SpectrumConfig,
    pub mqtt: MqttConfig,
    pub channels: ChannelConfig,
}

/// Main window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    pub resizable: bool,
    pub vsync: bool,
}

/// Serial link to the sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    pub port: String,
    pub baud_rate: u32,
    pub output_rate: OutputRate,
    /// Use the simulated source instead of a real device.
    pub mock: bool,
}

/// Plot display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Trailing samples kept in the plot history.
    pub max_points: usize,
    /// GUI repaint rate in Hz, adjustable at runtime between 10 and 200.
    pub refresh_rate_hz: u32,
    pub plot_height: f32,
    pub colors: PlotColors,
}

/// Per-axis line colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotColors {
    pub x_axis: [u8; 3],
    pub y_axis: [u8; 3],
    pub z_axis: [u8; 3],
}

/// Kinematic pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Samples per processing frame.
    pub frame_size: usize,
    /// Calculation buffer length as a multiple of `frame_size`.
    pub calc_multiplier: usize,
    pub rls_q_velocity: f64,
    pub rls_q_displacement: f64,
    /// Frames before the drift filters are trusted.
    pub warmup_frames: usize,
}

/// Spectrum analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectrumConfig {
    pub n_fft: usize,
    pub window: SpectrumWindow,
    /// Bins below this frequency never count as the dominant peak.
    pub min_frequency: f64,
}

/// MQTT republishing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttConfig {
    pub enabled: bool,
    pub broker: String,
    pub port: u16,
    pub client_id: String,
    pub topic: String,
    pub qos: u8,
    pub keep_alive_secs: u16,
}

/// Channel capacities between the worker threads and the GUI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub sample_channel_capacity: usize,
    pub status_channel_capacity: usize,
    pub publish_channel_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            link: LinkConfig::default(),
            plot: PlotConfig::default(),
            processing: ProcessingConfig::default(),
            spectrum: SpectrumConfig::default(),
            mqtt: MqttConfig::default(),
            channels: ChannelConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 900.0,
            title: "DispMon - Structural Displacement Monitor".to_string(),
            resizable: true,
            vsync: true,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            output_rate: OutputRate::Hz200,
            mock: false,
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            max_points: 2000,
            refresh_rate_hz: 10,
            plot_height: 140.0,
            colors: PlotColors::default(),
        }
    }
}

impl Default for PlotColors {
    fn default() -> Self {
        Self {
            x_axis: [220, 50, 50],
            y_axis: [50, 180, 50],
            z_axis: [50, 80, 220],
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            frame_size: 20,
            calc_multiplier: 100,
            rls_q_velocity: 0.9825,
            rls_q_displacement: 0.9825,
            warmup_frames: 5,
        }
    }
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            n_fft: 512,
            window: SpectrumWindow::Hann,
            min_frequency: 0.1,
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            broker: "localhost".to_string(),
            port: 1883,
            client_id: "dispmon_client".to_string(),
            topic: "dispmon/samples".to_string(),
            qos: 1,
            keep_alive_secs: 60,
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            sample_channel_capacity: 5000,
            status_channel_capacity: 64,
            publish_channel_capacity: 1000,
        }
    }
}

pub const REFRESH_RATE_CHOICES: [u32; 5] = [10, 20, 50, 100, 200];
pub const FFT_SIZE_CHOICES: [usize; 6] = [128, 256, 512, 1024, 2048, 4096];

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(ConfigError::Validation(
                "Window dimensions must be positive".to_string(),
            ));
        }
        if self.link.baud_rate == 0 {
            return Err(ConfigError::Validation(
                "Baud rate must be positive".to_string(),
            ));
        }
        if self.plot.max_points == 0 {
            return Err(ConfigError::Validation(
                "Plot history length must be positive".to_string(),
            ));
        }
        if !(10..=200).contains(&self.plot.refresh_rate_hz) {
            return Err(ConfigError::Validation(
                "Refresh rate must be between 10 and 200 Hz".to_string(),
            ));
        }
        if self.processing.frame_size == 0 || self.processing.calc_multiplier == 0 {
            return Err(ConfigError::Validation(
                "Frame size and calc multiplier must be positive".to_string(),
            ));
        }
        for q in [
            self.processing.rls_q_velocity,
            self.processing.rls_q_displacement,
        ] {
            if !(q > 0.0 && q <= 1.0) {
                return Err(ConfigError::Validation(
                    "RLS forgetting factors must be in (0, 1]".to_string(),
                ));
            }
        }
        if !self.spectrum.n_fft.is_power_of_two() || self.spectrum.n_fft < 64 {
            return Err(ConfigError::Validation(
                "FFT size must be a power of two, at least 64".to_string(),
            ));
        }
        if self.spectrum.min_frequency < 0.0 {
            return Err(ConfigError::Validation(
                "Minimum dominant frequency cannot be negative".to_string(),
            ));
        }
        if self.mqtt.qos > 2 {
            return Err(ConfigError::Validation(
                "MQTT QoS must be 0, 1 or 2".to_string(),
            ));
        }
        if self.channels.sample_channel_capacity == 0
            || self.channels.status_channel_capacity == 0
            || self.channels.publish_channel_capacity == 0
        {
            return Err(ConfigError::Validation(
                "Channel capacities must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(std::io::Error),
    #[error("Parse error: {0}")]
    Parse(toml::de::Error),
    #[error("Serialize error: {0}")]
    Serialize(toml::ser::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Owns the active configuration and remembers where it came from so the
/// settings tab can save edits back.
pub struct ConfigManager {
    config: AppConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            config_path: None,
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = AppConfig::load_from_file(&path)?;
        Ok(Self {
            config,
            config_path: Some(path.as_ref().to_path_buf()),
        })
    }

    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    pub fn get_config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// Saves to the file the config was loaded from, defaulting to
    /// `config.toml` in the working directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        match &self.config_path {
            Some(path) => self.config.save_to_file(path),
            None => self.config.save_to_file("config.toml"),
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_band_refresh_rate() {
        let mut config = AppConfig::default();
        config.plot.refresh_rate_hz = 5;
        assert!(config.validate().is_err());
        config.plot.refresh_rate_hz = 250;
        assert!(config.validate().is_err());
        config.plot.refresh_rate_hz = 200;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_fft_size() {
        let mut config = AppConfig::default();
        config.spectrum.n_fft = 500;
        assert!(config.validate().is_err());
        config.spectrum.n_fft = 32;
        assert!(config.validate().is_err());
        config.spectrum.n_fft = 1024;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_forgetting_factor() {
        let mut config = AppConfig::default();
        config.processing.rls_q_velocity = 0.0;
        assert!(config.validate().is_err());
        config.processing.rls_q_velocity = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.link.port, config.link.port);
        assert_eq!(back.spectrum.n_fft, config.spectrum.n_fft);
        assert_eq!(back.plot.refresh_rate_hz, config.plot.refresh_rate_hz);
    }
}
