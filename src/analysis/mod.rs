pub mod anomaly;
pub mod spectrum;
pub mod stats;

pub use anomaly::AnomalyPoint;
pub use spectrum::{SpectrumAnalyzer, SpectrumResult, SpectrumWindow};
pub use stats::SeriesStats;
