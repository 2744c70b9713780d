pub mod acquisition;
pub mod analysis;
pub mod export;

pub use acquisition::AcquisitionHandler;
pub use analysis::AnalysisHandler;
pub use export::ExportHandler;
