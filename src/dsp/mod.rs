pub mod integrator;
pub mod kinematics;
pub mod rls;

pub use integrator::TrapezoidIntegrator;
pub use kinematics::{KinematicFrame, KinematicProcessor};
pub use rls::RlsDetrender;

#[derive(Debug, thiserror::Error)]
pub enum DspError {
    #[error("time step must be positive, got {0}")]
    NonPositiveDt(f64),
    #[error("forgetting factor must be in (0, 1], got {0}")]
    InvalidForgettingFactor(f64),
    #[error("frame size and multiplier must be non-zero")]
    EmptyBuffer,
}
