pub mod sim_op;
pub mod simulation;

pub use simulation::{OpTiming, SimError, SimProps, Simulation, StepEvent, StepSnapshot};
