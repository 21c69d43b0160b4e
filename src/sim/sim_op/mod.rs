pub mod heat_op;
pub mod inject_liquid_op;
pub mod reporting_op;

pub use heat_op::HeatOp;
pub use inject_liquid_op::InjectLiquidOp;
pub use reporting_op::ReportingOp;

use crate::sim::simulation::{SimError, Simulation};

pub trait SimOp {
    /// The name of this operator (for identification and lookup)
    fn name(&self) -> &str;

    /// Called once at the beginning of the simulation
    fn init_sim(&mut self, _sim: &mut Simulation) -> Result<(), SimError> {
        Ok(())
    }

    /// Called every simulation step
    fn update_sim(&mut self, _sim: &mut Simulation) -> Result<(), SimError> {
        Ok(())
    }

    /// Called once at the end of the simulation
    fn after_sim(&mut self, _sim: &mut Simulation) -> Result<(), SimError> {
        Ok(())
    }
}

pub struct SimOpHandle {
    pub op: Box<dyn SimOp>,
}

impl SimOpHandle {
    /// Create a new SimOpHandle with the given operation
    pub fn new(op: Box<dyn SimOp>) -> Self {
        SimOpHandle { op }
    }
}

/// Fails early when an op names a container the network does not have.
pub(crate) fn require_container(sim: &Simulation, name: &str) -> Result<(), SimError> {
    match sim.network.container(name) {
        Some(_) => Ok(()),
        None => Err(crate::network::NetworkError::UnknownContainer(name.to_string()).into()),
    }
}
