use crate::mixture::Liquid;
use crate::sim::sim_op::{SimOp, require_container};
use crate::sim::simulation::{SimError, Simulation};

/// Pours the same liquid into a container every `every_n_steps` steps.
pub struct InjectLiquidOp {
    pub container: String,
    pub liquid: Liquid,
    every_n_steps: i32,
}

impl InjectLiquidOp {
    pub fn new(container: impl Into<String>, liquid: Liquid) -> Self {
        Self {
            container: container.into(),
            liquid,
            every_n_steps: 1,
        }
    }

    pub fn every(mut self, every_n_steps: i32) -> Self {
        self.every_n_steps = every_n_steps.max(1);
        self
    }
}

impl SimOp for InjectLiquidOp {
    fn name(&self) -> &str {
        "InjectLiquidOp"
    }

    fn init_sim(&mut self, sim: &mut Simulation) -> Result<(), SimError> {
        require_container(sim, &self.container)
    }

    fn update_sim(&mut self, sim: &mut Simulation) -> Result<(), SimError> {
        if sim.step % self.every_n_steps != 0 {
            return Ok(());
        }
        let reactions = sim.network.add_liquid(&self.container, self.liquid.clone())?;
        sim.record(reactions);
        Ok(())
    }
}
