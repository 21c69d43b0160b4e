//! Heating operation
//! Moves a container toward a target temperature, optionally capped per step

use crate::sim::sim_op::{SimOp, require_container};
use crate::sim::simulation::{SimError, Simulation};
use crate::temp_utils::near_zero;
use crate::thermal::ThermalBody;

pub struct HeatOp {
    pub container: String,
    pub target_temperature: f64,
    /// Largest temperature change per step; `None` jumps straight to the target
    pub max_step_kelvin: Option<f64>,
}

impl HeatOp {
    pub fn new(container: impl Into<String>, target_temperature: f64) -> Self {
        Self {
            container: container.into(),
            target_temperature,
            max_step_kelvin: None,
        }
    }

    pub fn with_max_step(mut self, max_step_kelvin: f64) -> Self {
        self.max_step_kelvin = Some(max_step_kelvin.abs());
        self
    }

    fn next_temperature(&self, current: f64) -> f64 {
        match self.max_step_kelvin {
            Some(max_step) => {
                current + (self.target_temperature - current).clamp(-max_step, max_step)
            }
            None => self.target_temperature,
        }
    }
}

impl SimOp for HeatOp {
    fn name(&self) -> &str {
        "HeatOp"
    }

    fn init_sim(&mut self, sim: &mut Simulation) -> Result<(), SimError> {
        require_container(sim, &self.container)
    }

    fn update_sim(&mut self, sim: &mut Simulation) -> Result<(), SimError> {
        let Some(container) = sim.network.container(&self.container) else {
            return require_container(sim, &self.container);
        };
        // nothing to heat, and an empty container has no temperature
        if near_zero(container.mass()) {
            return Ok(());
        }
        let next = self.next_temperature(container.temperature());
        let reactions = sim.network.heat_to(&self.container, next)?;
        sim.record(reactions);
        Ok(())
    }
}
