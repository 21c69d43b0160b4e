//! Container reporting operation
//! Snapshots every container at a fixed interval and logs temperature and volumes

use crate::sim::sim_op::SimOp;
use crate::sim::simulation::{SimError, Simulation, StepSnapshot};
use crate::temp_utils::round_to;
use log::info;

pub struct ReportingOp {
    every_n_steps: i32,
}

impl ReportingOp {
    pub fn new() -> Self {
        Self { every_n_steps: 1 }
    }

    pub fn with_interval(every_n_steps: i32) -> Self {
        Self {
            every_n_steps: every_n_steps.max(1),
        }
    }

    fn take_snapshots(&self, sim: &mut Simulation) {
        let snapshots: Vec<StepSnapshot> = sim
            .network
            .containers()
            .map(|(name, container)| StepSnapshot {
                step: sim.step,
                container: name.to_string(),
                snapshot: container.snapshot(),
            })
            .collect();

        for entry in &snapshots {
            let snapshot = &entry.snapshot;
            info!(
                "step {:>4} {:<12} {:>9.2}K liquid {:>12}ml gas {:>12}ml of {}ml",
                entry.step,
                entry.container,
                snapshot.temperature,
                round_to(snapshot.liquid.as_ref().map_or(0.0, |p| p.volume), 6),
                round_to(snapshot.gas.as_ref().map_or(0.0, |p| p.volume), 6),
                snapshot.volume_max
            );
        }
        sim.snapshots.extend(snapshots);
    }
}

impl Default for ReportingOp {
    fn default() -> Self {
        Self::new()
    }
}

impl SimOp for ReportingOp {
    fn name(&self) -> &str {
        "ReportingOp"
    }

    fn init_sim(&mut self, sim: &mut Simulation) -> Result<(), SimError> {
        self.take_snapshots(sim);
        Ok(())
    }

    fn update_sim(&mut self, sim: &mut Simulation) -> Result<(), SimError> {
        if sim.step % self.every_n_steps == 0 || sim.step == sim.sim_steps {
            self.take_snapshots(sim);
        }
        Ok(())
    }

    fn after_sim(&mut self, sim: &mut Simulation) -> Result<(), SimError> {
        if sim.debug {
            let vented = sim.network.vented();
            println!("\n⚗️  === FINAL CONTAINER STATE: {} ===", sim.name);
            for (name, container) in sim.network.containers() {
                let snapshot = container.snapshot();
                println!(
                    "  {:<12} {:>8} {:>9.2}K mass {:>10.4}",
                    name, snapshot.kind, snapshot.temperature, snapshot.combined_mass
                );
            }
            println!(
                "  vented: liquid {}, gas {}",
                vented.liquid.is_some(),
                vented.gas.is_some()
            );
        }
        Ok(())
    }
}
