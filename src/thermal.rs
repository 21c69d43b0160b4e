use crate::temp_utils::{calculate_temperature, energy_for_temperature};

/// Anything that carries mass, thermal energy and volume
/// Temperature is derived from energy and mass using the room temperature reference
pub trait ThermalBody {
    /// Total mass
    fn mass(&self) -> f64;

    /// Thermal energy held
    fn thermal_energy(&self) -> f64;

    /// Volume at the current temperature (ml)
    fn volume(&self) -> f64;

    /// Temperature in Kelvin; zero for near-zero mass
    fn temperature(&self) -> f64 {
        calculate_temperature(self.thermal_energy(), self.mass())
    }

    /// Energy that has to be added (negative: removed) to reach `temperature`
    fn energy_to_reach(&self, temperature: f64) -> f64 {
        energy_for_temperature(self.mass(), temperature) - self.thermal_energy()
    }
}
