// src/container.rs - Flasks and canisters: phase containers with a reaction pipeline

use crate::mixture::{Gas, Liquid, LiquidAndGas, Mixture, combine_optional};
use crate::temp_utils::near_zero;
use crate::thermal::ThermalBody;
use log::debug;
use once_cell::unsync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

type OverflowFn = Box<dyn FnOnce() -> LiquidAndGas>;

/// Overflow of a reaction, computed on first access only.
///
/// Combining the escaping gas can be skipped entirely by callers that only
/// look at condensation and bubbling.
pub struct Overflow(Lazy<LiquidAndGas, OverflowFn>);

impl Overflow {
    pub(crate) fn ready(overflow: LiquidAndGas) -> Self {
        Self::deferred(move || overflow)
    }

    fn deferred(compute: impl FnOnce() -> LiquidAndGas + 'static) -> Self {
        let compute: OverflowFn = Box::new(compute);
        Self(Lazy::new(compute))
    }

    pub fn get(&self) -> &LiquidAndGas {
        Lazy::force(&self.0)
    }

    pub fn is_computed(&self) -> bool {
        Lazy::get(&self.0).is_some()
    }

    pub fn into_inner(self) -> LiquidAndGas {
        Lazy::into_value(self.0).unwrap_or_else(|compute| compute())
    }
}

impl fmt::Debug for Overflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Lazy::get(&self.0) {
            Some(overflow) => f.debug_tuple("Overflow").field(overflow).finish(),
            None => f.write_str("Overflow(<deferred>)"),
        }
    }
}

/// What a single reaction produced.
#[derive(Debug)]
pub struct ReactionResult {
    /// Liquid condensed out of the held gas
    pub liquid_from_gas: Option<Liquid>,
    /// Gas bubbled out of the held liquid
    pub gas_from_liquid: Option<Gas>,
    /// Liquid spilled and gas fumed because of capacity
    pub overflow: Overflow,
}

impl ReactionResult {
    pub fn overflow(&self) -> &LiquidAndGas {
        self.overflow.get()
    }
}

#[derive(Debug, Clone)]
pub enum ContainerKind {
    /// Holds liquid only; any gas escapes immediately
    Flask,
    /// Holds liquid and gas sharing one volume
    Canister { gas: Option<Gas> },
}

/// A vessel owning at most one liquid and, for canisters, one gas.
///
/// Every reaction replaces the held mixtures wholesale.
#[derive(Debug, Clone)]
pub struct Container {
    volume_max: f64,
    liquid: Option<Liquid>,
    kind: ContainerKind,
}

impl Container {
    pub fn flask(volume_max: f64, liquid: Option<Liquid>) -> Self {
        Self {
            volume_max,
            liquid: liquid.filter(|m| !m.is_empty()),
            kind: ContainerKind::Flask,
        }
    }

    pub fn canister(volume_max: f64, liquid: Option<Liquid>, gas: Option<Gas>) -> Self {
        Self {
            volume_max,
            liquid: liquid.filter(|m| !m.is_empty()),
            kind: ContainerKind::Canister {
                gas: gas.filter(|m| !m.is_empty()),
            },
        }
    }

    pub fn volume_max(&self) -> f64 {
        self.volume_max
    }

    pub fn kind(&self) -> &ContainerKind {
        &self.kind
    }

    pub fn liquid(&self) -> Option<&Liquid> {
        self.liquid.as_ref()
    }

    pub fn gas(&self) -> Option<&Gas> {
        match &self.kind {
            ContainerKind::Flask => None,
            ContainerKind::Canister { gas } => gas.as_ref(),
        }
    }

    fn take_gas(&mut self) -> Option<Gas> {
        match &mut self.kind {
            ContainerKind::Flask => None,
            ContainerKind::Canister { gas } => gas.take(),
        }
    }

    /// Pours in a liquid and lets the contents settle at the resulting temperature.
    pub fn add_liquid(&mut self, mixture: Liquid) -> ReactionResult {
        let liquid = combine_optional(self.liquid.take(), Some(&mixture));
        let gas = self.take_gas();
        self.react(liquid, gas, 0.0)
    }

    /// Injects a gas. A flask keeps whatever condenses and fumes the rest.
    pub fn add_gas(&mut self, mixture: Gas) -> ReactionResult {
        let liquid = self.liquid.take();
        let gas = combine_optional(self.take_gas(), Some(&mixture));
        self.react(liquid, gas, 0.0)
    }

    /// Adds or removes exactly the energy needed to bring the contents to `temperature`.
    pub fn heat_to(&mut self, temperature: f64) -> ReactionResult {
        let energy = self.energy_to_reach(temperature);
        self.add_thermal_energy(energy)
    }

    pub fn add_thermal_energy(&mut self, energy: f64) -> ReactionResult {
        let liquid = self.liquid.take();
        let gas = self.take_gas();
        self.react(liquid, gas, energy)
    }

    /// Feeds `energy` into both phases, split by their share of the mass,
    /// then reconciles the products with the container's capacity.
    fn react(&mut self, liquid: Option<Liquid>, gas: Option<Gas>, energy: f64) -> ReactionResult {
        let liquid_mass = liquid.as_ref().map_or(0.0, |m| m.mass());
        let gas_mass = gas.as_ref().map_or(0.0, |m| m.mass());
        let total_mass = liquid_mass + gas_mass;
        let gas_energy = match (&liquid, &gas) {
            (None, _) => energy,
            (Some(_), None) => 0.0,
            _ if near_zero(total_mass) => 0.0,
            _ => energy * gas_mass / total_mass,
        };

        let liquid_results = liquid.map(|m| m.add_thermal_energy(energy - gas_energy));
        let gas_results = gas.map(|m| m.add_thermal_energy(gas_energy));
        self.distribute_overflow(liquid_results, gas_results)
    }

    fn distribute_overflow(
        &mut self,
        liquid_results: Option<LiquidAndGas>,
        gas_results: Option<LiquidAndGas>,
    ) -> ReactionResult {
        let from_liquid = liquid_results.unwrap_or_default();
        let from_gas = gas_results.unwrap_or_default();
        let liquid_from_gas = from_gas.liquid;
        let gas_from_liquid = from_liquid.gas;

        let liquid_combined = combine_optional(from_liquid.liquid, liquid_from_gas.as_ref());
        let (liquid_kept, liquid_overflow) = match liquid_combined {
            Some(liquid) => {
                let (kept, overflow) = liquid.split_by_volume(self.volume_max);
                (Some(kept), overflow)
            }
            None => (None, None),
        };
        self.liquid = liquid_kept.filter(|m| !m.is_empty());
        let liquid_volume = self.liquid.as_ref().map_or(0.0, |m| m.volume());

        let still_gas = from_gas.gas;
        let bubbles = gas_from_liquid.clone();
        let overflow = match &mut self.kind {
            ContainerKind::Flask => Overflow::deferred(move || {
                LiquidAndGas::new(liquid_overflow, combine_optional(still_gas, bubbles.as_ref()))
            }),
            ContainerKind::Canister { gas } => {
                let volume_left = self.volume_max - liquid_volume;
                if volume_left < 0.0 || near_zero(volume_left) {
                    // no room: all gas escapes without being combined now
                    *gas = None;
                    Overflow::deferred(move || {
                        LiquidAndGas::new(liquid_overflow, combine_optional(still_gas, bubbles.as_ref()))
                    })
                } else {
                    let (gas_kept, gas_overflow) = match combine_optional(still_gas, bubbles.as_ref()) {
                        Some(combined) => {
                            let (kept, overflow) = combined.split_by_volume(volume_left);
                            (Some(kept), overflow)
                        }
                        None => (None, None),
                    };
                    *gas = gas_kept.filter(|m| !m.is_empty());
                    Overflow::ready(LiquidAndGas::new(liquid_overflow, gas_overflow))
                }
            }
        };

        debug!(
            "reaction settled: liquid {:.6}ml, gas {:.6}ml of {:.6}ml",
            liquid_volume,
            self.gas().map_or(0.0, |m| m.volume()),
            self.volume_max
        );

        ReactionResult {
            liquid_from_gas,
            gas_from_liquid,
            overflow,
        }
    }

    /// Read-only view of the current contents for display layers.
    pub fn snapshot(&self) -> ContainerSnapshot {
        ContainerSnapshot {
            kind: match self.kind {
                ContainerKind::Flask => "Flask".to_string(),
                ContainerKind::Canister { .. } => "Canister".to_string(),
            },
            volume_max: self.volume_max,
            combined_mass: self.mass(),
            thermal_energy: self.thermal_energy(),
            temperature: self.temperature(),
            liquid: self.liquid().map(PhaseSnapshot::of),
            gas: self.gas().map(PhaseSnapshot::of),
        }
    }
}

impl ThermalBody for Container {
    fn mass(&self) -> f64 {
        self.liquid().map_or(0.0, |m| m.mass()) + self.gas().map_or(0.0, |m| m.mass())
    }

    fn thermal_energy(&self) -> f64 {
        self.liquid().map_or(0.0, |m| m.thermal_energy()) + self.gas().map_or(0.0, |m| m.thermal_energy())
    }

    fn volume(&self) -> f64 {
        self.liquid().map_or(0.0, |m| m.volume()) + self.gas().map_or(0.0, |m| m.volume())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSnapshot {
    pub volume: f64,
    pub slag_volume: f64,
    pub mass: f64,
    pub composition: Vec<(String, f64)>,
}

impl PhaseSnapshot {
    fn of(mixture: &Mixture) -> Self {
        Self {
            volume: mixture.volume(),
            slag_volume: mixture.slag().volume,
            mass: mixture.mass(),
            composition: mixture.composition(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    pub kind: String,
    pub volume_max: f64,
    pub combined_mass: f64,
    pub thermal_energy: f64,
    pub temperature: f64,
    pub liquid: Option<PhaseSnapshot>,
    pub gas: Option<PhaseSnapshot>,
}
