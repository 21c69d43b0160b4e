// src/mixture.rs - Liquids and gases: counted molecules plus inert slag and thermal energy

use crate::constants::TRACE_KEEP_DEFAULT;
use crate::molecule::{Molecule, Phase};
use crate::slag::Slag;
use crate::temp_utils::{calculate_temperature, energy_for_temperature, near_zero};
use crate::thermal::ThermalBody;
use std::collections::HashMap;
use std::sync::Arc;

pub type Liquid = Mixture;
pub type Gas = Mixture;

/// Result of a phase separation or an overflow; empty phases are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiquidAndGas {
    pub liquid: Option<Liquid>,
    pub gas: Option<Gas>,
}

impl LiquidAndGas {
    pub fn new(liquid: Option<Liquid>, gas: Option<Gas>) -> Self {
        Self {
            liquid: liquid.filter(|m| !m.is_empty()),
            gas: gas.filter(|m| !m.is_empty()),
        }
    }
}

/// Combines two optional phases, keeping whichever side is present.
pub fn combine_optional(a: Option<Mixture>, b: Option<&Mixture>) -> Option<Mixture> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.combine(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    }
}

/// Molecules mapped to their mass contribution, plus slag and thermal energy.
///
/// Immutable: every operation returns new mixtures. Mass, temperature and
/// volume are computed once on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Mixture {
    molecules: HashMap<Arc<Molecule>, f64>,
    slag: Slag,
    thermal_energy: f64,
    mass: f64,
    temperature: f64,
    volume: f64,
}

impl Mixture {
    pub fn new(molecules: HashMap<Arc<Molecule>, f64>, slag: Slag, thermal_energy: f64) -> Self {
        let mass = slag.mass + molecules.values().sum::<f64>();
        let temperature = calculate_temperature(thermal_energy, mass);
        let volume = slag.volume
            + molecules
                .iter()
                .map(|(molecule, &m)| entry_volume(molecule, m, temperature))
                .sum::<f64>();
        Self {
            molecules,
            slag,
            thermal_energy,
            mass,
            temperature,
            volume,
        }
    }

    pub fn empty() -> Self {
        Self::new(HashMap::new(), Slag::EMPTY, 0.0)
    }

    /// A single species of `mass` at `temperature`.
    pub fn pure(molecule: Arc<Molecule>, mass: f64, temperature: f64) -> Self {
        Self::new(
            HashMap::from([(molecule, mass)]),
            Slag::EMPTY,
            energy_for_temperature(mass, temperature),
        )
    }

    /// Same composition, thermal energy replaced to match `temperature`.
    pub fn at_temperature(&self, temperature: f64) -> Self {
        Self::new(
            self.molecules.clone(),
            self.slag,
            energy_for_temperature(self.mass, temperature),
        )
    }

    pub fn molecules(&self) -> impl Iterator<Item = (&Arc<Molecule>, f64)> {
        self.molecules.iter().map(|(molecule, &mass)| (molecule, mass))
    }

    pub fn mass_of(&self, molecule: &Molecule) -> f64 {
        self.molecules.get(molecule).copied().unwrap_or(0.0)
    }

    pub fn species_count(&self) -> usize {
        self.molecules.len()
    }

    pub fn slag(&self) -> Slag {
        self.slag
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty() && near_zero(self.slag.mass) && near_zero(self.slag.volume)
    }

    /// Species names with their mass, heaviest first, followed by the slag.
    pub fn composition(&self) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> = self
            .molecules
            .iter()
            .map(|(molecule, &mass)| (molecule.to_string(), mass))
            .collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.push(("Slag".to_string(), self.slag.mass));
        entries
    }

    /// Sums both mixtures entry by entry. No phase reaction is triggered; the
    /// caller applies energy afterwards to get a consistent liquid/gas pair.
    pub fn combine(&self, other: &Mixture) -> Mixture {
        let mut molecules = self.molecules.clone();
        for (molecule, &mass) in &other.molecules {
            *molecules.entry(molecule.clone()).or_insert(0.0) += mass;
        }
        Mixture::new(
            molecules,
            self.slag + other.slag,
            self.thermal_energy + other.thermal_energy,
        )
        .traces_to_slag(TRACE_KEEP_DEFAULT)
    }

    /// Applies `added_energy` and separates the result into liquid and gas by
    /// each molecule's boiling point at the new temperature.
    ///
    /// Slag stays with the liquid. Each phase gets the share of energy matching
    /// its share of the total mass, so the two halves sum to the new energy.
    pub fn add_thermal_energy(&self, added_energy: f64) -> LiquidAndGas {
        let energy = self.thermal_energy + added_energy;
        let temperature = calculate_temperature(energy, self.mass);

        // composition is unchanged: there is no reaction model yet
        let mut liquid_map = HashMap::new();
        let mut gas_map = HashMap::new();
        for (molecule, &mass) in &self.molecules {
            match molecule.phase(temperature) {
                Phase::Liquid => liquid_map.insert(molecule.clone(), mass),
                Phase::Gas => gas_map.insert(molecule.clone(), mass),
            };
        }

        let gas_mass: f64 = gas_map.values().sum();
        let gas_energy = if near_zero(self.mass) {
            0.0
        } else {
            energy * gas_mass / self.mass
        };

        let liquid = Mixture::new(liquid_map, self.slag, energy - gas_energy);
        let gas = Mixture::new(gas_map, Slag::EMPTY, gas_energy);
        LiquidAndGas::new(
            Some(liquid.traces_to_slag(TRACE_KEEP_DEFAULT)),
            Some(gas.traces_to_slag(TRACE_KEEP_DEFAULT)),
        )
    }

    /// Splits off everything beyond `target_volume`.
    ///
    /// Returns `(kept, overflow)`; `overflow` is `None` when the mixture already
    /// fits. Every molecule, the slag and the energy are divided by the same
    /// ratio, so both parts keep the original temperature.
    pub fn split_by_volume(&self, target_volume: f64) -> (Mixture, Option<Mixture>) {
        if near_zero(self.volume) {
            return (self.clone(), None);
        }
        let ratio = (target_volume / self.volume).max(0.0);
        if ratio >= 1.0 {
            return (self.clone(), None);
        }

        let mut kept = HashMap::with_capacity(self.molecules.len());
        let mut rest = HashMap::with_capacity(self.molecules.len());
        for (molecule, &mass) in &self.molecules {
            let kept_mass = mass * ratio;
            kept.insert(molecule.clone(), kept_mass);
            rest.insert(molecule.clone(), mass - kept_mass);
        }
        let kept_slag = self.slag * ratio;
        let kept_energy = self.thermal_energy * ratio;

        let kept = Mixture::new(kept, kept_slag, kept_energy).traces_to_slag(TRACE_KEEP_DEFAULT);
        let rest = Mixture::new(rest, self.slag - kept_slag, self.thermal_energy - kept_energy)
            .traces_to_slag(TRACE_KEEP_DEFAULT);
        (kept, Some(rest))
    }

    /// Drops non-positive entries and, past `keep` species, folds all but the
    /// `keep` heaviest into the slag. Mass and volume are preserved.
    pub fn traces_to_slag(self, keep: usize) -> Mixture {
        let has_empty_entries = self.molecules.values().any(|&mass| mass <= 0.0);
        if !has_empty_entries && self.molecules.len() <= keep {
            return self;
        }

        let mut entries: Vec<(Arc<Molecule>, f64)> = self
            .molecules
            .into_iter()
            .filter(|&(_, mass)| mass > 0.0)
            .collect();
        let mut slag = self.slag;
        if entries.len() > keep {
            entries.sort_by(|a, b| b.1.total_cmp(&a.1));
            for (molecule, mass) in entries.drain(keep..) {
                slag = slag + Slag::new(mass, entry_volume(&molecule, mass, self.temperature));
            }
        }
        Mixture::new(entries.into_iter().collect(), slag, self.thermal_energy)
    }
}

impl ThermalBody for Mixture {
    fn mass(&self) -> f64 {
        self.mass
    }

    fn thermal_energy(&self) -> f64 {
        self.thermal_energy
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn temperature(&self) -> f64 {
        self.temperature
    }
}

/// Volume taken by `mass` worth of `molecule` at `temperature`.
fn entry_volume(molecule: &Molecule, mass: f64, temperature: f64) -> f64 {
    if near_zero(molecule.mass()) {
        0.0
    } else {
        mass / molecule.mass() * molecule.volume(temperature)
    }
}
