// src/molecule.rs - Molecules: fixed sets of bonded atoms with derived physical properties

use crate::bond_spec::{BondForest, BondSpec};
use crate::constants::{BOILING_MASS_DIVISOR, GAS_EXPANSION_FACTOR, LIQUID_VOLUME_SCALE, ROOM_TEMPERATURE};
use crate::element::{Atom, AtomId, Element};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;

/// Phase a molecule takes at a given temperature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Liquid,
    Gas,
}

#[derive(Debug, Error, PartialEq)]
pub enum MoleculeError {
    #[error("no atom with index {0}")]
    UnknownAtom(usize),
    #[error("atom {0} cannot bond to itself")]
    SelfBond(usize),
    #[error("atom {index} ({element}) has no open bond slot")]
    NoOpenBond { index: usize, element: String },
}

/// Assembles a molecule atom by atom. Bonds are written as mutual neighbor
/// entries; once built the molecule is immutable.
pub struct MoleculeBuilder {
    atoms: Vec<Atom>,
    bonds: Vec<(AtomId, AtomId)>,
    bond_forest: Arc<BondForest>,
}

impl MoleculeBuilder {
    pub fn new(bond_forest: Arc<BondForest>) -> Self {
        Self {
            atoms: Vec::new(),
            bonds: Vec::new(),
            bond_forest,
        }
    }

    pub fn add_atom(&mut self, element: Element) -> AtomId {
        self.atoms.push(Atom::new(element));
        AtomId(self.atoms.len() - 1)
    }

    /// Bonds two atoms. Repeating a bond makes a double bond if slots allow.
    pub fn bond(&mut self, a: AtomId, b: AtomId) -> Result<&mut Self, MoleculeError> {
        if a == b {
            return Err(MoleculeError::SelfBond(a.0));
        }
        for id in [a, b] {
            let atom = self.atoms.get(id.0).ok_or(MoleculeError::UnknownAtom(id.0))?;
            if atom.open_bonds() == 0 {
                return Err(MoleculeError::NoOpenBond {
                    index: id.0,
                    element: atom.element().name.clone(),
                });
            }
        }
        self.atoms[a.0].push_neighbor(b);
        self.atoms[b.0].push_neighbor(a);
        self.bonds.push(if a < b { (a, b) } else { (b, a) });
        Ok(self)
    }

    pub fn build(self) -> Molecule {
        Molecule::from_parts(self.atoms, self.bonds, self.bond_forest)
    }
}

/// An immutable set of bonded atoms.
///
/// Identity is structural: same element sequence and same bonds.
#[derive(Debug, Clone)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<(AtomId, AtomId)>,
    bond_forest: Arc<BondForest>,
    mass: f64,
}

impl Molecule {
    /// A molecule of unbonded atoms.
    pub fn from_elements(elements: impl IntoIterator<Item = Element>, bond_forest: Arc<BondForest>) -> Self {
        let atoms = elements.into_iter().map(Atom::new).collect();
        Self::from_parts(atoms, Vec::new(), bond_forest)
    }

    fn from_parts(atoms: Vec<Atom>, mut bonds: Vec<(AtomId, AtomId)>, bond_forest: Arc<BondForest>) -> Self {
        bonds.sort();
        let mass = atoms.iter().map(|atom| atom.element().mass).sum();
        Self {
            atoms,
            bonds,
            bond_forest,
            mass,
        }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[(AtomId, AtomId)] {
        &self.bonds
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    // TODO derive the boiling point from bond strengths once reactions use them
    pub fn boiling_temperature(&self) -> f64 {
        self.mass * ROOM_TEMPERATURE / BOILING_MASS_DIVISOR
    }

    pub fn phase(&self, temperature: f64) -> Phase {
        if temperature <= self.boiling_temperature() {
            Phase::Liquid
        } else {
            Phase::Gas
        }
    }

    /// Volume (ml) of one molecule-mass unit at `temperature`.
    /// Grows exponentially with temperature and jumps on boiling.
    pub fn volume(&self, temperature: f64) -> f64 {
        let mass_times_bonds: f64 = self
            .atoms
            .iter()
            .map(|atom| atom.element().mass * atom.element().n_bonds as f64)
            .sum();
        let volume = mass_times_bonds * (temperature / ROOM_TEMPERATURE).exp() * LIQUID_VOLUME_SCALE
            / std::f64::consts::E;
        match self.phase(temperature) {
            Phase::Liquid => volume,
            Phase::Gas => volume * GAS_EXPANSION_FACTOR,
        }
    }

    pub fn unbonded_atoms(&self) -> Vec<AtomId> {
        (0..self.atoms.len())
            .map(AtomId)
            .filter(|id| self.atoms[id.0].open_bonds() > 0)
            .collect()
    }

    /// Each bond with the rule governing it, if one is configured.
    pub fn bond_specs(&self) -> Vec<(AtomId, AtomId, Option<&BondSpec>)> {
        self.bonds
            .iter()
            .map(|&(a, b)| (a, b, self.bond_forest.matching_bond_spec(&self.atoms, a, b)))
            .collect()
    }

    /// Strength per bond, in bond order. Unconfigured bonds count zero.
    pub fn bond_strengths(&self) -> Vec<i32> {
        self.bond_specs()
            .iter()
            .map(|(_, _, spec)| spec.map_or(0, |s| s.strength))
            .collect()
    }

    pub fn total_bond_strength(&self) -> i32 {
        self.bond_strengths().iter().sum()
    }
}

impl PartialEq for Molecule {
    fn eq(&self, other: &Self) -> bool {
        self.bonds == other.bonds
            && self.atoms.len() == other.atoms.len()
            && self
                .atoms
                .iter()
                .zip(&other.atoms)
                .all(|(a, b)| a.element() == b.element())
    }
}

impl Eq for Molecule {}

impl Hash for Molecule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for atom in &self.atoms {
            atom.element().hash(state);
        }
        self.bonds.hash(state);
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for atom in &self.atoms {
            write!(f, "{}", atom.element())?;
        }
        Ok(())
    }
}
