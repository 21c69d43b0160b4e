// src/element.rs - Chemical elements and the atoms built from them

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An immutable chemical element as read from configuration.
///
/// Elements order by their lower-cased name; bond specs are stored with
/// `left <= right` under this ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub n_bonds: u32,
    pub mass: f64,
}

impl Element {
    pub fn new(name: impl Into<String>, n_bonds: u32, mass: f64) -> Self {
        Self {
            name: name.into(),
            n_bonds,
            mass,
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.n_bonds == other.n_bonds
            && self.mass.to_bits() == other.mass.to_bits()
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.n_bonds.hash(state);
        self.mass.to_bits().hash(state);
    }
}

impl Ord for Element {
    fn cmp(&self, other: &Self) -> Ordering {
        // case-insensitive name first; the remaining keys only break ties between
        // elements that differ in case or properties, keeping Ord consistent with Eq
        self.name
            .to_lowercase()
            .cmp(&other.name.to_lowercase())
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.n_bonds.cmp(&other.n_bonds))
            .then_with(|| self.mass.total_cmp(&other.mass))
    }
}

impl PartialOrd for Element {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Index of an atom inside the molecule that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(pub usize);

/// An atom instance. Bonds are mutual neighbor entries, not ownership.
#[derive(Debug, Clone)]
pub struct Atom {
    element: Element,
    neighbors: Vec<AtomId>,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            neighbors: Vec::new(),
        }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn neighbors(&self) -> &[AtomId] {
        &self.neighbors
    }

    pub fn open_bonds(&self) -> u32 {
        self.element
            .n_bonds
            .saturating_sub(self.neighbors.len() as u32)
    }

    pub(crate) fn push_neighbor(&mut self, id: AtomId) {
        self.neighbors.push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_ignores_case() {
        let a = Element::new("a", 1, 1.0);
        let b_upper = Element::new("B", 2, 8.0);
        let c = Element::new("c", 4, 12.0);

        assert!(a < b_upper);
        assert!(b_upper < c);

        let mut sorted = vec![c.clone(), a.clone(), b_upper.clone()];
        sorted.sort();
        assert_eq!(sorted, vec![a, b_upper, c]);
    }

    #[test]
    fn test_identity_by_value() {
        assert_eq!(Element::new("O", 2, 16.0), Element::new("O", 2, 16.0));
        assert_ne!(Element::new("O", 2, 16.0), Element::new("o", 2, 16.0));
        assert_ne!(Element::new("O", 2, 16.0), Element::new("O", 2, 17.0));
    }

    #[test]
    fn test_open_bonds() {
        let mut atom = Atom::new(Element::new("C", 4, 12.0));
        assert_eq!(atom.open_bonds(), 4);
        atom.push_neighbor(AtomId(1));
        atom.push_neighbor(AtomId(2));
        assert_eq!(atom.open_bonds(), 2);
    }
}
