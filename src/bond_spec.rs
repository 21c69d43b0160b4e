// src/bond_spec.rs - Bond rules as a forest of increasingly specific overrides

use crate::element::{Atom, AtomId, Element};
use log::trace;
use std::fmt;

/// Index of a spec inside its [`BondForest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BondSpecId(pub usize);

/// A bonding rule for an element pair, optionally constrained by the elements
/// each side is bonded to besides its partner.
///
/// Stored canonically: `left <= right`, neighbor lists sorted. Children refine
/// this spec and are preferred whenever they match.
#[derive(Debug, Clone, PartialEq)]
pub struct BondSpec {
    pub strength: i32,
    pub left: Element,
    pub right: Element,
    pub left_neighbors: Option<Vec<Element>>,
    pub right_neighbors: Option<Vec<Element>>,
    children: Vec<BondSpecId>,
}

impl BondSpec {
    pub fn new(
        strength: i32,
        left: Element,
        right: Element,
        left_neighbors: Option<Vec<Element>>,
        right_neighbors: Option<Vec<Element>>,
    ) -> Self {
        let sorted = |list: Option<Vec<Element>>| {
            list.map(|mut elements| {
                elements.sort();
                elements
            })
        };
        let (left, right, left_neighbors, right_neighbors) = if left > right {
            (right, left, right_neighbors, left_neighbors)
        } else {
            (left, right, left_neighbors, right_neighbors)
        };
        Self {
            strength,
            left,
            right,
            left_neighbors: sorted(left_neighbors),
            right_neighbors: sorted(right_neighbors),
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[BondSpecId] {
        &self.children
    }

    /// Checks elements and neighbor context for an already oriented pair.
    fn accepts(&self, atoms: &[Atom], left: AtomId, right: AtomId) -> bool {
        if atoms[left.0].element() != &self.left || atoms[right.0].element() != &self.right {
            return false;
        }
        context_matches(self.left_neighbors.as_deref(), atoms, left, right)
            && context_matches(self.right_neighbors.as_deref(), atoms, right, left)
    }
}

impl fmt::Display for BondSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(neighbors) = &self.left_neighbors {
            for element in neighbors {
                write!(f, "{}", element)?;
            }
            f.write_str(",")?;
        }
        write!(f, "{}-{}", self.left, self.right)?;
        if let Some(neighbors) = &self.right_neighbors {
            f.write_str(",")?;
            for element in neighbors {
                write!(f, "{}", element)?;
            }
        }
        write!(f, ":{}", self.strength)
    }
}

/// The elements bonded to `atom` other than one occurrence of `partner`, sorted.
fn other_neighbor_elements<'a>(atoms: &'a [Atom], atom: AtomId, partner: AtomId) -> Vec<&'a Element> {
    let mut skipped_partner = false;
    let mut elements: Vec<&Element> = atoms[atom.0]
        .neighbors()
        .iter()
        .filter(|&&id| {
            if id == partner && !skipped_partner {
                skipped_partner = true;
                false
            } else {
                true
            }
        })
        .filter_map(|id| atoms.get(id.0).map(Atom::element))
        .collect();
    elements.sort();
    elements
}

/// An empty or absent constraint is unconstrained. Otherwise the sorted actual
/// context must equal the expected list, length included.
fn context_matches(expected: Option<&[Element]>, atoms: &[Atom], atom: AtomId, partner: AtomId) -> bool {
    let Some(expected) = expected.filter(|list| !list.is_empty()) else {
        return true;
    };
    let actual = other_neighbor_elements(atoms, atom, partner);
    actual.len() == expected.len() && actual.iter().zip(expected).all(|(a, e)| *a == e)
}

/// Forest of bond specs held in an arena. Built once during configuration
/// loading and only queried afterwards.
#[derive(Debug, Clone, Default)]
pub struct BondForest {
    nodes: Vec<BondSpec>,
    roots: Vec<BondSpecId>,
}

impl BondForest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, spec: BondSpec) -> BondSpecId {
        let id = self.push(spec);
        self.roots.push(id);
        id
    }

    /// # Panics
    ///
    /// If `parent` was not handed out by this forest.
    pub fn add_child(&mut self, parent: BondSpecId, spec: BondSpec) -> BondSpecId {
        let id = self.push(spec);
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push(&mut self, spec: BondSpec) -> BondSpecId {
        self.nodes.push(spec);
        BondSpecId(self.nodes.len() - 1)
    }

    /// `None` for an id from another forest.
    pub fn get(&self, id: BondSpecId) -> Option<&BondSpec> {
        self.nodes.get(id.0)
    }

    pub fn roots(&self) -> &[BondSpecId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolves the most specific spec governing the bond between two atoms of
    /// the same molecule. Argument order does not matter. Atom ids outside
    /// `atoms` match nothing.
    pub fn matching_bond_spec(&self, atoms: &[Atom], a: AtomId, b: AtomId) -> Option<&BondSpec> {
        self.matching_bond_spec_id(atoms, a, b).and_then(|id| self.get(id))
    }

    pub fn matching_bond_spec_id(&self, atoms: &[Atom], a: AtomId, b: AtomId) -> Option<BondSpecId> {
        if a.0 >= atoms.len() || b.0 >= atoms.len() {
            return None;
        }
        let (first, second, symmetric) = canonical_order(atoms, a, b);
        let forward = self.resolve_oriented(atoms, first, second);
        if !symmetric {
            return forward.map(|(id, _)| id);
        }
        // same element on both sides: the deeper match wins, ties keep the canonical orientation
        match (forward, self.resolve_oriented(atoms, second, first)) {
            (Some(f), Some(r)) if r.1 > f.1 => Some(r.0),
            (Some(f), _) => Some(f.0),
            (None, r) => r.map(|(id, _)| id),
        }
    }

    fn resolve_oriented(&self, atoms: &[Atom], left: AtomId, right: AtomId) -> Option<(BondSpecId, usize)> {
        self.roots
            .iter()
            .find_map(|&root| self.match_from(root, 0, atoms, left, right))
    }

    /// Depth-first: a matching child always beats its parent.
    fn match_from(
        &self,
        id: BondSpecId,
        depth: usize,
        atoms: &[Atom],
        left: AtomId,
        right: AtomId,
    ) -> Option<(BondSpecId, usize)> {
        let spec = &self.nodes[id.0];
        if !spec.accepts(atoms, left, right) {
            return None;
        }
        trace!("bond spec {} accepts atoms {:?}-{:?}", spec, left, right);
        spec.children
            .iter()
            .find_map(|&child| self.match_from(child, depth + 1, atoms, left, right))
            .or(Some((id, depth)))
    }

    /// Renders the forest in configuration notation, one spec per line,
    /// indented one space per depth level.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            self.render_node(root, 0, &mut out);
        }
        out
    }

    fn render_node(&self, id: BondSpecId, depth: usize, out: &mut String) {
        let spec = &self.nodes[id.0];
        out.push_str(&" ".repeat(depth));
        out.push_str(&spec.to_string());
        out.push('\n');
        for &child in &spec.children {
            self.render_node(child, depth + 1, out);
        }
    }
}

/// Orders a pair so the smaller element is on the left. For equal elements the
/// side with the smaller neighbor context goes left and the pair is flagged so
/// both orientations get tried.
fn canonical_order(atoms: &[Atom], a: AtomId, b: AtomId) -> (AtomId, AtomId, bool) {
    let (ea, eb) = (atoms[a.0].element(), atoms[b.0].element());
    if ea < eb {
        return (a, b, false);
    }
    if ea > eb {
        return (b, a, false);
    }
    let context_a = other_neighbor_elements(atoms, a, b);
    let context_b = other_neighbor_elements(atoms, b, a);
    if context_a <= context_b {
        (a, b, true)
    } else {
        (b, a, true)
    }
}
