use alkemy::config::AlchemyConfig;
use alkemy::element::AtomId;
use alkemy::molecule::{Molecule, MoleculeBuilder};

const CONFIG: &str = "\
@atoms
a:1:1
C:2:16
X:4:12
@bonds
a-C:5
 a-C,a:6
a-X:4
 a-X,aaa:5
C-X:3
 a,C-X:4
  a,C-X,aaa:7
C-C:2
 a,C-C:3
";

fn config() -> AlchemyConfig {
    AlchemyConfig::parse(CONFIG).unwrap()
}

/// A `center` atom bonded to one atom per entry of `arms`.
fn centered(config: &AlchemyConfig, center: &str, arms: &[&str]) -> (Molecule, AtomId, Vec<AtomId>) {
    let mut builder: MoleculeBuilder = config.molecule_builder();
    let center_id = builder.add_atom(config.element(center).unwrap().clone());
    let arm_ids: Vec<AtomId> = arms
        .iter()
        .map(|name| builder.add_atom(config.element(name).unwrap().clone()))
        .collect();
    for &arm in &arm_ids {
        builder.bond(center_id, arm).unwrap();
    }
    (builder.build(), center_id, arm_ids)
}

fn strength(molecule: &Molecule, a: AtomId, b: AtomId) -> Option<i32> {
    molecule
        .bond_specs()
        .into_iter()
        .find(|&(x, y, _)| (x, y) == (a, b) || (x, y) == (b, a))
        .and_then(|(_, _, spec)| spec.map(|s| s.strength))
}

#[test]
fn child_wins_only_when_its_context_matches() {
    let config = config();

    // water: C carries one other a besides its partner
    let (water, center, arms) = centered(&config, "C", &["a", "a"]);
    assert_eq!(strength(&water, arms[0], center), Some(6));

    // a lone a-C pair only satisfies the parent
    let (pair, center, arms) = centered(&config, "C", &["a"]);
    assert_eq!(strength(&pair, arms[0], center), Some(5));
}

#[test]
fn exact_neighbor_count_required() {
    let config = config();

    let (methane, center, arms) = centered(&config, "X", &["a", "a", "a", "a"]);
    assert_eq!(strength(&methane, arms[0], center), Some(5));

    // two other arms: the child needs exactly three
    let (short, center, arms) = centered(&config, "X", &["a", "a", "a"]);
    assert_eq!(strength(&short, arms[0], center), Some(4));
}

/// a-C-X with `x_arms` a atoms on the X.
fn capped_chain(config: &AlchemyConfig, x_arms: usize) -> (Molecule, AtomId, AtomId) {
    let a = config.element("a").unwrap().clone();
    let mut builder = config.molecule_builder();
    let cap = builder.add_atom(a.clone());
    let c = builder.add_atom(config.element("C").unwrap().clone());
    let x = builder.add_atom(config.element("X").unwrap().clone());
    builder.bond(cap, c).unwrap().bond(c, x).unwrap();
    for _ in 0..x_arms {
        let arm = builder.add_atom(a.clone());
        builder.bond(x, arm).unwrap();
    }
    (builder.build(), c, x)
}

#[test]
fn deepest_matching_descendant_wins() {
    let config = config();

    let (full, c, x) = capped_chain(&config, 3);
    assert_eq!(strength(&full, c, x), Some(7));

    let (partial, c, x) = capped_chain(&config, 2);
    assert_eq!(strength(&partial, c, x), Some(4));

    // without the cap the C side has no context at all
    let (uncapped, x, arms) = centered(&config, "X", &["C", "a", "a", "a"]);
    assert_eq!(strength(&uncapped, arms[0], x), Some(3));
}

#[test]
fn resolution_is_commutative() {
    let config = config();
    let (molecule, center, arms) = centered(&config, "X", &["a", "a", "a", "C"]);
    let atoms = molecule.atoms();

    for &arm in &arms {
        assert_eq!(
            config.bonds.matching_bond_spec_id(atoms, arm, center),
            config.bonds.matching_bond_spec_id(atoms, center, arm)
        );
    }
    let (chain, c, x) = capped_chain(&config, 3);
    assert_eq!(
        config.bonds.matching_bond_spec(chain.atoms(), x, c).map(|s| s.strength),
        Some(7)
    );
}

#[test]
fn same_element_pair_resolves_either_way() {
    let config = config();
    let a = config.element("a").unwrap().clone();
    let c = config.element("C").unwrap().clone();

    // a-C-C: only the first C has an a besides its partner
    let mut builder = config.molecule_builder();
    let ia = builder.add_atom(a);
    let c1 = builder.add_atom(c.clone());
    let c2 = builder.add_atom(c);
    builder.bond(ia, c1).unwrap().bond(c1, c2).unwrap();
    let molecule = builder.build();

    assert_eq!(strength(&molecule, c1, c2), Some(3));
    assert_eq!(strength(&molecule, c2, c1), Some(3));
    let atoms = molecule.atoms();
    assert_eq!(
        config.bonds.matching_bond_spec_id(atoms, c1, c2),
        config.bonds.matching_bond_spec_id(atoms, c2, c1)
    );
}

#[test]
fn render_tree_round_trips_the_bonds_section() {
    let config = config();
    let source = CONFIG.split("@bonds\n").nth(1).unwrap();
    assert_eq!(config.bonds.render_tree(), source);
}
