use alkemy::bond_spec::{BondForest, BondSpec};
use alkemy::constants::ROOM_TEMPERATURE;
use alkemy::element::Element;
use alkemy::mixture::Mixture;
use alkemy::molecule::{Molecule, MoleculeBuilder};
use alkemy::slag::Slag;
use alkemy::thermal::ThermalBody;
use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;

fn element_a() -> Element {
    Element::new("A", 1, 1.0)
}

fn element_b() -> Element {
    Element::new("B", 2, 8.0)
}

fn ab_forest() -> Arc<BondForest> {
    let mut forest = BondForest::new();
    forest.add_root(BondSpec::new(5, element_a(), element_b(), None, None));
    Arc::new(forest)
}

fn ab_molecule(forest: &Arc<BondForest>) -> Molecule {
    let mut builder = MoleculeBuilder::new(forest.clone());
    let a = builder.add_atom(element_a());
    let b = builder.add_atom(element_b());
    builder.bond(a, b).unwrap();
    builder.build()
}

fn species(forest: &Arc<BondForest>, count: usize) -> Vec<Arc<Molecule>> {
    (0..count)
        .map(|i| {
            Arc::new(Molecule::from_elements(
                [Element::new(format!("S{i}"), 2, 4.0 + i as f64 * 3.0)],
                forest.clone(),
            ))
        })
        .collect()
}

fn random_mixture(rng: &mut StdRng, molecules: &[Arc<Molecule>]) -> Mixture {
    let entries: HashMap<Arc<Molecule>, f64> = molecules
        .iter()
        .map(|molecule| (molecule.clone(), rng.random_range(0.1..5.0)))
        .collect();
    let slag = Slag::new(rng.random_range(0.0..1.0), rng.random_range(0.0..1.0));
    Mixture::new(entries, slag, 0.0).at_temperature(rng.random_range(100.0..2000.0))
}

#[test]
fn ab_scenario_combines_to_aggregated_entry() {
    let forest = ab_forest();
    let molecule = Arc::new(ab_molecule(&forest));
    assert_abs_diff_eq!(molecule.mass(), 9.0, epsilon = 1e-12);
    assert_eq!(molecule.total_bond_strength(), 5);

    let first = Mixture::pure(molecule.clone(), 1.0, ROOM_TEMPERATURE);
    let second = Mixture::pure(Arc::new(ab_molecule(&forest)), 1.0, ROOM_TEMPERATURE);
    let combined = first.combine(&second);

    assert_abs_diff_eq!(combined.mass(), 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(combined.mass_of(&molecule), 2.0, epsilon = 1e-12);
    assert_eq!(combined.species_count(), 1);
}

#[test]
fn split_by_volume_conserves_mass_and_volume() {
    let mut rng = StdRng::seed_from_u64(17);
    let forest = ab_forest();
    let molecules = species(&forest, 4);

    for _ in 0..50 {
        let mixture = random_mixture(&mut rng, &molecules);
        let ratio: f64 = rng.random_range(0.01..0.99);
        let (kept, rest) = mixture.split_by_volume(mixture.volume() * ratio);
        let rest = rest.unwrap();

        assert_abs_diff_eq!(kept.mass() + rest.mass(), mixture.mass(), epsilon = 1e-9);
        assert_abs_diff_eq!(kept.volume() + rest.volume(), mixture.volume(), epsilon = 1e-7);
        assert_abs_diff_eq!(kept.volume(), mixture.volume() * ratio, epsilon = 1e-7);
        assert_abs_diff_eq!(
            kept.thermal_energy() + rest.thermal_energy(),
            mixture.thermal_energy(),
            epsilon = 1e-7
        );
    }
}

#[test]
fn combine_adds_mass_volume_and_energy() {
    let mut rng = StdRng::seed_from_u64(3);
    let forest = ab_forest();
    let molecules = species(&forest, 5);

    for _ in 0..30 {
        // overlapping species sets, same temperature so volumes add up
        let temperature = rng.random_range(100.0..2000.0);
        let a = random_mixture(&mut rng, &molecules[..3]).at_temperature(temperature);
        let b = random_mixture(&mut rng, &molecules[2..]).at_temperature(temperature);
        let combined = a.combine(&b);

        assert_abs_diff_eq!(combined.mass(), a.mass() + b.mass(), epsilon = 1e-9);
        assert_abs_diff_eq!(combined.volume(), a.volume() + b.volume(), epsilon = 1e-6);
        assert_abs_diff_eq!(
            combined.thermal_energy(),
            a.thermal_energy() + b.thermal_energy(),
            epsilon = 1e-9
        );
    }
}

#[test]
fn traces_to_slag_is_idempotent_once_normalized() {
    let mut rng = StdRng::seed_from_u64(99);
    let forest = ab_forest();
    let molecules = species(&forest, 8);
    let mixture = random_mixture(&mut rng, &molecules);

    let normalized = mixture.clone().traces_to_slag(3);
    assert_eq!(normalized.species_count(), 3);
    assert_abs_diff_eq!(normalized.mass(), mixture.mass(), epsilon = 1e-9);
    assert_abs_diff_eq!(normalized.volume(), mixture.volume(), epsilon = 1e-7);

    let again = normalized.clone().traces_to_slag(3);
    assert_eq!(again, normalized);
}

#[test]
fn phase_separation_conserves_mass_and_energy() {
    let mut rng = StdRng::seed_from_u64(5);
    let forest = ab_forest();
    let molecules = species(&forest, 6);

    for _ in 0..30 {
        let mixture = random_mixture(&mut rng, &molecules);
        let added = rng.random_range(-5.0..50.0);
        let result = mixture.add_thermal_energy(added);

        let liquid_mass = result.liquid.as_ref().map_or(0.0, |m| m.mass());
        let gas_mass = result.gas.as_ref().map_or(0.0, |m| m.mass());
        let liquid_energy = result.liquid.as_ref().map_or(0.0, |m| m.thermal_energy());
        let gas_energy = result.gas.as_ref().map_or(0.0, |m| m.thermal_energy());
        assert_abs_diff_eq!(liquid_mass + gas_mass, mixture.mass(), epsilon = 1e-9);
        assert_abs_diff_eq!(
            liquid_energy + gas_energy,
            mixture.thermal_energy() + added,
            epsilon = 1e-9
        );
    }
}
