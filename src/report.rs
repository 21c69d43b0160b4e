// src/report.rs - Human readable summary of a reaction

use crate::container::ReactionResult;
use crate::mixture::Mixture;
use crate::temp_utils::round_to;
use crate::thermal::ThermalBody;

const REPORT_PLACES: i32 = 6;

fn visible_volume(mixture: Option<&Mixture>) -> Option<f64> {
    mixture
        .map(|m| m.volume())
        .filter(|&volume| volume > 0.0)
        .map(|volume| round_to(volume, REPORT_PLACES))
}

/// One line per visible effect, in the order bubbling, condensing, fuming, spilling.
///
/// Forces the overflow of `result`.
pub fn reaction_lines(result: &ReactionResult) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(volume) = visible_volume(result.gas_from_liquid.as_ref()) {
        lines.push(format!("Bubbling ... ({volume}ml)"));
    }
    if let Some(volume) = visible_volume(result.liquid_from_gas.as_ref()) {
        lines.push(format!("Condensing ... ({volume}ml)"));
    }

    let overflow = result.overflow();
    if let Some(volume) = visible_volume(overflow.gas.as_ref()) {
        lines.push(format!("Fuming ... ({volume}ml)"));
    }
    if let Some(volume) = visible_volume(overflow.liquid.as_ref()) {
        lines.push(format!("Spilling ... ({volume}ml)"));
    }

    if lines.is_empty() {
        lines.push("Nothing happens ...".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond_spec::BondForest;
    use crate::container::{Container, Overflow};
    use crate::element::Element;
    use crate::mixture::LiquidAndGas;
    use crate::molecule::Molecule;
    use std::sync::Arc;

    fn molecule(name: &str, mass: f64) -> Arc<Molecule> {
        Arc::new(Molecule::from_elements(
            [Element::new(name, 1, mass)],
            Arc::new(BondForest::new()),
        ))
    }

    #[test]
    fn test_quiet_reaction() {
        let result = ReactionResult {
            liquid_from_gas: None,
            gas_from_liquid: None,
            overflow: Overflow::ready(LiquidAndGas::default()),
        };
        assert_eq!(reaction_lines(&result), vec!["Nothing happens ..."]);
    }

    #[test]
    fn test_lines_follow_effect_order() {
        let gas = Mixture::pure(molecule("V", 8.0), 1.0, 1000.0);
        let liquid = Mixture::pure(molecule("H", 40.0), 1.0, 300.0);
        let result = ReactionResult {
            liquid_from_gas: Some(liquid.clone()),
            gas_from_liquid: Some(gas.clone()),
            overflow: Overflow::ready(LiquidAndGas::new(Some(liquid.clone()), Some(gas.clone()))),
        };

        let lines = reaction_lines(&result);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Bubbling ... ("));
        assert!(lines[1].starts_with("Condensing ... ("));
        assert_eq!(lines[2], format!("Fuming ... ({}ml)", round_to(gas.volume(), 6)));
        assert_eq!(lines[3], format!("Spilling ... ({}ml)", round_to(liquid.volume(), 6)));
    }

    #[test]
    fn test_report_forces_overflow() {
        let hot = Mixture::pure(molecule("V", 8.0), 1.0, 1000.0);
        let mut flask = Container::flask(1.0e6, None);
        let result = flask.add_liquid(hot);

        assert!(!result.overflow.is_computed());
        let lines = reaction_lines(&result);
        assert!(result.overflow.is_computed());
        assert_eq!(lines[0].split(' ').next(), Some("Bubbling"));
        assert_eq!(lines[1].split(' ').next(), Some("Fuming"));
    }
}
