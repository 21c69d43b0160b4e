// src/network.rs - Named containers wired together by pipes that carry overflow

use crate::container::{Container, ReactionResult};
use crate::mixture::{Gas, Liquid, LiquidAndGas, Mixture, combine_optional};
use crate::molecule::Phase;
use crate::thermal::ThermalBody;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum NetworkError {
    #[error("no container named `{0}`")]
    UnknownContainer(String),
    #[error("a container named `{0}` already exists")]
    DuplicateContainer(String),
    #[error("container `{0}` cannot pipe into itself")]
    SelfPipe(String),
    #[error("`{from}` already pipes {medium:?} to `{to}`")]
    DuplicatePipe { from: String, medium: Phase, to: String },
}

/// A pipe moves one medium of a container's overflow into another container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipe {
    pub source: String,
    pub medium: Phase,
    pub sink: String,
}

/// One reaction that happened somewhere in the network.
#[derive(Debug)]
pub struct NetworkReaction {
    pub container: String,
    /// Pipes crossed before this reaction, 0 for the container acted on
    pub hops: usize,
    pub result: ReactionResult,
}

/// Containers by name plus the pipes between them.
///
/// Every container has at most one sink per medium. Overflow without a pipe
/// leaves the network and is accumulated as vented.
#[derive(Debug, Default)]
pub struct PipeNetwork {
    containers: BTreeMap<String, Container>,
    pipes: HashMap<(String, Phase), String>,
    vented: LiquidAndGas,
}

impl PipeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_container(&mut self, name: impl Into<String>, container: Container) -> Result<(), NetworkError> {
        let name = name.into();
        if self.containers.contains_key(&name) {
            return Err(NetworkError::DuplicateContainer(name));
        }
        self.containers.insert(name, container);
        Ok(())
    }

    pub fn container(&self, name: &str) -> Option<&Container> {
        self.containers.get(name)
    }

    pub fn containers(&self) -> impl Iterator<Item = (&str, &Container)> {
        self.containers.iter().map(|(name, container)| (name.as_str(), container))
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Wires the `medium` overflow of `source` into `sink`.
    pub fn connect(&mut self, source: &str, medium: Phase, sink: &str) -> Result<(), NetworkError> {
        for name in [source, sink] {
            if !self.containers.contains_key(name) {
                return Err(NetworkError::UnknownContainer(name.to_string()));
            }
        }
        if source == sink {
            return Err(NetworkError::SelfPipe(source.to_string()));
        }
        let key = (source.to_string(), medium);
        if let Some(existing) = self.pipes.get(&key) {
            return Err(NetworkError::DuplicatePipe {
                from: source.to_string(),
                medium,
                to: existing.clone(),
            });
        }
        debug!("piping {:?} from `{}` to `{}`", medium, source, sink);
        self.pipes.insert(key, sink.to_string());
        Ok(())
    }

    pub fn sink(&self, source: &str, medium: Phase) -> Option<&str> {
        self.pipes.get(&(source.to_string(), medium)).map(String::as_str)
    }

    /// All pipes, ordered by source then medium.
    pub fn pipes(&self) -> Vec<Pipe> {
        let mut pipes: Vec<Pipe> = self
            .pipes
            .iter()
            .map(|((source, medium), sink)| Pipe {
                source: source.clone(),
                medium: *medium,
                sink: sink.clone(),
            })
            .collect();
        pipes.sort_by(|a, b| {
            a.source
                .cmp(&b.source)
                .then_with(|| (a.medium == Phase::Gas).cmp(&(b.medium == Phase::Gas)))
        });
        pipes
    }

    /// Everything that overflowed with nowhere to go.
    pub fn vented(&self) -> &LiquidAndGas {
        &self.vented
    }

    /// Mass held by all containers plus everything vented.
    pub fn total_mass(&self) -> f64 {
        let held: f64 = self.containers.values().map(|c| c.mass()).sum();
        let vented = self.vented.liquid.as_ref().map_or(0.0, |m| m.mass())
            + self.vented.gas.as_ref().map_or(0.0, |m| m.mass());
        held + vented
    }

    pub fn add_liquid(&mut self, name: &str, mixture: Liquid) -> Result<Vec<NetworkReaction>, NetworkError> {
        self.act(name, |container| container.add_liquid(mixture))
    }

    pub fn add_gas(&mut self, name: &str, mixture: Gas) -> Result<Vec<NetworkReaction>, NetworkError> {
        self.act(name, |container| container.add_gas(mixture))
    }

    pub fn heat_to(&mut self, name: &str, temperature: f64) -> Result<Vec<NetworkReaction>, NetworkError> {
        self.act(name, |container| container.heat_to(temperature))
    }

    pub fn add_thermal_energy(&mut self, name: &str, energy: f64) -> Result<Vec<NetworkReaction>, NetworkError> {
        self.act(name, |container| container.add_thermal_energy(energy))
    }

    /// Runs `reaction` on one container and routes whatever overflows,
    /// returning every reaction in the order it happened.
    fn act(
        &mut self,
        name: &str,
        reaction: impl FnOnce(&mut Container) -> ReactionResult,
    ) -> Result<Vec<NetworkReaction>, NetworkError> {
        let container = self
            .containers
            .get_mut(name)
            .ok_or_else(|| NetworkError::UnknownContainer(name.to_string()))?;
        let result = reaction(container);
        let mut reactions = Vec::new();
        self.route(name, result, 0, &mut reactions);
        Ok(reactions)
    }

    /// Depth-first: the liquid overflow cascades fully before the gas does.
    fn route(&mut self, name: &str, result: ReactionResult, hops: usize, reactions: &mut Vec<NetworkReaction>) {
        let overflow = result.overflow().clone();
        reactions.push(NetworkReaction {
            container: name.to_string(),
            hops,
            result,
        });

        let flows = [(Phase::Liquid, overflow.liquid), (Phase::Gas, overflow.gas)];
        for (medium, mixture) in flows {
            let Some(mixture) = mixture else {
                continue;
            };
            let Some(sink) = self.sink(name, medium).map(str::to_string) else {
                self.vent(medium, mixture);
                continue;
            };
            if hops >= self.containers.len() {
                warn!("hop limit reached routing {:?} from `{}`, venting it", medium, name);
                self.vent(medium, mixture);
                continue;
            }
            let Some(container) = self.containers.get_mut(&sink) else {
                self.vent(medium, mixture);
                continue;
            };
            debug!(
                "routing {:.6}ml of {:?} from `{}` to `{}`",
                mixture.volume(),
                medium,
                name,
                sink
            );
            let result = match medium {
                Phase::Liquid => container.add_liquid(mixture),
                Phase::Gas => container.add_gas(mixture),
            };
            self.route(&sink, result, hops + 1, reactions);
        }
    }

    fn vent(&mut self, medium: Phase, mixture: Mixture) {
        debug!("venting {:.6}ml of {:?}", mixture.volume(), medium);
        let slot = match medium {
            Phase::Liquid => &mut self.vented.liquid,
            Phase::Gas => &mut self.vented.gas,
        };
        *slot = combine_optional(slot.take(), Some(&mixture));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond_spec::BondForest;
    use crate::constants::ROOM_TEMPERATURE;
    use crate::element::Element;
    use crate::molecule::Molecule;
    use approx::assert_abs_diff_eq;
    use std::sync::Arc;

    // boils at 640K
    fn volatile() -> Arc<Molecule> {
        Arc::new(Molecule::from_elements(
            [Element::new("V", 1, 8.0)],
            Arc::new(BondForest::new()),
        ))
    }

    fn network() -> PipeNetwork {
        let mut network = PipeNetwork::new();
        network.add_container("still", Container::flask(1.0e6, None)).unwrap();
        network
            .add_container("tank", Container::canister(1.0e9, None, None))
            .unwrap();
        network
    }

    #[test]
    fn test_connect_validates_wiring() {
        let mut network = network();
        assert_eq!(
            network.connect("still", Phase::Gas, "nowhere"),
            Err(NetworkError::UnknownContainer("nowhere".to_string()))
        );
        assert_eq!(
            network.connect("still", Phase::Gas, "still"),
            Err(NetworkError::SelfPipe("still".to_string()))
        );
        network.connect("still", Phase::Gas, "tank").unwrap();
        assert!(matches!(
            network.connect("still", Phase::Gas, "tank"),
            Err(NetworkError::DuplicatePipe { .. })
        ));
        network.connect("still", Phase::Liquid, "tank").unwrap();
        assert_eq!(network.sink("still", Phase::Gas), Some("tank"));
        assert_eq!(network.pipes().len(), 2);
        assert_eq!(network.pipes()[0].medium, Phase::Liquid);
        assert_eq!(
            network.add_container("tank", Container::flask(1.0, None)),
            Err(NetworkError::DuplicateContainer("tank".to_string()))
        );
    }

    #[test]
    fn test_fumes_routed_to_gas_sink() {
        let mut network = network();
        network.connect("still", Phase::Gas, "tank").unwrap();

        let hot = Mixture::pure(volatile(), 2.0, 1000.0);
        let reactions = network.add_liquid("still", hot).unwrap();

        assert_eq!(reactions.len(), 2);
        assert_eq!(reactions[0].container, "still");
        assert_eq!(reactions[1].container, "tank");
        assert_eq!(reactions[1].hops, 1);
        let tank = network.container("tank").unwrap();
        assert_abs_diff_eq!(tank.gas().unwrap().mass(), 2.0, epsilon = 1e-9);
        assert!(network.vented().gas.is_none());
    }

    #[test]
    fn test_unpiped_overflow_is_vented() {
        let mut network = network();
        let hot = Mixture::pure(volatile(), 2.0, 1000.0);
        network.add_liquid("still", hot).unwrap();

        assert_abs_diff_eq!(network.vented().gas.as_ref().unwrap().mass(), 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(network.total_mass(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cycle_stops_at_hop_limit() {
        let mut network = PipeNetwork::new();
        network.add_container("a", Container::flask(1.0e-3, None)).unwrap();
        network.add_container("b", Container::flask(1.0e-3, None)).unwrap();
        network.connect("a", Phase::Liquid, "b").unwrap();
        network.connect("b", Phase::Liquid, "a").unwrap();

        let liquid = Mixture::pure(volatile(), 2.0, ROOM_TEMPERATURE);
        let reactions = network.add_liquid("a", liquid).unwrap();

        assert_eq!(reactions.len(), 3);
        assert_eq!(reactions.last().map(|r| r.hops), Some(2));
        assert!(network.vented().liquid.is_some());
        assert_abs_diff_eq!(network.total_mass(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unknown_container() {
        let mut network = network();
        assert!(matches!(
            network.heat_to("cellar", 400.0),
            Err(NetworkError::UnknownContainer(_))
        ));
    }
}
