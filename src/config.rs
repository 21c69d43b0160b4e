//! Configuration loading: the element table and the bond rule forest.
//!
//! Text format:
//!
//! ```text
//! @atoms
//! C:4:12
//! a:1:1
//! @bonds
//! a-C:5
//!  a-C,aa:6
//! ```
//!
//! A bond line is `[leftNeighbors,]left-right[,rightNeighbors]:strength`, where
//! neighbor lists are runs of one-character element names. A line indented one
//! space deeper than the previous spec refines it. Other `@` sections are skipped.
//!
//! The same data can be given as JSON, with each rule written in bond line
//! notation and refinements nested under `children`.

use crate::bond_spec::{BondForest, BondSpec, BondSpecId};
use crate::element::Element;
use crate::molecule::MoleculeBuilder;
use log::{debug, trace, warn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("line {line}: no such element `{name}`")]
    UnknownElement { name: String, line: usize },
    #[error("line {line}: malformed atom definition `{text}`")]
    MalformedAtom { text: String, line: usize },
    #[error("line {line}: malformed bond spec `{text}`")]
    MalformedBond { text: String, line: usize },
    #[error("line {line}: invalid number `{text}`")]
    InvalidNumber { text: String, line: usize },
    #[error("line {line}: indented {indent} spaces but the enclosing spec is at depth {depth}")]
    BadIndent { indent: usize, depth: usize, line: usize },
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Fully resolved configuration. Never mutated after loading.
#[derive(Debug, Clone)]
pub struct AlchemyConfig {
    pub elements: BTreeMap<String, Element>,
    pub bonds: Arc<BondForest>,
}

impl AlchemyConfig {
    /// Loads a file, choosing the JSON reader for `.json` files.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        debug!("loading configuration from {}", path.display());
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&text),
            _ => Self::parse(&text),
        }
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut elements = BTreeMap::new();
        let mut forest = BondForest::new();
        let mut stack: Vec<BondSpecId> = Vec::new();
        let mut section = String::new();

        for (index, raw_line) in text.lines().enumerate() {
            let line_nr = index + 1;
            let line = raw_line.trim_end();
            if let Some(name) = line.strip_prefix('@') {
                section = name.trim().to_string();
                debug!("config section `{}` at line {}", section, line_nr);
                continue;
            }
            if line.trim().is_empty() {
                continue;
            }
            match section.as_str() {
                "atoms" => {
                    let element = parse_element(line.trim(), line_nr)?;
                    if let Some(previous) = elements.insert(element.name.clone(), element) {
                        warn!("line {}: element `{}` redefined", line_nr, previous.name);
                    }
                }
                "bonds" => {
                    let trimmed = line.trim_start_matches(' ');
                    let indent = line.len() - trimmed.len();
                    if indent > stack.len() {
                        return Err(ConfigError::BadIndent {
                            indent,
                            depth: stack.len(),
                            line: line_nr,
                        });
                    }
                    let spec = parse_bond_spec(trimmed, &elements, line_nr)?;
                    stack.truncate(indent);
                    let id = match stack.last() {
                        Some(&parent) => forest.add_child(parent, spec),
                        None => forest.add_root(spec),
                    };
                    stack.push(id);
                }
                _ => trace!("line {}: skipped in section `{}`", line_nr, section),
            }
        }

        debug!(
            "configuration loaded: {} elements, {} bond specs",
            elements.len(),
            forest.len()
        );
        Ok(Self {
            elements,
            bonds: Arc::new(forest),
        })
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let document: ConfigDocument = serde_json::from_str(text)?;
        let elements: BTreeMap<String, Element> = document
            .elements
            .into_iter()
            .map(|element| (element.name.clone(), element))
            .collect();

        let mut forest = BondForest::new();
        let mut rule_nr = 0;
        for rule in &document.bonds {
            add_rule(&mut forest, None, rule, &elements, &mut rule_nr)?;
        }
        Ok(Self {
            elements,
            bonds: Arc::new(forest),
        })
    }

    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.get(name)
    }

    /// Starts a molecule governed by this configuration's bond rules.
    pub fn molecule_builder(&self) -> MoleculeBuilder {
        MoleculeBuilder::new(self.bonds.clone())
    }
}

#[derive(Debug, Deserialize)]
struct ConfigDocument {
    elements: Vec<Element>,
    #[serde(default)]
    bonds: Vec<BondRuleDocument>,
}

#[derive(Debug, Deserialize)]
struct BondRuleDocument {
    rule: String,
    #[serde(default)]
    children: Vec<BondRuleDocument>,
}

/// JSON rules are numbered in document order in place of line numbers.
fn add_rule(
    forest: &mut BondForest,
    parent: Option<BondSpecId>,
    rule: &BondRuleDocument,
    elements: &BTreeMap<String, Element>,
    rule_nr: &mut usize,
) -> Result<(), ConfigError> {
    *rule_nr += 1;
    let spec = parse_bond_spec(rule.rule.trim(), elements, *rule_nr)?;
    let id = match parent {
        Some(parent) => forest.add_child(parent, spec),
        None => forest.add_root(spec),
    };
    for child in &rule.children {
        add_rule(forest, Some(id), child, elements, rule_nr)?;
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(text: &str, line: usize) -> Result<T, ConfigError> {
    text.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        text: text.to_string(),
        line,
    })
}

fn parse_element(line: &str, line_nr: usize) -> Result<Element, ConfigError> {
    let parts: Vec<&str> = line.split(':').collect();
    let [name, n_bonds, mass] = parts[..] else {
        return Err(ConfigError::MalformedAtom {
            text: line.to_string(),
            line: line_nr,
        });
    };
    if name.is_empty() {
        return Err(ConfigError::MalformedAtom {
            text: line.to_string(),
            line: line_nr,
        });
    }
    Ok(Element::new(
        name,
        parse_number(n_bonds, line_nr)?,
        parse_number(mass, line_nr)?,
    ))
}

/// Parses one bond line (without indentation) in `[nb,]left-right[,nb]:strength` form.
pub fn parse_bond_spec(
    text: &str,
    elements: &BTreeMap<String, Element>,
    line_nr: usize,
) -> Result<BondSpec, ConfigError> {
    let malformed = || ConfigError::MalformedBond {
        text: text.to_string(),
        line: line_nr,
    };
    let (spec, strength) = text.split_once(':').ok_or_else(malformed)?;
    let (left, right) = spec.split_once('-').ok_or_else(malformed)?;
    if right.contains('-') {
        return Err(malformed());
    }

    let (left_neighbors, left_name) = match left.split_once(',') {
        Some((neighbors, name)) => (Some(neighbors), name),
        None => (None, left),
    };
    let (right_name, right_neighbors) = match right.split_once(',') {
        Some((name, neighbors)) => (name, Some(neighbors)),
        None => (right, None),
    };

    let lookup = |name: &str| {
        elements
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownElement {
                name: name.to_string(),
                line: line_nr,
            })
    };
    let lookup_all = |names: Option<&str>| -> Result<Option<Vec<Element>>, ConfigError> {
        names
            .map(|names| {
                names
                    .chars()
                    .map(|c| lookup(c.encode_utf8(&mut [0; 4])))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
    };

    Ok(BondSpec::new(
        parse_number(strength, line_nr)?,
        lookup(left_name)?,
        lookup(right_name)?,
        lookup_all(left_neighbors)?,
        lookup_all(right_neighbors)?,
    ))
}
