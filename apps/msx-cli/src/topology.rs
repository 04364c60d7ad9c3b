//! Hand-authored network topology file.
//!
//! The chemistry input file this tool runs never carries node/link
//! geometry — that lives in the EPANET hydraulic project, and building a
//! hydraulic solver is out of scope here (spec §1 in the upstream design).
//! This module fills the gap with a small human-edited YAML file, loaded
//! once at startup and turned into the crate's own [`NetworkBuilder`],
//! independent of the wire format the physics crates use internally.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use msx_network::builder::NetworkBuilder;
use msx_network::tank::MixingModel;

#[derive(Debug, Deserialize)]
pub struct TopologyFile {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default)]
    pub tanks: Vec<TankSpec>,
}

#[derive(Debug, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub report: bool,
}

#[derive(Debug, Deserialize)]
pub struct LinkSpec {
    pub name: String,
    pub start: String,
    pub end: String,
    pub diameter: f64,
    pub length: f64,
    pub roughness: f64,
    #[serde(default)]
    pub report: bool,
}

#[derive(Debug, Deserialize)]
pub struct TankSpec {
    pub node: String,
    #[serde(default)]
    pub mixing_model: MixingModelSpec,
    pub area: f64,
    pub init_volume: f64,
    #[serde(default)]
    pub mix_compartment_volume: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixingModelSpec {
    #[default]
    CompleteMix,
    TwoCompartment,
    Fifo,
    Lifo,
}

impl From<MixingModelSpec> for MixingModel {
    fn from(m: MixingModelSpec) -> Self {
        match m {
            MixingModelSpec::CompleteMix => MixingModel::CompleteMix,
            MixingModelSpec::TwoCompartment => MixingModel::TwoCompartment,
            MixingModelSpec::Fifo => MixingModel::Fifo,
            MixingModelSpec::Lifo => MixingModel::Lifo,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("failed to read topology file {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse topology file {path}: {source}")]
    Parse { path: String, source: serde_yaml::Error },
    #[error("link '{link}' references undefined node '{node}'")]
    UndefinedNode { link: String, node: String },
    #[error("tank references undefined node '{0}'")]
    UndefinedTankNode(String),
}

pub fn load(path: &Path) -> Result<NetworkBuilder, TopologyError> {
    let text = fs::read_to_string(path).map_err(|source| TopologyError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let file: TopologyFile = serde_yaml::from_str(&text).map_err(|source| TopologyError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    build(file)
}

fn build(file: TopologyFile) -> Result<NetworkBuilder, TopologyError> {
    let mut builder = NetworkBuilder::new();
    for node in &file.nodes {
        builder.add_node(node.name.clone(), node.report);
    }
    for link in &file.links {
        let start = builder.find_node(&link.start).ok_or_else(|| TopologyError::UndefinedNode {
            link: link.name.clone(),
            node: link.start.clone(),
        })?;
        let end = builder.find_node(&link.end).ok_or_else(|| TopologyError::UndefinedNode {
            link: link.name.clone(),
            node: link.end.clone(),
        })?;
        builder.add_link(
            link.name.clone(),
            start,
            end,
            link.diameter,
            link.length,
            link.roughness,
            link.report,
        );
    }
    for tank in &file.tanks {
        let node = builder
            .find_node(&tank.node)
            .ok_or_else(|| TopologyError::UndefinedTankNode(tank.node.clone()))?;
        builder.add_tank(
            node,
            tank.mixing_model.into(),
            tank.area,
            tank.init_volume,
            tank.mix_compartment_volume,
        );
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
nodes:
  - name: N1
    report: true
  - name: N2
    report: true
links:
  - name: P1
    start: N1
    end: N2
    diameter: 1.0
    length: 1000.0
    roughness: 100.0
    report: true
tanks:
  - node: N2
    mixing_model: complete_mix
    area: 100.0
    init_volume: 500.0
"#;

    #[test]
    fn builds_a_network_from_yaml() {
        let file: TopologyFile = serde_yaml::from_str(YAML).unwrap();
        let builder = build(file).unwrap();
        assert_eq!(builder.node_count(), 2);
        assert_eq!(builder.link_count(), 1);
    }

    #[test]
    fn rejects_a_link_to_an_undefined_node() {
        let file = TopologyFile {
            nodes: vec![NodeSpec {
                name: "N1".to_string(),
                report: false,
            }],
            links: vec![LinkSpec {
                name: "P1".to_string(),
                start: "N1".to_string(),
                end: "GHOST".to_string(),
                diameter: 1.0,
                length: 1.0,
                roughness: 100.0,
                report: false,
            }],
            tanks: vec![],
        };
        let err = build(file).unwrap_err();
        assert!(matches!(err, TopologyError::UndefinedNode { .. }));
    }
}
