//! Incremental network builder.
//!
//! Accumulate entities with `add_*`, then call `build()` to validate and
//! freeze everything into a `Network`. Per-species and per-parameter
//! overrides on nodes/links/tanks are collected sparsely here and
//! densified at `build()` time, once the final species/parameter counts
//! are known.

use std::collections::HashMap;

use msx_core::{ConstId, LinkId, NodeId, ParamId, PatternId, SpeciesId, TankId, TermId};
use msx_expr::MathExpr;

use crate::error::{NetworkError, NetworkResult};
use crate::link::Link;
use crate::node::Node;
use crate::param::{Constant, Parameter};
use crate::pattern::Pattern;
use crate::species::{Species, SpeciesKind, ZoneExpr};
use crate::source::Source;
use crate::tank::{MixingModel, Tank};
use crate::term::Term;
use crate::validate;

#[derive(Default)]
struct NodeDraft {
    name: String,
    sources: Vec<Source>,
    init_qual: HashMap<SpeciesId, f64>,
    tank: Option<TankId>,
    report: bool,
}

#[derive(Default)]
struct LinkDraft {
    name: String,
    start_node: Option<NodeId>,
    end_node: Option<NodeId>,
    diameter: f64,
    length: f64,
    roughness: f64,
    init_qual: HashMap<SpeciesId, f64>,
    param_values: HashMap<ParamId, f64>,
    report: bool,
}

#[derive(Default)]
struct TankDraft {
    node: Option<NodeId>,
    mixing_model: MixingModel,
    area: f64,
    init_volume: f64,
    mix_compartment_volume: f64,
    param_values: HashMap<ParamId, f64>,
}

#[derive(Default)]
pub struct NetworkBuilder {
    species: Vec<Species>,
    terms: Vec<Term>,
    parameters: Vec<Parameter>,
    constants: Vec<Constant>,
    patterns: Vec<Pattern>,
    nodes: Vec<NodeDraft>,
    links: Vec<LinkDraft>,
    tanks: Vec<TankDraft>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_species(
        &mut self,
        name: impl Into<String>,
        kind: SpeciesKind,
        tolerances: msx_core::Tolerances,
        report_precision: u8,
        report: bool,
    ) -> SpeciesId {
        let id = SpeciesId::from_index(self.species.len() as u32);
        self.species.push(Species {
            name: name.into(),
            kind,
            tolerances,
            pipe_expr: ZoneExpr::none(),
            tank_expr: ZoneExpr::none(),
            diffusivity: 0.0,
            report_precision,
            report,
        });
        id
    }

    pub fn set_diffusivity(&mut self, species: SpeciesId, diffusivity: f64) {
        if let Some(s) = self.species.get_mut(species.index_usize()) {
            s.diffusivity = diffusivity;
        }
    }

    /// Overwrite a species' integration tolerances, used to back-fill the
    /// project-wide `DefAtol`/`DefRtol` ([OPTIONS] RTOL/ATOL) once parsing
    /// has seen the whole file, for species whose `[SPECIES]` line omitted
    /// its own `aTol rTol` pair.
    pub fn set_species_tolerances(&mut self, species: SpeciesId, tolerances: msx_core::Tolerances) {
        if let Some(s) = self.species.get_mut(species.index_usize()) {
            s.tolerances = tolerances;
        }
    }

    pub fn set_pipe_expr(&mut self, species: SpeciesId, kind: crate::species::ExprKind, expr: MathExpr) {
        if let Some(s) = self.species.get_mut(species.index_usize()) {
            s.pipe_expr = ZoneExpr::new(kind, expr);
        }
    }

    pub fn set_tank_expr(&mut self, species: SpeciesId, kind: crate::species::ExprKind, expr: MathExpr) {
        if let Some(s) = self.species.get_mut(species.index_usize()) {
            s.tank_expr = ZoneExpr::new(kind, expr);
        }
    }

    pub fn add_term(&mut self, name: impl Into<String>, expr: MathExpr) -> TermId {
        let id = TermId::from_index(self.terms.len() as u32);
        self.terms.push(Term {
            name: name.into(),
            expr,
        });
        id
    }

    pub fn add_parameter(&mut self, name: impl Into<String>, default_value: f64) -> ParamId {
        let id = ParamId::from_index(self.parameters.len() as u32);
        self.parameters.push(Parameter {
            name: name.into(),
            default_value,
        });
        id
    }

    pub fn add_constant(&mut self, name: impl Into<String>, value: f64) -> ConstId {
        let id = ConstId::from_index(self.constants.len() as u32);
        self.constants.push(Constant {
            name: name.into(),
            value,
        });
        id
    }

    pub fn add_pattern(&mut self, name: impl Into<String>, multipliers: Vec<f64>) -> PatternId {
        let id = PatternId::from_index(self.patterns.len() as u32);
        self.patterns.push(Pattern {
            name: name.into(),
            multipliers,
        });
        id
    }

    pub fn add_node(&mut self, name: impl Into<String>, report: bool) -> NodeId {
        let id = NodeId::from_index(self.nodes.len() as u32);
        self.nodes.push(NodeDraft {
            name: name.into(),
            report,
            ..Default::default()
        });
        id
    }

    pub fn set_node_init_qual(&mut self, node: NodeId, species: SpeciesId, value: f64) {
        if let Some(n) = self.nodes.get_mut(node.index_usize()) {
            n.init_qual.insert(species, value);
        }
    }

    pub fn add_source(&mut self, node: NodeId, source: Source) {
        if let Some(n) = self.nodes.get_mut(node.index_usize()) {
            n.sources.push(source);
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_link(
        &mut self,
        name: impl Into<String>,
        start_node: NodeId,
        end_node: NodeId,
        diameter: f64,
        length: f64,
        roughness: f64,
        report: bool,
    ) -> LinkId {
        let id = LinkId::from_index(self.links.len() as u32);
        self.links.push(LinkDraft {
            name: name.into(),
            start_node: Some(start_node),
            end_node: Some(end_node),
            diameter,
            length,
            roughness,
            report,
            ..Default::default()
        });
        id
    }

    pub fn set_link_init_qual(&mut self, link: LinkId, species: SpeciesId, value: f64) {
        if let Some(l) = self.links.get_mut(link.index_usize()) {
            l.init_qual.insert(species, value);
        }
    }

    pub fn set_link_param(&mut self, link: LinkId, param: ParamId, value: f64) {
        if let Some(l) = self.links.get_mut(link.index_usize()) {
            l.param_values.insert(param, value);
        }
    }

    pub fn add_tank(
        &mut self,
        node: NodeId,
        mixing_model: MixingModel,
        area: f64,
        init_volume: f64,
        mix_compartment_volume: f64,
    ) -> TankId {
        let id = TankId::from_index(self.tanks.len() as u32);
        self.tanks.push(TankDraft {
            node: Some(node),
            mixing_model,
            area,
            init_volume,
            mix_compartment_volume,
            param_values: HashMap::new(),
        });
        if let Some(n) = self.nodes.get_mut(node.index_usize()) {
            n.tank = Some(id);
        }
        id
    }

    pub fn set_tank_param(&mut self, tank: TankId, param: ParamId, value: f64) {
        if let Some(t) = self.tanks.get_mut(tank.index_usize()) {
            t.param_values.insert(param, value);
        }
    }

    /// Look up a node already added to this builder by name. Used by
    /// `msx-input` to resolve `[QUALITY]`/`[SOURCES]` references against a
    /// topology the caller populated before parsing the chemistry file.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId::from_index(i as u32))
    }

    pub fn find_link(&self, name: &str) -> Option<LinkId> {
        self.links
            .iter()
            .position(|l| l.name == name)
            .map(|i| LinkId::from_index(i as u32))
    }

    pub fn find_species(&self, name: &str) -> Option<SpeciesId> {
        self.species
            .iter()
            .position(|s| s.name == name)
            .map(|i| SpeciesId::from_index(i as u32))
    }

    pub fn find_term(&self, name: &str) -> Option<TermId> {
        self.terms
            .iter()
            .position(|t| t.name == name)
            .map(|i| TermId::from_index(i as u32))
    }

    pub fn find_parameter(&self, name: &str) -> Option<ParamId> {
        self.parameters
            .iter()
            .position(|p| p.name == name)
            .map(|i| ParamId::from_index(i as u32))
    }

    pub fn find_constant(&self, name: &str) -> Option<ConstId> {
        self.constants
            .iter()
            .position(|c| c.name == name)
            .map(|i| ConstId::from_index(i as u32))
    }

    pub fn find_pattern(&self, name: &str) -> Option<PatternId> {
        self.patterns
            .iter()
            .position(|p| p.name == name)
            .map(|i| PatternId::from_index(i as u32))
    }

    /// The tank index associated with `node`, if `node` was previously
    /// passed to [`NetworkBuilder::add_tank`].
    pub fn tank_of_node(&self, node: NodeId) -> Option<TankId> {
        self.nodes.get(node.index_usize()).and_then(|n| n.tank)
    }

    pub fn extend_pattern(&mut self, pattern: PatternId, values: impl IntoIterator<Item = f64>) {
        if let Some(p) = self.patterns.get_mut(pattern.index_usize()) {
            p.multipliers.extend(values);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId::from_index(i as u32))
    }

    pub fn link_ids(&self) -> impl Iterator<Item = LinkId> + '_ {
        (0..self.links.len()).map(|i| LinkId::from_index(i as u32))
    }

    pub fn species_ids(&self) -> impl Iterator<Item = SpeciesId> + '_ {
        (0..self.species.len()).map(|i| SpeciesId::from_index(i as u32))
    }

    pub fn set_node_report(&mut self, node: NodeId, report: bool) {
        if let Some(n) = self.nodes.get_mut(node.index_usize()) {
            n.report = report;
        }
    }

    pub fn set_link_report(&mut self, link: LinkId, report: bool) {
        if let Some(l) = self.links.get_mut(link.index_usize()) {
            l.report = report;
        }
    }

    pub fn set_species_report(&mut self, species: SpeciesId, report: bool, precision: Option<u8>) {
        if let Some(s) = self.species.get_mut(species.index_usize()) {
            s.report = report;
            if let Some(p) = precision {
                s.report_precision = p;
            }
        }
    }

    pub fn build(self) -> NetworkResult<crate::network::Network> {
        let n_species = self.species.len();

        let mut node_names = HashMap::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for draft in self.nodes {
            if node_names.insert(draft.name.clone(), NodeId::from_index(nodes.len() as u32)).is_some() {
                return Err(NetworkError::DuplicateName {
                    what: "node",
                    name: draft.name,
                });
            }
            let mut init_qual = vec![0.0; n_species];
            for (species, value) in draft.init_qual {
                *init_qual
                    .get_mut(species.index_usize())
                    .ok_or(NetworkError::InvalidSpeciesRef {
                        what: "node initial quality",
                        species,
                    })? = value;
            }
            nodes.push(Node {
                name: draft.name,
                sources: draft.sources,
                quality: init_qual.clone(),
                init_qual,
                tank: draft.tank,
                report: draft.report,
            });
        }

        let mut link_names = HashMap::new();
        let mut links = Vec::with_capacity(self.links.len());
        for draft in self.links {
            if link_names.insert(draft.name.clone(), LinkId::from_index(links.len() as u32)).is_some() {
                return Err(NetworkError::DuplicateName {
                    what: "link",
                    name: draft.name,
                });
            }
            let mut init_qual = vec![0.0; n_species];
            for (species, value) in draft.init_qual {
                *init_qual
                    .get_mut(species.index_usize())
                    .ok_or(NetworkError::InvalidSpeciesRef {
                        what: "link initial quality",
                        species,
                    })? = value;
            }
            let this_link = LinkId::from_index(links.len() as u32);
            let mut param_values: Vec<f64> =
                self.parameters.iter().map(|p| p.default_value).collect();
            for (param, value) in draft.param_values {
                *param_values
                    .get_mut(param.index_usize())
                    .ok_or(NetworkError::InvalidParamRef {
                        link: this_link,
                        param,
                    })? = value;
            }
            let start_node = draft.start_node.expect("start node set by add_link");
            let end_node = draft.end_node.expect("end node set by add_link");
            links.push(Link {
                name: draft.name,
                start_node,
                end_node,
                diameter: draft.diameter,
                length: draft.length,
                roughness: draft.roughness,
                init_qual,
                param_values,
                report: draft.report,
            });
        }

        let mut tanks = Vec::with_capacity(self.tanks.len());
        for draft in self.tanks {
            let node = draft.node.expect("tank node set by add_tank");
            let mut param_values: Vec<f64> =
                self.parameters.iter().map(|p| p.default_value).collect();
            for (param, value) in draft.param_values {
                if let Some(slot) = param_values.get_mut(param.index_usize()) {
                    *slot = value;
                }
            }
            // A tank has no `c0` of its own (only `c`); its initial quality
            // comes from the `[QUALITY] NODE` entry on the node it sits on.
            let quality = nodes
                .get(node.index_usize())
                .map(|n| n.init_qual.clone())
                .unwrap_or_else(|| vec![0.0; n_species]);
            tanks.push(Tank {
                node,
                mixing_model: draft.mixing_model,
                area: draft.area,
                init_volume: draft.init_volume,
                volume: draft.init_volume,
                mix_compartment_volume: draft.mix_compartment_volume,
                param_values,
                quality,
            });
        }

        let mut species_names = HashMap::new();
        for (i, s) in self.species.iter().enumerate() {
            species_names.insert(s.name.clone(), SpeciesId::from_index(i as u32));
        }

        validate::validate(&nodes, &links, &tanks, &self.species)?;

        Ok(crate::network::Network {
            nodes,
            links,
            tanks,
            species: self.species,
            terms: self.terms,
            parameters: self.parameters,
            constants: self.constants,
            patterns: self.patterns,
            node_names,
            link_names,
            species_names,
        })
    }
}
