use std::collections::HashMap;

use msx_core::{ConstId, LinkId, NodeId, ParamId, PatternId, SpeciesId, TankId, TermId};

use crate::link::Link;
use crate::node::Node;
use crate::param::{Constant, Parameter};
use crate::pattern::Pattern;
use crate::species::Species;
use crate::tank::Tank;
use crate::term::Term;

/// A validated, immutable water-quality network (spec §3 "Network").
///
/// Counts are fixed once built; per-species/per-parameter quantities on
/// `Node`/`Link`/`Tank` are dense vectors sized to `species().len()` /
/// `parameters().len()` respectively, indexed by the corresponding `Id`.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) nodes: Vec<Node>,
    pub(crate) links: Vec<Link>,
    pub(crate) tanks: Vec<Tank>,
    pub(crate) species: Vec<Species>,
    pub(crate) terms: Vec<Term>,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) constants: Vec<Constant>,
    pub(crate) patterns: Vec<Pattern>,

    pub(crate) node_names: HashMap<String, NodeId>,
    pub(crate) link_names: HashMap<String, LinkId>,
    pub(crate) species_names: HashMap<String, SpeciesId>,
}

macro_rules! accessor {
    ($field:ident, $id:ty, $item:ty, $get:ident, $get_mut:ident) => {
        pub fn $get(&self, id: $id) -> Option<&$item> {
            self.$field.get(id.index_usize())
        }

        pub fn $get_mut(&mut self, id: $id) -> Option<&mut $item> {
            self.$field.get_mut(id.index_usize())
        }
    };
}

impl Network {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn tanks(&self) -> &[Tank] {
        &self.tanks
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    accessor!(nodes, NodeId, Node, node, node_mut);
    accessor!(links, LinkId, Link, link, link_mut);
    accessor!(tanks, TankId, Tank, tank, tank_mut);
    accessor!(species, SpeciesId, Species, species_at, species_at_mut);
    accessor!(terms, TermId, Term, term, term_mut);
    accessor!(parameters, ParamId, Parameter, parameter, parameter_mut);
    accessor!(constants, ConstId, Constant, constant, constant_mut);
    accessor!(patterns, PatternId, Pattern, pattern, pattern_mut);

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.node_names.get(name).copied()
    }

    pub fn link_id(&self, name: &str) -> Option<LinkId> {
        self.link_names.get(name).copied()
    }

    pub fn species_id(&self, name: &str) -> Option<SpeciesId> {
        self.species_names.get(name).copied()
    }
}
