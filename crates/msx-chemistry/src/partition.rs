//! Species partitioning (spec §4.4 "At open, partitions species into four
//! groups"). Computed once when the chemistry engine opens, never mutated
//! afterward.

use msx_core::SpeciesId;
use msx_network::{ExprKind, Network};

/// Species indices grouped by the role they play within one zone kind
/// (pipe or tank). A species appears in at most one of `rate`/`equil`
/// within a zone kind; `formula` is disjoint from both (formula species
/// are post-computed, spec §4.4).
#[derive(Debug, Clone, Default)]
pub struct SpeciesPartition {
    pub rate: Vec<SpeciesId>,
    pub equil: Vec<SpeciesId>,
    pub formula: Vec<SpeciesId>,
}

impl SpeciesPartition {
    pub fn is_empty(&self) -> bool {
        self.rate.is_empty() && self.equil.is_empty() && self.formula.is_empty()
    }
}

/// Partition every species of `network` by its pipe-zone expression kind.
pub fn partition_pipe(network: &Network) -> SpeciesPartition {
    partition(network, |s| &s.pipe_expr.kind)
}

/// Partition every species of `network` by its tank-zone expression kind.
pub fn partition_tank(network: &Network) -> SpeciesPartition {
    partition(network, |s| &s.tank_expr.kind)
}

fn partition(
    network: &Network,
    kind_of: impl Fn(&msx_network::Species) -> &ExprKind,
) -> SpeciesPartition {
    let mut p = SpeciesPartition::default();
    for (i, species) in network.species().iter().enumerate() {
        let id = SpeciesId::from_index(i as u32);
        match kind_of(species) {
            ExprKind::Rate => p.rate.push(id),
            ExprKind::Equilibrium => p.equil.push(id),
            ExprKind::Formula => p.formula.push(id),
            ExprKind::None => {}
        }
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use msx_core::Tolerances;
    use msx_expr::{MathExpr, Opcode};
    use msx_network::{NetworkBuilder, SpeciesKind};

    #[test]
    fn partitions_by_pipe_expr_kind() {
        let mut b = NetworkBuilder::new();
        let rate_sp = b.add_species("R", SpeciesKind::Bulk, Tolerances::default(), 2, true);
        let formula_sp = b.add_species("F", SpeciesKind::Bulk, Tolerances::default(), 2, true);
        let expr = MathExpr::from_postfix(vec![Opcode::PushConst(1.0)]).unwrap();
        b.set_pipe_expr(rate_sp, ExprKind::Rate, expr.clone());
        b.set_pipe_expr(formula_sp, ExprKind::Formula, expr);
        let n1 = b.add_node("n1", false);
        let n2 = b.add_node("n2", false);
        b.add_link("p1", n1, n2, 1.0, 100.0, 100.0, false);
        let net = b.build().unwrap();

        let p = partition_pipe(&net);
        assert_eq!(p.rate, vec![rate_sp]);
        assert_eq!(p.formula, vec![formula_sp]);
        assert!(p.equil.is_empty());
    }
}
