//! Network validation: reference integrity and the (I4) expression-kind
//! invariant.

use msx_core::{LinkId, NodeId, SpeciesId};

use crate::error::{NetworkError, NetworkResult};
use crate::link::Link;
use crate::node::Node;
use crate::species::Species;
use crate::tank::Tank;

pub(crate) fn validate(
    nodes: &[Node],
    links: &[Link],
    tanks: &[Tank],
    species: &[Species],
) -> NetworkResult<()> {
    for (i, link) in links.iter().enumerate() {
        let id = LinkId::from_index(i as u32);
        if link.start_node.index_usize() >= nodes.len() {
            return Err(NetworkError::InvalidNodeRef {
                link: id,
                node: link.start_node,
            });
        }
        if link.end_node.index_usize() >= nodes.len() {
            return Err(NetworkError::InvalidNodeRef {
                link: id,
                node: link.end_node,
            });
        }
        if link.start_node == link.end_node {
            return Err(NetworkError::DegenerateLink { link: id });
        }
    }

    for (i, tank) in tanks.iter().enumerate() {
        if tank.node.index_usize() >= nodes.len() {
            return Err(NetworkError::InvalidTankRef {
                node: tank.node,
                tank: msx_core::TankId::from_index(i as u32),
            });
        }
    }

    for (i, node) in nodes.iter().enumerate() {
        if let Some(tank_id) = node.tank {
            if tank_id.index_usize() >= tanks.len() {
                return Err(NetworkError::InvalidTankRef {
                    node: NodeId::from_index(i as u32),
                    tank: tank_id,
                });
            }
        }
        for source in &node.sources {
            if source.species.index_usize() >= species.len() {
                return Err(NetworkError::InvalidSpeciesRef {
                    what: "source",
                    species: source.species,
                });
            }
        }
    }

    for (i, s) in species.iter().enumerate() {
        if !s.pipe_kind_is_valid() {
            return Err(NetworkError::BadExprKind {
                species: SpeciesId::from_index(i as u32),
                zone: "pipe",
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::NetworkBuilder;
    use crate::species::{ExprKind, SpeciesKind};
    use msx_core::Tolerances;

    #[test]
    fn degenerate_link_is_rejected() {
        let mut b = NetworkBuilder::new();
        let n1 = b.add_node("n1", false);
        b.add_link("bad", n1, n1, 1.0, 100.0, 100.0, false);
        let err = b.build().unwrap_err();
        assert!(matches!(err, NetworkError::DegenerateLink { .. }));
    }

    #[test]
    fn equilibrium_pipe_expr_is_rejected() {
        use msx_expr::{MathExpr, Opcode};
        let mut b = NetworkBuilder::new();
        let s = b.add_species("X", SpeciesKind::Bulk, Tolerances::default(), 2, true);
        let expr = MathExpr::from_postfix(vec![Opcode::PushConst(1.0)]).unwrap();
        b.set_pipe_expr(s, ExprKind::Equilibrium, expr);
        let err = b.build().unwrap_err();
        assert!(matches!(err, NetworkError::BadExprKind { .. }));
    }
}
