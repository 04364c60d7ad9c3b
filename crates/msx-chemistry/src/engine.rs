//! The chemistry engine (spec §4.4): partitions species, snapshots
//! hydraulic variables per zone, and drives the ODE/Newton solvers using
//! derivative/residual callbacks built from [`EvalContext`].

use nalgebra::DVector;

use msx_core::HydVarSnapshot;
use msx_network::{ExprKind, Network};
use msx_solver::{NewtonConfig, OdeMethod, newton_solve, ode_solver};

use crate::context::{EvalContext, eval_terms};
use crate::coupling::Coupling;
use crate::error::{ChemistryError, ChemistryResult};
use crate::partition::{SpeciesPartition, partition_pipe, partition_tank};

/// Which zone kind a reaction call concerns; selects which of a species'
/// two `ZoneExpr`s (pipe or tank) and which partition applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    Pipe,
    Tank,
}

pub struct ChemistryEngine {
    pub pipe: SpeciesPartition,
    pub tank: SpeciesPartition,
    pub coupling: Coupling,
    pub method: OdeMethod,
    pub newton: NewtonConfig,
    /// Suggested initial step handed to the adaptive integrators; refined
    /// implicitly by their own step control across calls within a zone.
    pub h0: f64,
    /// `[OPTIONS] RTOL`/`ATOL` (`DefRtol`/`DefAtol`): fallback tolerances
    /// for a species that somehow carries none of its own. Every species
    /// built by `msx-input::parse` already has its tolerances resolved to
    /// these defaults, so this only guards a network assembled without
    /// going through the parser.
    pub def_rtol: f64,
    pub def_atol: f64,
}

impl ChemistryEngine {
    /// Partition `network`'s species (spec §4.4 "At open, partitions
    /// species into four groups").
    pub fn open(network: &Network, coupling: Coupling, method: OdeMethod, h0: f64, def_rtol: f64, def_atol: f64) -> Self {
        Self {
            pipe: partition_pipe(network),
            tank: partition_tank(network),
            coupling,
            method,
            newton: NewtonConfig::default(),
            h0,
            def_rtol,
            def_atol,
        }
    }

    fn partition_for(&self, zone: ZoneKind) -> &SpeciesPartition {
        match zone {
            ZoneKind::Pipe => &self.pipe,
            ZoneKind::Tank => &self.tank,
        }
    }

    fn expr_kind_and_expr<'a>(
        &self,
        zone: ZoneKind,
        network: &'a Network,
        species: msx_core::SpeciesId,
    ) -> Option<&'a msx_expr::MathExpr> {
        let sp = network.species_at(species)?;
        let ze = match zone {
            ZoneKind::Pipe => &sp.pipe_expr,
            ZoneKind::Tank => &sp.tank_expr,
        };
        ze.expr.as_ref()
    }

    /// Run one zone's reaction over `dt` seconds of simulated elapsed time,
    /// converted by the caller into the project's rate-time basis before
    /// calling this (spec §4.4 steps 1-4).
    ///
    /// `c` is the zone's full, dense per-species concentration vector;
    /// `param_values` is the link's or tank's dense per-parameter override
    /// vector. Both are mutated in place.
    pub fn react(
        &self,
        zone: ZoneKind,
        network: &Network,
        c: &mut [f64],
        param_values: &[f64],
        hydvars: HydVarSnapshot,
        dt: f64,
    ) -> ChemistryResult<()> {
        let partition = self.partition_for(zone).clone();

        if !partition.rate.is_empty() {
            let y0 = DVector::from_iterator(
                partition.rate.len(),
                partition.rate.iter().map(|id| c[id.index_usize()]),
            );
            let rtol = DVector::from_iterator(
                partition.rate.len(),
                partition
                    .rate
                    .iter()
                    .map(|id| network.species_at(*id).map(|s| s.tolerances.rel).unwrap_or(self.def_rtol)),
            );
            let atol = DVector::from_iterator(
                partition.rate.len(),
                partition
                    .rate
                    .iter()
                    .map(|id| network.species_at(*id).map(|s| s.tolerances.abs).unwrap_or(self.def_atol)),
            );
            let solver = ode_solver(self.method, rtol, atol);

            let outcome = {
                let mut derivative = |_t: f64, y: &DVector<f64>| -> msx_solver::SolverResult<DVector<f64>> {
                    for (i, id) in partition.rate.iter().enumerate() {
                        c[id.index_usize()] = y[i];
                    }
                    if self.coupling == Coupling::Full && !partition.equil.is_empty() {
                        self.equil_solve(zone, network, &mut *c, param_values, hydvars)
                            .map_err(|_| msx_solver::SolverError::IllegalMath {
                                what: "equilibrium solve inside derivative evaluation",
                            })?;
                    }
                    let terms = eval_terms(network.terms(), &*c, param_values, network.constants(), hydvars)
                        .map_err(|_| msx_solver::SolverError::IllegalMath {
                            what: "term evaluation",
                        })?;
                    let ctx = EvalContext {
                        concentrations: &*c,
                        term_values: &terms,
                        param_values,
                        constants: network.constants(),
                        hydvars,
                    };
                    let mut dydt = DVector::zeros(partition.rate.len());
                    for (i, id) in partition.rate.iter().enumerate() {
                        let expr = self.expr_kind_and_expr(zone, network, *id).ok_or(
                            msx_solver::SolverError::IllegalMath {
                                what: "rate species missing expression",
                            },
                        )?;
                        dydt[i] = ctx.eval(expr).map_err(|_| msx_solver::SolverError::IllegalMath {
                            what: "rate expression",
                        })?;
                    }
                    Ok(dydt)
                };
                solver.integrate(&y0, 0.0, dt, self.h0, &mut derivative)?
            };

            for (i, id) in partition.rate.iter().enumerate() {
                c[id.index_usize()] = outcome.y[i];
            }
        }

        if !partition.equil.is_empty() {
            self.equil_solve(zone, network, &mut *c, param_values, hydvars)?;
        }

        for id in &partition.formula {
            let terms = eval_terms(network.terms(), &*c, param_values, network.constants(), hydvars)?;
            let ctx = EvalContext {
                concentrations: &*c,
                term_values: &terms,
                param_values,
                constants: network.constants(),
                hydvars,
            };
            let expr = self
                .expr_kind_and_expr(zone, network, *id)
                .ok_or(ChemistryError::MissingExpression)?;
            c[id.index_usize()] = ctx.eval(expr)?;
        }

        Ok(())
    }

    /// Solve `F(c) = 0` for every equilibrium species in this zone, holding
    /// every other species (rate, formula, or otherwise fixed) at its
    /// current value in `c` (spec §4.4, GLOSSARY "Equilibrium expression").
    fn equil_solve(
        &self,
        zone: ZoneKind,
        network: &Network,
        c: &mut [f64],
        param_values: &[f64],
        hydvars: HydVarSnapshot,
    ) -> ChemistryResult<()> {
        let partition = self.partition_for(zone);
        if partition.equil.is_empty() {
            return Ok(());
        }
        let x0 = DVector::from_iterator(
            partition.equil.len(),
            partition.equil.iter().map(|id| c[id.index_usize()]),
        );

        let equil_ids = partition.equil.clone();
        let residual = |x: &DVector<f64>| -> msx_solver::SolverResult<DVector<f64>> {
            for (i, id) in equil_ids.iter().enumerate() {
                c[id.index_usize()] = x[i];
            }
            let terms = eval_terms(network.terms(), &*c, param_values, network.constants(), hydvars)
                .map_err(|_| msx_solver::SolverError::IllegalMath {
                    what: "term evaluation",
                })?;
            let ctx = EvalContext {
                concentrations: &*c,
                term_values: &terms,
                param_values,
                constants: network.constants(),
                hydvars,
            };
            let mut f = DVector::zeros(equil_ids.len());
            for (i, id) in equil_ids.iter().enumerate() {
                let expr = network
                    .species_at(*id)
                    .and_then(|s| {
                        let ze = match zone {
                            ZoneKind::Pipe => &s.pipe_expr,
                            ZoneKind::Tank => &s.tank_expr,
                        };
                        ze.expr.as_ref()
                    })
                    .ok_or(msx_solver::SolverError::IllegalMath {
                        what: "equilibrium species missing expression",
                    })?;
                f[i] = ctx.eval(expr).map_err(|_| msx_solver::SolverError::IllegalMath {
                    what: "equilibrium expression",
                })?;
            }
            Ok(f)
        };

        let outcome = newton_solve(x0, &self.newton, residual)?;
        for (i, id) in partition.equil.iter().enumerate() {
            c[id.index_usize()] = outcome.x[i];
        }
        Ok(())
    }
}

/// I4: validate a species' pipe expression kind is never `Equilibrium`.
pub fn pipe_kind_is_valid(kind: ExprKind) -> bool {
    !matches!(kind, ExprKind::Equilibrium)
}

#[cfg(test)]
mod tests {
    use super::*;
    use msx_core::Tolerances;
    use msx_expr::{MathExpr, Opcode, VarRef};
    use msx_network::{NetworkBuilder, SpeciesKind};

    fn first_order_decay_network(k: f64) -> (Network, msx_core::SpeciesId) {
        let mut b = NetworkBuilder::new();
        let tol = Tolerances { abs: 1e-9, rel: 1e-9 };
        let c = b.add_species("C", SpeciesKind::Bulk, tol, 4, true);
        // rate = -k*C -> postfix: C, k, *, neg
        let kc = b.add_constant("K", k);
        let expr = MathExpr::from_postfix(vec![
            Opcode::PushVar(VarRef::Species(c)),
            Opcode::PushVar(VarRef::Const(kc)),
            Opcode::Mul,
            Opcode::Neg,
        ])
        .unwrap();
        b.set_pipe_expr(c, ExprKind::Rate, expr.clone());
        b.set_tank_expr(c, ExprKind::Rate, expr);
        let n1 = b.add_node("n1", false);
        let n2 = b.add_node("n2", false);
        b.add_link("p1", n1, n2, 1.0, 1000.0, 100.0, false);
        (b.build().unwrap(), c)
    }

    #[test]
    fn pipe_rate_reaction_matches_exponential_decay() {
        let (net, c) = first_order_decay_network(0.1);
        let engine = ChemistryEngine::open(&net, Coupling::None, OdeMethod::Rk5, 60.0, 1e-9, 1e-9);
        let mut conc = vec![0.0; net.species().len()];
        conc[c.index_usize()] = 1.0;
        let param_values: Vec<f64> = vec![];
        let hyd = HydVarSnapshot::default();

        // k is in 1/hr, integrate for 10 hours in 3600s-per-hour units:
        engine
            .react(ZoneKind::Pipe, &net, &mut conc, &param_values, hyd, 10.0)
            .unwrap();

        let expected = (-0.1f64 * 10.0).exp();
        assert!((conc[c.index_usize()] - expected).abs() < 1e-4);
    }

    #[test]
    fn formula_species_is_computed_from_rate_species() {
        let mut b = NetworkBuilder::new();
        let tol = Tolerances::default();
        let base = b.add_species("BASE", SpeciesKind::Bulk, tol, 2, true);
        let scaled = b.add_species("SCALED", SpeciesKind::Bulk, tol, 2, true);
        let zero_rate = MathExpr::from_postfix(vec![Opcode::PushConst(0.0)]).unwrap();
        b.set_pipe_expr(base, ExprKind::Rate, zero_rate);
        let formula = MathExpr::from_postfix(vec![
            Opcode::PushVar(VarRef::Species(base)),
            Opcode::PushConst(1000.0),
            Opcode::Mul,
        ])
        .unwrap();
        b.set_pipe_expr(scaled, ExprKind::Formula, formula);
        let n1 = b.add_node("n1", false);
        let n2 = b.add_node("n2", false);
        b.add_link("p1", n1, n2, 1.0, 100.0, 100.0, false);
        let net = b.build().unwrap();

        let engine = ChemistryEngine::open(&net, Coupling::None, OdeMethod::Eul, 1.0, 0.01, 0.01);
        let mut conc = vec![0.0; net.species().len()];
        conc[base.index_usize()] = 0.002;
        engine
            .react(ZoneKind::Pipe, &net, &mut conc, &[], HydVarSnapshot::default(), 1.0)
            .unwrap();

        assert!((conc[scaled.index_usize()] - 2.0).abs() < 1e-9);
    }
}
