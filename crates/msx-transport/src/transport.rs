//! Quality transport orchestrator (spec §4.6): drives one link's pipe
//! segments and every tank through the ordered per-step phases — direction,
//! react, advect, accumulate, incident concentrations, node update,
//! source input, release.
//!
//! Resolves an apparent tension in the originating description between
//! "release propagates into the head (downstream) segment" and (I2)
//! ("the head of the list is the downstream end; advection appends at the
//! upstream end"): for an *outgoing* link, the node being released from is
//! that link's upstream end, so the segment that must carry the node's
//! fresh quality is the newly appended upstream segment created in the
//! advect phase, not the link's downstream-most segment. This module
//! implements release that way; see `DESIGN.md` for the full writeup.

use std::collections::HashMap;

use msx_core::{NodeId, Ucf, TINY};
use msx_network::Network;
use msx_solver::OdeMethod;

use crate::error::{TransportError, TransportResult};
use crate::hydvars::{pipe_hydvars, tank_hydvars};
use crate::link_segments::LinkSegments;
use crate::segment::SegmentArena;
use crate::tank_mix::{complete_mix, segmented_step, TwoCompartment};
use crate::source::apply_sources;
use crate::wall::{film_transfer_coefficient, mix_new_segment};
use msx_chemistry::{ChemistryEngine, Coupling, ZoneKind};
use msx_network::SpeciesKind;

enum TankState {
    CompleteMix { volume: f64, conc: Vec<f64> },
    TwoCompartment(TwoCompartment),
    Segmented { list: LinkSegments, fifo: bool },
}

impl TankState {
    fn volume(&self, arena: &SegmentArena) -> f64 {
        match self {
            TankState::CompleteMix { volume, .. } => *volume,
            TankState::TwoCompartment(tc) => tc.total_volume(),
            TankState::Segmented { list, .. } => list.total_volume(arena),
        }
    }
}

pub struct QualityTransport {
    chemistry: ChemistryEngine,
    /// Converts a quality step's elapsed time (always tracked in seconds,
    /// since that's the hydraulics file's clock) into the project's
    /// `[OPTIONS] RATE_UNITS` basis before handing it to the chemistry
    /// engine, whose rate expressions are written against that basis.
    ucf: Ucf,
    link_lists: Vec<LinkSegments>,
    /// `true` when the link's current `downstream` end coincides with its
    /// `end_node` (i.e. flow runs start_node -> end_node).
    forward: Vec<bool>,
    tank_states: HashMap<NodeId, TankState>,
    segments: SegmentArena,
}

impl QualityTransport {
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        network: &Network,
        coupling: Coupling,
        method: OdeMethod,
        h0: f64,
        ucf: Ucf,
        def_rtol: f64,
        def_atol: f64,
    ) -> Self {
        let n_species = network.species().len();
        let mut segments = SegmentArena::new();
        let mut link_lists = Vec::with_capacity(network.links().len());
        let mut forward = Vec::with_capacity(network.links().len());

        for link in network.links() {
            let seg = segments.alloc(link.volume(), link.init_qual.clone());
            link_lists.push(LinkSegments::single(seg));
            forward.push(true);
        }

        let mut tank_states = HashMap::new();
        for tank in network.tanks() {
            let state = match tank.mixing_model {
                msx_network::MixingModel::CompleteMix => TankState::CompleteMix {
                    volume: tank.volume,
                    conc: tank.quality.clone(),
                },
                msx_network::MixingModel::TwoCompartment => {
                    let mut tc = TwoCompartment::new(n_species, tank.volume, tank.mix_compartment_volume);
                    tc.scatter_conc(&tank.quality);
                    TankState::TwoCompartment(tc)
                }
                msx_network::MixingModel::Fifo | msx_network::MixingModel::Lifo => {
                    let seg = segments.alloc(tank.volume, tank.quality.clone());
                    TankState::Segmented {
                        list: LinkSegments::single(seg),
                        fifo: matches!(tank.mixing_model, msx_network::MixingModel::Fifo),
                    }
                }
            };
            tank_states.insert(tank.node, state);
        }

        Self {
            chemistry: ChemistryEngine::open(network, coupling, method, h0, def_rtol, def_atol),
            ucf,
            link_lists,
            forward,
            tank_states,
            segments,
        }
    }

    /// Advance quality by one step of `dt` seconds given the hydraulic
    /// flows (cubic feet/sec, signed `start_node -> end_node` positive) in
    /// effect over this step.
    pub fn step(
        &mut self,
        network: &mut Network,
        flows: &[f64],
        dt: f64,
        merge_tol: &[f64],
        pattern_step: u64,
    ) -> TransportResult<()> {
        self.orient(network, flows);
        self.react(network, flows, dt)?;
        self.advect(network, flows, dt, merge_tol, pattern_step)?;
        Ok(())
    }

    /// Volume-weighted average concentration across a link's current
    /// segment list (`quality_getLinkQual` in
    /// `original_source/src/qualitymsx.c`).
    pub fn link_quality(&self, link: usize, n_species: usize) -> Vec<f64> {
        let Some(list) = self.link_lists.get(link) else {
            return vec![0.0; n_species];
        };
        let mut total_volume = 0.0;
        let mut mass = vec![0.0; n_species];
        for seg_id in list.iter(&self.segments) {
            let seg = self.segments.get(seg_id);
            total_volume += seg.volume;
            for (m, c) in mass.iter_mut().zip(&seg.concentrations) {
                *m += c * seg.volume;
            }
        }
        if total_volume > msx_core::TINY {
            mass.iter().map(|m| m / total_volume).collect()
        } else {
            vec![0.0; n_species]
        }
    }

    fn orient(&mut self, network: &Network, flows: &[f64]) {
        for i in 0..network.links().len() {
            let q = flows.get(i).copied().unwrap_or(0.0);
            let should_be_forward = q >= 0.0;
            if self.forward[i] != should_be_forward {
                self.link_lists[i].reorient();
                self.forward[i] = should_be_forward;
            }
        }
    }

    fn react(&mut self, network: &Network, flows: &[f64], dt: f64) -> TransportResult<()> {
        // Rate expressions are written against `[OPTIONS] RATE_UNITS`
        // (e.g. a coefficient of 0.1 with RATE_UNITS HR means 0.1/hr), but
        // `dt` here is the quality step in seconds. Convert once so the
        // ODE/Newton solvers integrate over the same clock the project's
        // coefficients assume.
        let dt_rate = self.ucf.seconds_to_rate_time(dt);

        for (i, link) in network.links().iter().enumerate() {
            let q = flows.get(i).copied().unwrap_or(0.0);
            let hyd = pipe_hydvars(q, link.diameter, link.roughness);
            let ids: Vec<_> = self.link_lists[i].iter(&self.segments).collect();
            for seg_id in ids {
                let mut conc = self.segments.get(seg_id).concentrations.clone();
                self.chemistry
                    .react(ZoneKind::Pipe, network, &mut conc, &link.param_values, hyd, dt_rate)?;
                self.segments.get_mut(seg_id).concentrations = conc;
            }
        }

        for tank in network.tanks() {
            let hyd = tank_hydvars();
            match self.tank_states.get_mut(&tank.node) {
                Some(TankState::CompleteMix { conc, .. }) => {
                    self.chemistry
                        .react(ZoneKind::Tank, network, conc, &tank.param_values, hyd, dt_rate)?;
                }
                Some(TankState::TwoCompartment(tc)) => {
                    let mut blended = vec![0.0; network.species().len()];
                    tc.blended_conc(&mut blended);
                    self.chemistry
                        .react(ZoneKind::Tank, network, &mut blended, &tank.param_values, hyd, dt_rate)?;
                    tc.scatter_conc(&blended);
                }
                Some(TankState::Segmented { list, .. }) => {
                    let ids: Vec<_> = list.iter(&self.segments).collect();
                    for seg_id in ids {
                        let mut conc = self.segments.get(seg_id).concentrations.clone();
                        self.chemistry
                            .react(ZoneKind::Tank, network, &mut conc, &tank.param_values, hyd, dt_rate)?;
                        self.segments.get_mut(seg_id).concentrations = conc;
                    }
                }
                None => {}
            }
        }
        Ok(())
    }

    fn advect(
        &mut self,
        network: &mut Network,
        flows: &[f64],
        dt: f64,
        merge_tol: &[f64],
        pattern_step: u64,
    ) -> TransportResult<()> {
        let n_species = network.species().len();

        // Accumulate: pull the outflow volume from each link's downstream
        // end and attribute it to that link's downstream node.
        let mut inflow: HashMap<NodeId, (f64, Vec<f64>)> =
            HashMap::with_capacity(network.nodes().len());
        let mut link_outflow_vol = vec![0.0; network.links().len()];
        let mut link_downstream_node = Vec::with_capacity(network.links().len());
        let mut link_upstream_node = Vec::with_capacity(network.links().len());

        for (i, link) in network.links().iter().enumerate() {
            let q = flows.get(i).copied().unwrap_or(0.0);
            let (up, down) = if q >= 0.0 {
                (link.start_node, link.end_node)
            } else {
                (link.end_node, link.start_node)
            };
            link_upstream_node.push(up);
            link_downstream_node.push(down);

            let volume = q.abs() * dt;
            link_outflow_vol[i] = volume;
            if volume <= TINY {
                continue;
            }

            let drawn = drain_volume(&mut self.link_lists[i], &mut self.segments, volume, n_species);
            let entry = inflow.entry(down).or_insert_with(|| (0.0, vec![0.0; n_species]));
            entry.0 += volume;
            for (d, c) in entry.1.iter_mut().zip(&drawn) {
                *d += c * volume;
            }
        }

        // Outgoing volumetric demand per node, needed for mass-booster
        // source normalization.
        let mut outgoing_vol: HashMap<NodeId, f64> = HashMap::new();
        for (i, _) in network.links().iter().enumerate() {
            *outgoing_vol.entry(link_upstream_node[i]).or_insert(0.0) += link_outflow_vol[i];
        }

        // Incident concentrations + node update + source input, per node.
        let mut node_final: HashMap<NodeId, Vec<f64>> = HashMap::with_capacity(network.nodes().len());
        let node_ids: Vec<NodeId> = (0..network.nodes().len())
            .map(|i| NodeId::from_index(i as u32))
            .collect();

        for &node_id in &node_ids {
            let (in_vol, in_mass) = inflow
                .get(&node_id)
                .cloned()
                .unwrap_or((0.0, vec![0.0; n_species]));

            let blended = if in_vol > TINY {
                in_mass.iter().map(|m| m / in_vol).collect::<Vec<f64>>()
            } else {
                network
                    .node(node_id)
                    .map(|n| n.quality.clone())
                    .unwrap_or_else(|| vec![0.0; n_species])
            };

            let mixed = if let Some(state) = self.tank_states.get_mut(&node_id) {
                match state {
                    TankState::CompleteMix { volume, conc } => {
                        let outflow_vol = outgoing_vol.get(&node_id).copied().unwrap_or(0.0);
                        complete_mix(conc, volume, in_vol, &blended, outflow_vol);
                        conc.clone()
                    }
                    TankState::TwoCompartment(tc) => {
                        let outflow_vol = outgoing_vol.get(&node_id).copied().unwrap_or(0.0);
                        let capacity = network
                            .tanks()
                            .iter()
                            .find(|t| t.node == node_id)
                            .map(|t| t.mix_compartment_volume)
                            .unwrap_or(tc.total_volume());
                        tc.step(capacity, in_vol, &blended, outflow_vol);
                        let mut out = vec![0.0; n_species];
                        tc.blended_conc(&mut out);
                        out
                    }
                    TankState::Segmented { list, fifo } => {
                        let outflow_vol = outgoing_vol.get(&node_id).copied().unwrap_or(0.0);
                        segmented_step(list, &mut self.segments, *fifo, in_vol, &blended, outflow_vol, merge_tol)
                    }
                }
            } else {
                blended
            };

            if let Some(state) = self.tank_states.get(&node_id) {
                let volume = state.volume(&self.segments);
                let tank_id = network.node(node_id).and_then(|n| n.tank);
                if let Some(tank) = tank_id.and_then(|tid| network.tank_mut(tid)) {
                    tank.volume = volume;
                    tank.quality = mixed.clone();
                }
            }

            let sources = network
                .node(node_id)
                .map(|n| n.sources.clone())
                .unwrap_or_default();
            let outflow_rate = outgoing_vol.get(&node_id).copied().unwrap_or(0.0) / dt.max(TINY);
            let mut final_conc = mixed;
            for species_idx in 0..n_species {
                let species_id = msx_core::SpeciesId::from_index(species_idx as u32);
                final_conc[species_idx] = apply_sources(
                    network,
                    &sources,
                    species_id,
                    final_conc[species_idx],
                    outflow_rate,
                    pattern_step,
                );
            }

            if let Some(n) = network.node_mut(node_id) {
                n.quality = final_conc.clone();
            }
            node_final.insert(node_id, final_conc);
        }

        // Release: append a fresh upstream segment on every link carrying
        // its upstream node's final quality. Wall species on the new
        // segment additionally film-mix against the segment they're
        // appended next to, per spec §4.7.
        for (i, link) in network.links().iter().enumerate() {
            let volume = link_outflow_vol[i];
            if volume <= TINY {
                continue;
            }
            let up = link_upstream_node[i];
            let mut conc = node_final
                .get(&up)
                .cloned()
                .unwrap_or_else(|| vec![0.0; n_species]);

            if let Some(neighbor_id) = self.link_lists[i].upstream {
                let q = flows.get(i).copied().unwrap_or(0.0);
                let hyd = pipe_hydvars(q, link.diameter, link.roughness);
                let area_vol_ratio = hyd.get(msx_core::HydVar::AreaVolumeRatio);
                let neighbor_conc = self.segments.get(neighbor_id).concentrations.clone();
                for (idx, species) in network.species().iter().enumerate() {
                    if species.kind == SpeciesKind::Wall {
                        let kf = film_transfer_coefficient(&hyd, species.diffusivity, link.length);
                        conc[idx] = mix_new_segment(conc[idx], neighbor_conc[idx], kf, area_vol_ratio, dt);
                    }
                }
            }

            let seg = self.segments.alloc(volume, conc);
            self.link_lists[i].append_upstream(&mut self.segments, seg, merge_tol);
        }

        // (I1): every link's segment volumes must sum back to its fixed
        // pipe volume once outflow has been replaced by release.
        for (i, link) in network.links().iter().enumerate() {
            let actual = self.link_lists[i].total_volume(&self.segments);
            let expected = link.volume();
            if (actual - expected).abs() > expected.abs() * 1e-6 + 1e-6 {
                return Err(TransportError::VolumeInvariant {
                    link: i as u32,
                    actual,
                    expected,
                });
            }
        }

        Ok(())
    }
}

/// Remove `volume` worth of water from a link's downstream end, splitting
/// the boundary segment if only part of it is drawn, and return the
/// volume-weighted concentration removed.
fn drain_volume(list: &mut LinkSegments, arena: &mut SegmentArena, mut volume: f64, n_species: usize) -> Vec<f64> {
    let mut drawn = vec![0.0; n_species];
    while volume > TINY {
        let Some(head) = list.downstream else { break };
        let seg = arena.get(head);
        let seg_volume = seg.volume;
        let conc = seg.concentrations.clone();
        let take = volume.min(seg_volume);
        for (d, c) in drawn.iter_mut().zip(&conc) {
            *d += c * take;
        }
        if take >= seg_volume - TINY {
            list.pop_downstream(arena);
        } else {
            arena.get_mut(head).volume -= take;
        }
        volume -= take;
    }
    drawn
}

#[cfg(test)]
mod tests {
    use msx_core::Tolerances;
    use msx_network::{NetworkBuilder, SpeciesKind};

    use super::*;

    fn single_pipe_network() -> Network {
        let mut b = NetworkBuilder::new();
        let sp = b.add_species("C", SpeciesKind::Bulk, Tolerances::default(), 2, true);
        let n1 = b.add_node("n1", true);
        let n2 = b.add_node("n2", true);
        b.set_node_init_qual(n1, sp, 1.0);
        b.add_link("p1", n1, n2, 1.0, 1000.0, 100.0, true);
        b.build().unwrap()
    }

    #[test]
    fn mass_conserved_through_one_advection_step() {
        let mut network = single_pipe_network();
        let mut transport = QualityTransport::open(&network, Coupling::None, OdeMethod::Eul, 1.0, Ucf::default(), 0.01, 0.01);
        let flows = vec![1.0];
        let tol = vec![1e-9];

        let pipe_volume = network.links()[0].volume();
        for _ in 0..5 {
            transport.step(&mut network, &flows, 60.0, &tol, 0).unwrap();
            let total = transport.link_lists[0].total_volume(&transport.segments);
            assert!((total - pipe_volume).abs() < pipe_volume * 1e-6 + 1e-9);
        }
    }

    #[test]
    fn link_quality_is_volume_weighted_average() {
        let network = single_pipe_network();
        let transport = QualityTransport::open(&network, Coupling::None, OdeMethod::Eul, 1.0, Ucf::default(), 0.01, 0.01);
        let q = transport.link_quality(0, 1);
        assert_eq!(q, vec![0.0]);
        assert_eq!(transport.link_quality(99, 1), vec![0.0]);
    }

    #[test]
    fn reorient_on_flow_reversal() {
        let mut network = single_pipe_network();
        let mut transport = QualityTransport::open(&network, Coupling::None, OdeMethod::Eul, 1.0, Ucf::default(), 0.01, 0.01);
        assert!(transport.forward[0]);
        transport.orient(&network, &[-1.0]);
        assert!(!transport.forward[0]);
    }
}
