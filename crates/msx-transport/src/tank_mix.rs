//! Tank mixing models (spec §4.6 step 6): complete-mix, two-compartment,
//! and the FIFO/LIFO segmented models built on [`crate::link_segments`].

use msx_core::TINY;

use crate::link_segments::LinkSegments;
use crate::segment::SegmentArena;

/// Advance a complete-mix tank by one quality step. Inflow mixes instantly
/// and uniformly into the whole tank volume; the outflow concentration
/// equals the (post-mix) tank concentration.
///
/// `c` is the tank's dense per-species concentration vector, mutated in
/// place. Returns the outflow concentration vector (a clone of the
/// post-mix state, since complete-mix has no internal structure to
/// distinguish it from).
pub fn complete_mix(c: &mut [f64], volume: &mut f64, inflow_vol: f64, inflow_conc: &[f64], outflow_vol: f64) {
    let new_volume = (*volume + inflow_vol - outflow_vol).max(0.0);
    if inflow_vol > 0.0 {
        let total = *volume + inflow_vol;
        if total > TINY {
            for (ci, cin) in c.iter_mut().zip(inflow_conc) {
                *ci = (*ci * *volume + cin * inflow_vol) / total;
            }
        }
    }
    *volume = new_volume;
}

/// Two-compartment tank state (spec §4.6 step 6, Grayman/Clark style
/// cascade): a well-mixed inlet compartment of fixed capacity
/// `mix_compartment_volume` that overflows into a well-mixed outlet
/// compartment once full; outflow is drawn from the outlet compartment
/// first, falling back to the inlet compartment once the outlet is empty.
#[derive(Debug, Clone)]
pub struct TwoCompartment {
    pub inlet_volume: f64,
    pub inlet_conc: Vec<f64>,
    pub outlet_volume: f64,
    pub outlet_conc: Vec<f64>,
}

impl TwoCompartment {
    pub fn new(n_species: usize, total_volume: f64, capacity: f64) -> Self {
        let inlet_volume = total_volume.min(capacity);
        let outlet_volume = (total_volume - inlet_volume).max(0.0);
        Self {
            inlet_volume,
            inlet_conc: vec![0.0; n_species],
            outlet_volume,
            outlet_conc: vec![0.0; n_species],
        }
    }

    pub fn total_volume(&self) -> f64 {
        self.inlet_volume + self.outlet_volume
    }

    /// Mixes concentration `c` as the volume-weighted average of both
    /// compartments; used to expose a single tank-wide reacting
    /// concentration to the chemistry engine.
    pub fn blended_conc(&self, out: &mut [f64]) {
        let total = self.total_volume();
        for (i, o) in out.iter_mut().enumerate() {
            if total > TINY {
                *o = (self.inlet_conc[i] * self.inlet_volume + self.outlet_conc[i] * self.outlet_volume) / total;
            } else {
                *o = self.inlet_conc[i];
            }
        }
    }

    /// Scatter a blended concentration (post-reaction) back into both
    /// compartments at their current proportions, so reaction updates a
    /// single vector without needing per-compartment reaction state.
    pub fn scatter_conc(&mut self, blended: &[f64]) {
        self.inlet_conc.copy_from_slice(blended);
        self.outlet_conc.copy_from_slice(blended);
    }

    pub fn step(&mut self, capacity: f64, inflow_vol: f64, inflow_conc: &[f64], outflow_vol: f64) {
        if inflow_vol > 0.0 {
            let total = self.inlet_volume + inflow_vol;
            if total > TINY {
                for (ci, cin) in self.inlet_conc.iter_mut().zip(inflow_conc) {
                    *ci = (*ci * self.inlet_volume + cin * inflow_vol) / total;
                }
            }
            self.inlet_volume = total;
        }

        // Overflow the inlet compartment into the outlet once it exceeds capacity.
        if self.inlet_volume > capacity {
            let overflow = self.inlet_volume - capacity;
            let total = self.outlet_volume + overflow;
            if total > TINY {
                for (oc, ic) in self.outlet_conc.iter_mut().zip(&self.inlet_conc) {
                    *oc = (*oc * self.outlet_volume + ic * overflow) / total;
                }
            }
            self.outlet_volume = total;
            self.inlet_volume = capacity;
        }

        let mut remaining = outflow_vol;
        let from_outlet = remaining.min(self.outlet_volume);
        self.outlet_volume -= from_outlet;
        remaining -= from_outlet;
        if remaining > 0.0 {
            self.inlet_volume = (self.inlet_volume - remaining).max(0.0);
        }
    }
}

/// Push an inflow segment onto a FIFO/LIFO tank's segment list and pop the
/// segment(s) needed to supply `outflow_vol`, returning the volume-weighted
/// concentration delivered to the downstream link. FIFO draws from the
/// opposite end it fills (first-in, first-out); LIFO draws from the same
/// end it fills.
pub fn segmented_step(
    list: &mut LinkSegments,
    arena: &mut SegmentArena,
    fifo: bool,
    inflow_vol: f64,
    inflow_conc: &[f64],
    outflow_vol: f64,
    tol: &[f64],
) -> Vec<f64> {
    if inflow_vol > 0.0 {
        let seg = arena.alloc(inflow_vol, inflow_conc.to_vec());
        list.append_upstream(arena, seg, tol);
    }

    let n_species = inflow_conc.len();
    let mut drawn = vec![0.0; n_species];
    let mut remaining = outflow_vol;

    while remaining > TINY && !list.is_empty() {
        let id = if fifo {
            list.downstream.unwrap()
        } else {
            list.upstream.unwrap()
        };
        let seg = arena.get(id);
        let take = remaining.min(seg.volume);
        let conc = seg.concentrations.clone();
        let seg_volume = seg.volume;

        for (d, c) in drawn.iter_mut().zip(&conc) {
            *d += c * take;
        }

        if take >= seg_volume - TINY {
            if fifo {
                list.pop_downstream(arena);
            } else {
                list.pop_upstream(arena);
            }
        } else {
            arena.get_mut(id).volume -= take;
        }
        remaining -= take;
    }

    if outflow_vol > TINY {
        let delivered = outflow_vol - remaining;
        if delivered > TINY {
            for d in drawn.iter_mut() {
                *d /= delivered;
            }
        }
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_mix_blends_inflow() {
        let mut c = vec![0.0];
        let mut volume = 100.0;
        complete_mix(&mut c, &mut volume, 10.0, &[1.0], 10.0);
        assert!((c[0] - 10.0 / 110.0).abs() < 1e-9);
        assert!((volume - 100.0).abs() < 1e-9);
    }

    #[test]
    fn two_compartment_overflows_into_outlet() {
        let mut tc = TwoCompartment::new(1, 100.0, 20.0);
        tc.step(20.0, 15.0, &[5.0], 0.0);
        assert!(tc.inlet_volume <= 20.0 + 1e-9);
        assert!(tc.outlet_volume > 0.0);
    }

    #[test]
    fn fifo_draws_opposite_end_from_fill() {
        let mut arena = SegmentArena::new();
        let first = arena.alloc(10.0, vec![1.0]);
        let mut list = LinkSegments::single(first);
        let drawn = segmented_step(&mut list, &mut arena, true, 10.0, &[2.0], 10.0, &[0.0]);
        assert!((drawn[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn lifo_draws_same_end_as_fill() {
        let mut arena = SegmentArena::new();
        let first = arena.alloc(10.0, vec![1.0]);
        let mut list = LinkSegments::single(first);
        let drawn = segmented_step(&mut list, &mut arena, false, 10.0, &[2.0], 10.0, &[0.0]);
        assert!((drawn[0] - 2.0).abs() < 1e-9);
    }
}
