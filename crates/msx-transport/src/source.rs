//! Node source evaluation (spec §4.6 step 7, §6 `[SOURCES]`).
//!
//! Per the recorded open-question contract (spec §9), multiple sources on
//! the same node targeting the same species combine by summing their
//! contributed mass rate; [`apply_sources`] implements that by folding over
//! every matching source in declaration order.

use msx_network::{Network, Source, SourceKind};

/// The concentration a source contributes to its target species at the
/// current pattern step, given the node's outflow rate (needed to convert
/// a mass-booster's mass rate into a concentration).
fn source_contribution(network: &Network, source: &Source, pattern_step: u64, outflow_rate: f64) -> f64 {
    let multiplier = source
        .pattern
        .and_then(|p| network.pattern(p))
        .map(|p| p.at(pattern_step))
        .unwrap_or(1.0);
    let strength = source.base_value * multiplier;

    match source.kind {
        SourceKind::MassBooster => {
            if outflow_rate > 0.0 {
                strength / outflow_rate
            } else {
                0.0
            }
        }
        SourceKind::Concentration | SourceKind::SetpointBooster | SourceKind::FlowPacedBooster => strength,
    }
}

/// Combine every source at `node` targeting `species` with the node's
/// pre-source concentration `base_conc`, returning the concentration that
/// leaves the node on its outgoing links.
///
/// - `Concentration` sources replace the outflow concentration outright
///   (an external supply at fixed quality).
/// - `MassBooster` and `FlowPacedBooster` sources add their contribution on
///   top of `base_conc`.
/// - `SetpointBooster` raises the outflow concentration to at least its
///   target value.
///
/// When several sources of different kinds target the same species, they
/// are applied in the order above (replace, then additive, then floor) so
/// the result is deterministic regardless of input order.
pub fn apply_sources(
    network: &Network,
    sources: &[Source],
    species: msx_core::SpeciesId,
    base_conc: f64,
    outflow_rate: f64,
    pattern_step: u64,
) -> f64 {
    let matching: Vec<&Source> = sources.iter().filter(|s| s.species == species).collect();
    if matching.is_empty() {
        return base_conc;
    }

    let mut concentration_override: Option<f64> = None;
    let mut additive = 0.0;
    let mut setpoint_floor: Option<f64> = None;

    for source in &matching {
        let value = source_contribution(network, source, pattern_step, outflow_rate);
        match source.kind {
            SourceKind::Concentration => {
                concentration_override = Some(concentration_override.unwrap_or(0.0) + value);
            }
            SourceKind::MassBooster | SourceKind::FlowPacedBooster => additive += value,
            SourceKind::SetpointBooster => {
                setpoint_floor = Some(setpoint_floor.map_or(value, |f: f64| f.max(value)));
            }
        }
    }

    let mut result = concentration_override.unwrap_or(base_conc) + additive;
    if let Some(floor) = setpoint_floor {
        result = result.max(floor);
    }
    result
}

#[cfg(test)]
mod tests {
    use msx_core::{SpeciesId, Tolerances};
    use msx_network::{NetworkBuilder, SpeciesKind};

    use super::*;

    fn one_species_network() -> (Network, SpeciesId) {
        let mut b = NetworkBuilder::new();
        let sp = b.add_species("C", SpeciesKind::Bulk, Tolerances::default(), 2, true);
        let n = b.add_node("N", true);
        let m = b.add_node("M", true);
        b.add_link("L", n, m, 1.0, 10.0, 100.0, true);
        let network = b.build().expect("network builds");
        (network, sp)
    }

    #[test]
    fn no_sources_returns_base_concentration() {
        let (network, sp) = one_species_network();
        let result = apply_sources(&network, &[], sp, 3.0, 1.0, 0);
        assert_eq!(result, 3.0);
    }

    #[test]
    fn concentration_source_overrides_base() {
        let (network, sp) = one_species_network();
        let sources = vec![Source {
            kind: SourceKind::Concentration,
            species: sp,
            base_value: 5.0,
            pattern: None,
        }];
        let result = apply_sources(&network, &sources, sp, 1.0, 1.0, 0);
        assert_eq!(result, 5.0);
    }

    #[test]
    fn mass_booster_divides_by_outflow_rate() {
        let (network, sp) = one_species_network();
        let sources = vec![Source {
            kind: SourceKind::MassBooster,
            species: sp,
            base_value: 10.0,
            pattern: None,
        }];
        let result = apply_sources(&network, &sources, sp, 0.0, 5.0, 0);
        assert_eq!(result, 2.0);
    }

    #[test]
    fn setpoint_booster_floors_but_does_not_lower() {
        let (network, sp) = one_species_network();
        let sources = vec![Source {
            kind: SourceKind::SetpointBooster,
            species: sp,
            base_value: 4.0,
            pattern: None,
        }];
        assert_eq!(apply_sources(&network, &sources, sp, 1.0, 1.0, 0), 4.0);
        assert_eq!(apply_sources(&network, &sources, sp, 9.0, 1.0, 0), 9.0);
    }

    #[test]
    fn two_mass_boosters_on_same_species_sum() {
        let (network, sp) = one_species_network();
        let sources = vec![
            Source {
                kind: SourceKind::MassBooster,
                species: sp,
                base_value: 10.0,
                pattern: None,
            },
            Source {
                kind: SourceKind::MassBooster,
                species: sp,
                base_value: 20.0,
                pattern: None,
            },
        ];
        let result = apply_sources(&network, &sources, sp, 0.0, 10.0, 0);
        assert!((result - 3.0).abs() < 1e-9);
    }
}
