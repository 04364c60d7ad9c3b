//! Plain-text results report, grounded on
//! `original_source/src/reportmsx.c`'s `writeNodeTable`/`writeLinkTable`
//! pair: one table per reported node/link, one row per time step, one
//! column per reported species, paginated by
//! [`msx_input::ReportConfig::page_size`] the way `PageHdr`/`TableHdr`
//! break up the legacy listing.

use std::io::{self, Write};

use msx_network::Network;

use crate::binout::{OutHeader, OutStep};

const LOGO: &str = "  ******************   MSX Results Report  ******************";

/// `HH:MM:SS` elapsed-time label, matching the legacy report's time column.
fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{h}:{m:02}:{s:02}")
}

/// Writes one page header followed by a per-step table for every node
/// flagged `report`, then every link flagged `report`, restricted to the
/// species flagged `report` on the network.
pub fn write_report(
    out: &mut impl Write,
    net: &Network,
    header: &OutHeader,
    steps: &[OutStep],
    page_size: usize,
) -> io::Result<()> {
    let species_cols: Vec<usize> = net
        .species()
        .iter()
        .enumerate()
        .filter(|(_, s)| s.report)
        .map(|(i, _)| i)
        .collect();

    writeln!(out, "{LOGO}")?;
    writeln!(out)?;

    for (node_idx, node) in net.nodes().iter().enumerate() {
        if !node.report {
            continue;
        }
        write_table(out, &format!("Node {}", node.name), &species_cols, net, page_size, steps, |step, sp| {
            step.node_qual(header, node_idx, sp)
        })?;
    }

    for (link_idx, link) in net.links().iter().enumerate() {
        if !link.report {
            continue;
        }
        write_table(out, &format!("Link {}", link.name), &species_cols, net, page_size, steps, |step, sp| {
            step.link_qual(header, link_idx, sp)
        })?;
    }

    Ok(())
}

fn write_table(
    out: &mut impl Write,
    title: &str,
    species_cols: &[usize],
    net: &Network,
    page_size: usize,
    steps: &[OutStep],
    value_at: impl Fn(&OutStep, usize) -> f64,
) -> io::Result<()> {
    if species_cols.is_empty() {
        return Ok(());
    }
    let page_size = page_size.max(1);
    for (row, chunk_start) in (0..steps.len()).step_by(page_size).enumerate() {
        if row > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{title}")?;
        write!(out, "{:>12}", "Time")?;
        for &sp in species_cols {
            write!(out, "{:>14}", net.species()[sp].name)?;
        }
        writeln!(out)?;

        let end = (chunk_start + page_size).min(steps.len());
        for step in &steps[chunk_start..end] {
            write!(out, "{:>12}", format_time(step.time))?;
            for &sp in species_cols {
                let precision = net.species()[sp].report_precision as usize;
                write!(out, "{:>14.precision$}", value_at(step, sp), precision = precision)?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use msx_network::builder::NetworkBuilder;

    #[test]
    fn writes_a_table_for_reported_nodes_only() {
        let mut builder = NetworkBuilder::new();
        let n1 = builder.add_node("N1", true);
        let n2 = builder.add_node("N2", true);
        builder.add_link("P1", n1, n2, 1.0, 100.0, 100.0, true);
        builder.set_node_report(n1, true);
        let cl2 = builder.add_species(
            "CL2",
            msx_network::species::SpeciesKind::Bulk,
            msx_core::Tolerances::default(),
            2,
            false,
        );
        builder.set_species_report(cl2, true, Some(2));
        let net = builder.build().unwrap();

        let header = OutHeader {
            n_nodes: 2,
            n_links: 1,
            n_tanks: 0,
            n_species: 1,
        };
        let steps = vec![OutStep {
            time: 0.0,
            node_qual: vec![1.234, 0.0],
            link_qual: vec![0.0],
            tank_volume: vec![],
        }];

        let mut buf: Vec<u8> = Vec::new();
        write_report(&mut buf, &net, &header, &steps, 24).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Node N1"));
        assert!(!text.contains("Node N2"));
        assert!(text.contains("CL2"));
    }
}
