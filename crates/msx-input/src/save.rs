//! Writes a chemistry input file back out from a built [`Network`] plus the
//! free-standing data [`crate::parser::parse`] returned.
//!
//! `original_source/src/msxfile.c`'s `savemsxfile` rewrites `[TITLE]`,
//! `[PATTERNS]` and `[SOURCES]` from in-memory state and copies every other
//! section's lines verbatim from the original input file's text. This
//! crate does not retain that text after parsing, so every section here is
//! instead regenerated from the network model — a full round trip rather
//! than a patch over the original bytes. One section is lossy: `[SPECIES]`
//! always writes the `MG` mass-unit token, since `Species` does not carry
//! the unit it was declared with (spec §3 models tolerances, not units).

use std::io::{self, Write};

use msx_expr::VarRef;
use msx_network::network::Network;
use msx_network::species::{ExprKind, SpeciesKind};

use crate::parser::{hydvar_letter, ParsedInput};

fn name_var(net: &Network, var: VarRef) -> String {
    match var {
        VarRef::Species(id) => net.species_at(id).map(|s| s.name.clone()).unwrap_or_default(),
        VarRef::Term(id) => net.term(id).map(|t| t.name.clone()).unwrap_or_default(),
        VarRef::Param(id) => net.parameter(id).map(|p| p.name.clone()).unwrap_or_default(),
        VarRef::Const(id) => net.constant(id).map(|c| c.name.clone()).unwrap_or_default(),
        VarRef::Hyd(hv) => hydvar_letter(hv).to_string(),
    }
}

fn expr_kind_word(kind: ExprKind) -> &'static str {
    match kind {
        ExprKind::Rate => "RATE",
        ExprKind::Formula => "FORMULA",
        ExprKind::Equilibrium => "EQUIL",
        ExprKind::None => "",
    }
}

/// Serialize `net` and `parsed` as chemistry input-file text.
pub fn save(net: &Network, parsed: &ParsedInput, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "[TITLE]")?;
    if !parsed.title.is_empty() {
        writeln!(out, "{}", parsed.title)?;
    }
    writeln!(out)?;

    writeln!(out, "[SPECIES]")?;
    for s in net.species() {
        let kind = match s.kind {
            SpeciesKind::Bulk => "BULK",
            SpeciesKind::Wall => "WALL",
        };
        writeln!(
            out,
            " {kind:<6}{:<16}MG{:>12.6}{:>12.6}",
            s.name, s.tolerances.abs, s.tolerances.rel
        )?;
    }
    writeln!(out)?;

    writeln!(out, "[COEFFICIENTS]")?;
    for p in net.parameters() {
        writeln!(out, " PARAMETER {:<16}{:.6}", p.name, p.default_value)?;
    }
    for c in net.constants() {
        writeln!(out, " CONSTANT  {:<16}{:.6}", c.name, c.value)?;
    }
    writeln!(out)?;

    writeln!(out, "[TERMS]")?;
    for t in net.terms() {
        let text = t
            .expr
            .format(&mut |v| name_var(net, v))
            .unwrap_or_else(|_| "0".to_string());
        writeln!(out, " {:<16}{text}", t.name)?;
    }
    writeln!(out)?;

    writeln!(out, "[PIPES]")?;
    for s in net.species() {
        if let Some(expr) = &s.pipe_expr.expr {
            let text = expr.format(&mut |v| name_var(net, v)).unwrap_or_default();
            writeln!(out, " {:<8}{:<16}{text}", expr_kind_word(s.pipe_expr.kind), s.name)?;
        }
    }
    writeln!(out)?;

    writeln!(out, "[TANKS]")?;
    for s in net.species() {
        if let Some(expr) = &s.tank_expr.expr {
            let text = expr.format(&mut |v| name_var(net, v)).unwrap_or_default();
            writeln!(out, " {:<8}{:<16}{text}", expr_kind_word(s.tank_expr.kind), s.name)?;
        }
    }
    writeln!(out)?;

    writeln!(out, "[SOURCES]")?;
    for node in net.nodes() {
        for src in &node.sources {
            let kind = match src.kind {
                msx_network::source::SourceKind::Concentration => "CONCEN",
                msx_network::source::SourceKind::MassBooster => "MASS",
                msx_network::source::SourceKind::FlowPacedBooster => "FLOWPACED",
                msx_network::source::SourceKind::SetpointBooster => "SETPOINT",
            };
            let species_name = net
                .species_at(src.species)
                .map(|s| s.name.as_str())
                .unwrap_or_default();
            write!(out, " {kind:<10}{:<16}{:<16}{:.6}", node.name, species_name, src.base_value)?;
            if let Some(pid) = src.pattern {
                let pname = net.pattern(pid).map(|p| p.name.as_str()).unwrap_or_default();
                write!(out, " {pname}")?;
            }
            writeln!(out)?;
        }
    }
    writeln!(out)?;

    writeln!(out, "[QUALITY]")?;
    for node in net.nodes() {
        for (i, &v) in node.init_qual.iter().enumerate() {
            if v != 0.0 {
                let name = net
                    .species_at(msx_core::SpeciesId::from_index(i as u32))
                    .map(|s| s.name.as_str())
                    .unwrap_or_default();
                writeln!(out, " NODE {:<16}{name:<16}{v:.6}", node.name)?;
            }
        }
    }
    for link in net.links() {
        for (i, &v) in link.init_qual.iter().enumerate() {
            if v != 0.0 {
                let name = net
                    .species_at(msx_core::SpeciesId::from_index(i as u32))
                    .map(|s| s.name.as_str())
                    .unwrap_or_default();
                writeln!(out, " LINK {:<16}{name:<16}{v:.6}", link.name)?;
            }
        }
    }
    writeln!(out)?;

    writeln!(out, "[PARAMETERS]")?;
    for link in net.links() {
        for (i, p) in net.parameters().iter().enumerate() {
            let default = p.default_value;
            if let Some(&v) = link.param_values.get(i) {
                if v != default {
                    writeln!(out, " PIPE {:<16}{:<16}{v:.6}", link.name, p.name)?;
                }
            }
        }
    }
    for tank in net.tanks() {
        let node_name = net.node(tank.node).map(|n| n.name.as_str()).unwrap_or_default();
        for (i, p) in net.parameters().iter().enumerate() {
            if let Some(&v) = tank.param_values.get(i) {
                if v != p.default_value {
                    writeln!(out, " TANK {node_name:<16}{:<16}{v:.6}", p.name)?;
                }
            }
        }
    }
    writeln!(out)?;

    writeln!(out, "[PATTERNS]")?;
    for p in net.patterns() {
        for chunk in p.multipliers.chunks(6) {
            write!(out, " {:<15}", p.name)?;
            for v in chunk {
                write!(out, " {v:12.4}")?;
            }
            writeln!(out)?;
        }
    }
    writeln!(out)?;

    writeln!(out, "[OPTIONS]")?;
    let area = match parsed.options.area_units {
        msx_core::AreaUnits::Ft2 => "FT2",
        msx_core::AreaUnits::M2 => "M2",
        msx_core::AreaUnits::Cm2 => "CM2",
    };
    let rate = match parsed.options.rate_units {
        msx_core::RateUnits::Seconds => "SEC",
        msx_core::RateUnits::Minutes => "MIN",
        msx_core::RateUnits::Hours => "HR",
        msx_core::RateUnits::Days => "DAY",
    };
    let solver = match parsed.options.solver {
        msx_solver::OdeMethod::Eul => "EUL",
        msx_solver::OdeMethod::Rk5 => "RK5",
        msx_solver::OdeMethod::Ros2 => "ROS2",
    };
    let coupling = match parsed.options.coupling {
        msx_chemistry::Coupling::None => "NONE",
        msx_chemistry::Coupling::Full => "FULL",
    };
    writeln!(out, " AREA_UNITS  {area}")?;
    writeln!(out, " RATE_UNITS  {rate}")?;
    writeln!(out, " SOLVER      {solver}")?;
    writeln!(out, " COUPLING    {coupling}")?;
    writeln!(out, " TIMESTEP    {}", parsed.options.timestep)?;
    writeln!(out, " RTOL        {}", parsed.options.rtol)?;
    writeln!(out, " ATOL        {}", parsed.options.atol)?;
    writeln!(out, " REPORT_START {}", parsed.options.report_start)?;
    writeln!(out, " REPORT_STEP  {}", parsed.options.report_step)?;
    writeln!(out)?;

    writeln!(out, "[REPORT]")?;
    for node in net.nodes() {
        if node.report {
            writeln!(out, " NODE {}", node.name)?;
        }
    }
    for link in net.links() {
        if link.report {
            writeln!(out, " LINK {}", link.name)?;
        }
    }
    for s in net.species() {
        writeln!(
            out,
            " SPECIE {:<16}{:<4}{}",
            s.name,
            if s.report { "YES" } else { "NO" },
            s.report_precision
        )?;
    }
    if let Some(file) = &parsed.report.report_file {
        writeln!(out, " FILE {file}")?;
    }
    if parsed.report.page_size > 0 {
        writeln!(out, " PAGESIZE {}", parsed.report.page_size)?;
    }

    Ok(())
}

