//! Section-dispatch driver for the chemistry input-file format (spec §6).
//!
//! Topology (nodes, links, tanks and their geometry) is not part of this
//! file — it comes from the attached EPANET hydraulic project, which is out
//! of scope here (spec §1). `parse` therefore takes a [`NetworkBuilder`]
//! the caller has already populated with that topology, and only adds the
//! chemistry-specific entities: species, terms, parameters, constants,
//! patterns, reaction expressions, sources, initial quality and parameter
//! overrides, plus the free-standing `[OPTIONS]`/`[REPORT]`/`[TITLE]` data
//! this crate hands back as [`ParsedInput`].
//!
//! Errors are collected rather than raised on the first bad line, matching
//! `original_source/src/inputmsx.c`; parsing only fails once every line has
//! been seen (or `MAX_ERRORS` has been reached).

use std::collections::HashMap;

use msx_core::{HydVar, InputErrorCode};
use msx_expr::VarRef;
use msx_network::builder::NetworkBuilder;
use msx_network::source::{Source, SourceKind};
use msx_network::species::{ExprKind, SpeciesKind};

use crate::error::{InputError, InputResult, ParseError, MAX_ERRORS};
use crate::exprparse::parse_expr;
use crate::keywords::*;
use crate::lexer::{tokenize_all, Line};
use crate::options::{Options, ReportConfig};

#[derive(Debug, Clone, Default)]
pub struct ParsedInput {
    pub title: String,
    pub options: Options,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Title,
    Species,
    Coefficients,
    Terms,
    Pipes,
    Tanks,
    Sources,
    Quality,
    Parameters,
    Patterns,
    Options,
    Report,
}

fn section_from_name(name: &str) -> Option<Section> {
    match find_index(SECTION_WORDS, name)? {
        0 => Some(Section::Title),
        1 => Some(Section::Species),
        2 => Some(Section::Coefficients),
        3 => Some(Section::Terms),
        4 => Some(Section::Pipes),
        5 => Some(Section::Tanks),
        6 => Some(Section::Sources),
        7 => Some(Section::Quality),
        8 => Some(Section::Parameters),
        9 => Some(Section::Patterns),
        10 => Some(Section::Options),
        11 => Some(Section::Report),
        _ => None,
    }
}

fn hydvar_from_name(name: &str) -> Option<HydVar> {
    match name {
        "D" => Some(HydVar::Diameter),
        "Q" => Some(HydVar::Flow),
        "U" => Some(HydVar::Velocity),
        "Re" => Some(HydVar::ReynoldsNumber),
        "Us" => Some(HydVar::ShearVelocity),
        "Ff" => Some(HydVar::FrictionFactor),
        "Av" => Some(HydVar::AreaVolumeRatio),
        _ => None,
    }
}

/// Reverse of [`hydvar_from_name`], used when rendering an expression back
/// to text (`crate::save`).
pub(crate) fn hydvar_letter(hv: HydVar) -> &'static str {
    match hv {
        HydVar::Diameter => "D",
        HydVar::Flow => "Q",
        HydVar::Velocity => "U",
        HydVar::ReynoldsNumber => "Re",
        HydVar::ShearVelocity => "Us",
        HydVar::FrictionFactor => "Ff",
        HydVar::AreaVolumeRatio => "Av",
        // Not part of the file format's hydraulic-variable vocabulary
        // (`original_source/src/msxdict.h`'s `HydVarWords` has no entry for
        // it); only reachable here if something constructs a `VarRef::Hyd`
        // referencing it directly rather than through the parser.
        HydVar::Roughness => "Rough",
    }
}

fn resolve_name(builder: &NetworkBuilder, name: &str) -> Option<VarRef> {
    if let Some(id) = builder.find_species(name) {
        return Some(VarRef::Species(id));
    }
    if let Some(id) = builder.find_term(name) {
        return Some(VarRef::Term(id));
    }
    if let Some(id) = builder.find_parameter(name) {
        return Some(VarRef::Param(id));
    }
    if let Some(id) = builder.find_constant(name) {
        return Some(VarRef::Const(id));
    }
    if let Some(hv) = hydvar_from_name(name) {
        return Some(VarRef::Hyd(hv));
    }
    None
}

fn bad_number(line: usize, what: &str) -> ParseError {
    ParseError {
        line,
        code: InputErrorCode::BadNumber,
        detail: what.to_string(),
    }
}

fn too_few(line: usize) -> ParseError {
    ParseError {
        line,
        code: InputErrorCode::TooFewItems,
        detail: "not enough items on line".to_string(),
    }
}

fn bad_keyword(line: usize, what: impl Into<String>) -> ParseError {
    ParseError {
        line,
        code: InputErrorCode::BadKeyword,
        detail: what.into(),
    }
}

fn undefined_ref(line: usize, what: impl Into<String>) -> ParseError {
    ParseError {
        line,
        code: InputErrorCode::UndefinedRef,
        detail: what.into(),
    }
}

fn parse_f64(tok: &str, line: usize) -> Result<f64, ParseError> {
    tok.parse::<f64>()
        .map_err(|_| bad_number(line, &format!("'{tok}' is not a number")))
}

struct State {
    builder_patterns: HashMap<String, msx_core::PatternId>,
    title_lines: Vec<String>,
    options: Options,
    report: ReportConfig,
    /// Species whose `[SPECIES]` line omitted the optional `aTol rTol`
    /// pair; back-filled from `[OPTIONS] RTOL`/`ATOL` once the whole file
    /// has been parsed, since that section can appear before or after
    /// `[SPECIES]`.
    default_tol_species: Vec<msx_core::SpeciesId>,
}

/// Parse a chemistry input file's text into `builder`, returning the
/// free-standing title/options/report data that doesn't belong on the
/// network itself.
pub fn parse(text: &str, builder: &mut NetworkBuilder) -> InputResult<ParsedInput> {
    let lines = tokenize_all(text).map_err(|e| InputError::Parse(vec![e]))?;

    let mut state = State {
        builder_patterns: HashMap::new(),
        title_lines: Vec::new(),
        options: Options::default(),
        report: ReportConfig::default(),
        default_tol_species: Vec::new(),
    };
    let mut errors: Vec<ParseError> = Vec::new();
    let mut section: Option<Section> = None;

    for line in &lines {
        if errors.len() >= MAX_ERRORS {
            break;
        }
        if line.is_section_header() {
            let name = line.section_name().unwrap_or_default();
            match section_from_name(&name) {
                Some(s) => section = Some(s),
                None => errors.push(bad_keyword(line.number, format!("unknown section [{name}]"))),
            }
            continue;
        }
        let Some(section) = section else {
            errors.push(bad_keyword(line.number, "data line before any section header"));
            continue;
        };
        let result = match section {
            Section::Title => {
                state.title_lines.push(line.text.clone());
                Ok(())
            }
            Section::Species => handle_species(line, builder, &mut state.default_tol_species),
            Section::Coefficients => handle_coefficients(line, builder),
            Section::Terms => handle_terms(line, builder),
            Section::Pipes => handle_zone_expr(line, builder, true),
            Section::Tanks => handle_zone_expr(line, builder, false),
            Section::Sources => handle_sources(line, builder),
            Section::Quality => handle_quality(line, builder),
            Section::Parameters => handle_parameters(line, builder),
            Section::Patterns => handle_patterns(line, builder, &mut state.builder_patterns),
            Section::Options => handle_options(line, &mut state.options),
            Section::Report => handle_report(line, builder, &mut state.report),
        };
        if let Err(e) = result {
            errors.push(e);
        }
    }

    if !errors.is_empty() {
        return Err(InputError::Parse(errors));
    }

    let project_tol = msx_core::Tolerances {
        abs: state.options.atol,
        rel: state.options.rtol,
    };
    for species in &state.default_tol_species {
        builder.set_species_tolerances(*species, project_tol);
    }

    Ok(ParsedInput {
        title: state.title_lines.join("\n"),
        options: state.options,
        report: state.report,
    })
}

fn handle_species(
    line: &Line,
    builder: &mut NetworkBuilder,
    default_tol_species: &mut Vec<msx_core::SpeciesId>,
) -> Result<(), ParseError> {
    let t = &line.tokens;
    if t.len() < 3 {
        return Err(too_few(line.number));
    }
    let kind = if t[0].eq_ignore_ascii_case("BULK") {
        SpeciesKind::Bulk
    } else if t[0].eq_ignore_ascii_case("WALL") {
        SpeciesKind::Wall
    } else {
        return Err(bad_keyword(line.number, format!("'{}' is not BULK or WALL", t[0])));
    };
    if find_index(MASS_UNITS_WORDS, &t[2]).is_none() {
        return Err(bad_keyword(line.number, format!("'{}' is not a recognized mass unit", t[2])));
    }
    let explicit_tol = t.len() >= 5;
    let tolerances = if explicit_tol {
        msx_core::Tolerances {
            abs: parse_f64(&t[3], line.number)?,
            rel: parse_f64(&t[4], line.number)?,
        }
    } else {
        msx_core::Tolerances::default()
    };
    let id = builder.add_species(t[1].clone(), kind, tolerances, 2, false);
    if !explicit_tol {
        default_tol_species.push(id);
    }
    Ok(())
}

fn handle_coefficients(line: &Line, builder: &mut NetworkBuilder) -> Result<(), ParseError> {
    let t = &line.tokens;
    if t.len() < 3 {
        return Err(too_few(line.number));
    }
    let value = parse_f64(&t[2], line.number)?;
    if t[0].eq_ignore_ascii_case("PARAMETER") {
        builder.add_parameter(t[1].clone(), value);
    } else if t[0].eq_ignore_ascii_case("CONSTANT") {
        builder.add_constant(t[1].clone(), value);
    } else {
        return Err(bad_keyword(line.number, format!("'{}' is not PARAMETER or CONSTANT", t[0])));
    }
    Ok(())
}

fn handle_terms(line: &Line, builder: &mut NetworkBuilder) -> Result<(), ParseError> {
    let t = &line.tokens;
    if t.len() < 2 {
        return Err(too_few(line.number));
    }
    let name = t[0].clone();
    let expr_text = t[1..].join(" ");
    let expr = parse_expr(&expr_text, &mut |n| resolve_name(builder, n))
        .map_err(|e| ParseError {
            line: line.number,
            code: InputErrorCode::IllegalMathExpr,
            detail: e.0,
        })?;
    builder.add_term(name, expr);
    Ok(())
}

fn handle_zone_expr(line: &Line, builder: &mut NetworkBuilder, is_pipe: bool) -> Result<(), ParseError> {
    let t = &line.tokens;
    if t.len() < 3 {
        return Err(too_few(line.number));
    }
    let kind_idx = find_index(EXPR_TYPE_WORDS, &t[0])
        .ok_or_else(|| bad_keyword(line.number, format!("'{}' is not RATE/FORMULA/EQUIL", t[0])))?;
    let kind = match kind_idx {
        0 => ExprKind::Rate,
        1 => ExprKind::Formula,
        _ => ExprKind::Equilibrium,
    };
    if is_pipe && kind == ExprKind::Equilibrium {
        return Err(bad_keyword(line.number, "EQUIL is not valid for a pipe reaction expression"));
    }
    let species = builder
        .find_species(&t[1])
        .ok_or_else(|| undefined_ref(line.number, format!("species '{}' is undefined", t[1])))?;
    let expr_text = t[2..].join(" ");
    let expr = parse_expr(&expr_text, &mut |n| resolve_name(builder, n))
        .map_err(|e| ParseError {
            line: line.number,
            code: InputErrorCode::IllegalMathExpr,
            detail: e.0,
        })?;
    if is_pipe {
        builder.set_pipe_expr(species, kind, expr);
    } else {
        builder.set_tank_expr(species, kind, expr);
    }
    Ok(())
}

fn handle_sources(line: &Line, builder: &mut NetworkBuilder) -> Result<(), ParseError> {
    let t = &line.tokens;
    if t.len() < 4 {
        return Err(too_few(line.number));
    }
    let kind = if t[0].eq_ignore_ascii_case("CONCEN") {
        SourceKind::Concentration
    } else if t[0].eq_ignore_ascii_case("MASS") {
        SourceKind::MassBooster
    } else if t[0].eq_ignore_ascii_case("FLOWPACED") {
        SourceKind::FlowPacedBooster
    } else if t[0].eq_ignore_ascii_case("SETPOINT") {
        SourceKind::SetpointBooster
    } else {
        return Err(bad_keyword(line.number, format!("'{}' is not a source type", t[0])));
    };
    let node = builder
        .find_node(&t[1])
        .ok_or_else(|| undefined_ref(line.number, format!("node '{}' is undefined", t[1])))?;
    let species = builder
        .find_species(&t[2])
        .ok_or_else(|| undefined_ref(line.number, format!("species '{}' is undefined", t[2])))?;
    let base_value = parse_f64(&t[3], line.number)?;
    let pattern = match t.get(4) {
        Some(name) => Some(
            builder
                .find_pattern(name)
                .ok_or_else(|| undefined_ref(line.number, format!("pattern '{name}' is undefined")))?,
        ),
        None => None,
    };
    builder.add_source(
        node,
        Source {
            kind,
            species,
            base_value,
            pattern,
        },
    );
    Ok(())
}

fn handle_quality(line: &Line, builder: &mut NetworkBuilder) -> Result<(), ParseError> {
    let t = &line.tokens;
    if t.len() < 4 {
        return Err(too_few(line.number));
    }
    let value = parse_f64(&t[3], line.number)?;
    let species = builder
        .find_species(&t[2])
        .ok_or_else(|| undefined_ref(line.number, format!("species '{}' is undefined", t[2])))?;
    if t[0].eq_ignore_ascii_case("NODE") {
        let node = builder
            .find_node(&t[1])
            .ok_or_else(|| undefined_ref(line.number, format!("node '{}' is undefined", t[1])))?;
        builder.set_node_init_qual(node, species, value);
    } else if t[0].eq_ignore_ascii_case("LINK") {
        let link = builder
            .find_link(&t[1])
            .ok_or_else(|| undefined_ref(line.number, format!("link '{}' is undefined", t[1])))?;
        builder.set_link_init_qual(link, species, value);
    } else {
        return Err(bad_keyword(line.number, format!("'{}' is not NODE or LINK", t[0])));
    }
    Ok(())
}

fn handle_parameters(line: &Line, builder: &mut NetworkBuilder) -> Result<(), ParseError> {
    let t = &line.tokens;
    if t.len() < 4 {
        return Err(too_few(line.number));
    }
    let value = parse_f64(&t[3], line.number)?;
    let param = builder
        .find_parameter(&t[2])
        .ok_or_else(|| undefined_ref(line.number, format!("parameter '{}' is undefined", t[2])))?;
    if t[0].eq_ignore_ascii_case("PIPE") {
        let link = builder
            .find_link(&t[1])
            .ok_or_else(|| undefined_ref(line.number, format!("link '{}' is undefined", t[1])))?;
        builder.set_link_param(link, param, value);
    } else if t[0].eq_ignore_ascii_case("TANK") {
        let node = builder
            .find_node(&t[1])
            .ok_or_else(|| undefined_ref(line.number, format!("node '{}' is undefined", t[1])))?;
        let tank = builder
            .tank_of_node(node)
            .ok_or_else(|| undefined_ref(line.number, format!("node '{}' is not a tank", t[1])))?;
        builder.set_tank_param(tank, param, value);
    } else {
        return Err(bad_keyword(line.number, format!("'{}' is not PIPE or TANK", t[0])));
    }
    Ok(())
}

fn handle_patterns(
    line: &Line,
    builder: &mut NetworkBuilder,
    seen: &mut HashMap<String, msx_core::PatternId>,
) -> Result<(), ParseError> {
    let t = &line.tokens;
    if t.len() < 2 {
        return Err(too_few(line.number));
    }
    let mut values = Vec::with_capacity(t.len() - 1);
    for tok in &t[1..] {
        values.push(parse_f64(tok, line.number)?);
    }
    if let Some(&id) = seen.get(&t[0]) {
        builder.extend_pattern(id, values);
    } else {
        let id = builder.add_pattern(t[0].clone(), values);
        seen.insert(t[0].clone(), id);
    }
    Ok(())
}

fn handle_options(line: &Line, options: &mut Options) -> Result<(), ParseError> {
    let t = &line.tokens;
    if t.len() < 2 {
        return Err(too_few(line.number));
    }
    let kw = find_index(OPTION_TYPE_WORDS, &t[0])
        .ok_or_else(|| bad_keyword(line.number, format!("'{}' is not a recognized option", t[0])))?;
    match kw {
        0 => {
            let idx = find_index(AREA_UNITS_WORDS, &t[1])
                .ok_or_else(|| bad_keyword(line.number, format!("'{}' is not a recognized area unit", t[1])))?;
            options.area_units = match idx {
                0 => msx_core::AreaUnits::Ft2,
                1 => msx_core::AreaUnits::M2,
                _ => msx_core::AreaUnits::Cm2,
            };
        }
        1 => {
            let idx = find_index(TIME_UNITS_WORDS, &t[1])
                .ok_or_else(|| bad_keyword(line.number, format!("'{}' is not a recognized time unit", t[1])))?;
            options.rate_units = match idx {
                0 => msx_core::RateUnits::Seconds,
                1 => msx_core::RateUnits::Minutes,
                2 => msx_core::RateUnits::Hours,
                _ => msx_core::RateUnits::Days,
            };
        }
        2 => {
            let idx = find_index(SOLVER_TYPE_WORDS, &t[1])
                .ok_or_else(|| bad_keyword(line.number, format!("'{}' is not a recognized solver", t[1])))?;
            options.solver = match idx {
                0 => msx_solver::OdeMethod::Eul,
                1 => msx_solver::OdeMethod::Rk5,
                _ => msx_solver::OdeMethod::Ros2,
            };
        }
        3 => {
            let idx = find_index(COUPLING_WORDS, &t[1])
                .ok_or_else(|| bad_keyword(line.number, format!("'{}' is not NONE or FULL", t[1])))?;
            options.coupling = if idx == 0 {
                msx_chemistry::Coupling::None
            } else {
                msx_chemistry::Coupling::Full
            };
        }
        4 => options.timestep = parse_f64(&t[1], line.number)?,
        5 => options.rtol = parse_f64(&t[1], line.number)?,
        6 => options.atol = parse_f64(&t[1], line.number)?,
        7 => options.report_start = parse_f64(&t[1], line.number)?,
        _ => options.report_step = parse_f64(&t[1], line.number)?,
    }
    Ok(())
}

fn handle_report(line: &Line, builder: &mut NetworkBuilder, report: &mut ReportConfig) -> Result<(), ParseError> {
    let t = &line.tokens;
    if t.len() < 2 {
        return Err(too_few(line.number));
    }
    let kw = find_index(REPORT_WORDS, &t[0])
        .ok_or_else(|| bad_keyword(line.number, format!("'{}' is not a recognized report keyword", t[0])))?;
    match kw {
        0 => {
            if t[1].eq_ignore_ascii_case("ALL") {
                let ids: Vec<_> = builder.node_ids().collect();
                for id in ids {
                    builder.set_node_report(id, true);
                }
            } else if t[1].eq_ignore_ascii_case("NONE") {
                let ids: Vec<_> = builder.node_ids().collect();
                for id in ids {
                    builder.set_node_report(id, false);
                }
            } else {
                let node = builder
                    .find_node(&t[1])
                    .ok_or_else(|| undefined_ref(line.number, format!("node '{}' is undefined", t[1])))?;
                builder.set_node_report(node, true);
            }
        }
        1 => {
            if t[1].eq_ignore_ascii_case("ALL") {
                let ids: Vec<_> = builder.link_ids().collect();
                for id in ids {
                    builder.set_link_report(id, true);
                }
            } else if t[1].eq_ignore_ascii_case("NONE") {
                let ids: Vec<_> = builder.link_ids().collect();
                for id in ids {
                    builder.set_link_report(id, false);
                }
            } else {
                let link = builder
                    .find_link(&t[1])
                    .ok_or_else(|| undefined_ref(line.number, format!("link '{}' is undefined", t[1])))?;
                builder.set_link_report(link, true);
            }
        }
        2 => {
            if t.len() < 3 {
                return Err(too_few(line.number));
            }
            let species = builder
                .find_species(&t[1])
                .ok_or_else(|| undefined_ref(line.number, format!("species '{}' is undefined", t[1])))?;
            let on = t[2].eq_ignore_ascii_case("YES");
            let precision = t.get(3).and_then(|s| s.parse::<u8>().ok());
            builder.set_species_report(species, on, precision);
        }
        3 => report.report_file = Some(t[1].clone()),
        _ => report.page_size = t[1].parse().map_err(|_| bad_number(line.number, "PAGESIZE must be an integer"))?,
    }
    Ok(())
}
