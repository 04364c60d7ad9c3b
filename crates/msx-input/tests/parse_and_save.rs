//! End-to-end parse of a small chemistry input file against a
//! caller-supplied topology, then a save/re-parse round trip.

use msx_network::builder::NetworkBuilder;
use msx_network::tank::MixingModel;

const CHLORINE_DECAY: &str = r#"
[TITLE]
Simple chlorine decay example

[SPECIES]
 BULK CL2 MG 0.01 0.001

[COEFFICIENTS]
 PARAMETER K1 -0.5
 CONSTANT  KB 20.0

[TERMS]
 RATEK K1 * CL2

[PIPES]
 RATE CL2 RATEK

[TANKS]
 RATE CL2 RATEK

[SOURCES]
 CONCEN RES1 CL2 1.2

[QUALITY]
 NODE RES1 CL2 1.2

[PARAMETERS]
 PIPE P1 K1 -0.8

[PATTERNS]
 PAT1 1.0 1.2 0.8
 PAT1 0.9 1.1

[OPTIONS]
 AREA_UNITS FT2
 RATE_UNITS HR
 SOLVER RK5
 COUPLING NONE
 TIMESTEP 300
 RTOL 0.001
 ATOL 0.0001

[REPORT]
 NODE ALL
 LINK P1
 SPECIE CL2 YES 3
"#;

fn topology() -> NetworkBuilder {
    let mut b = NetworkBuilder::new();
    let res1 = b.add_node("RES1", true);
    let n2 = b.add_node("N2", true);
    b.add_link("P1", res1, n2, 1.0, 1000.0, 100.0, true);
    b.add_tank(n2, MixingModel::CompleteMix, 100.0, 500.0, 0.0);
    b
}

#[test]
fn parses_every_section_against_supplied_topology() {
    let mut builder = topology();
    let parsed = msx_input::parse(CHLORINE_DECAY, &mut builder).expect("parse succeeds");

    assert_eq!(parsed.title, "Simple chlorine decay example");
    assert_eq!(parsed.options.timestep, 300.0);
    assert_eq!(parsed.options.solver, msx_solver::OdeMethod::Rk5);
    assert_eq!(parsed.options.coupling, msx_chemistry::Coupling::None);

    let net = builder.build().expect("builds a valid network");
    assert_eq!(net.species().len(), 1);
    assert_eq!(net.parameters().len(), 1);
    assert_eq!(net.constants().len(), 1);
    assert_eq!(net.terms().len(), 1);

    let cl2 = net.species_id("CL2").unwrap();
    assert!(net.species_at(cl2).unwrap().pipe_expr.expr.is_some());
    assert!(net.species_at(cl2).unwrap().tank_expr.expr.is_some());

    let res1 = net.node_id("RES1").unwrap();
    assert_eq!(net.node(res1).unwrap().sources.len(), 1);
    assert_eq!(net.node(res1).unwrap().init_qual[cl2.index_usize()], 1.2);

    let p1 = net.link_id("P1").unwrap();
    let k1 = net.parameters().iter().position(|p| p.name == "K1").unwrap();
    assert_eq!(net.link(p1).unwrap().param_values[k1], -0.8);

    let pat1 = &net.patterns()[0];
    assert_eq!(pat1.multipliers, vec![1.0, 1.2, 0.8, 0.9, 1.1]);
}

#[test]
fn save_then_reparse_preserves_species_and_options() {
    let mut builder = topology();
    let parsed = msx_input::parse(CHLORINE_DECAY, &mut builder).unwrap();
    let net = builder.build().unwrap();

    let mut buf: Vec<u8> = Vec::new();
    msx_input::save(&net, &parsed, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let mut builder2 = topology();
    let reparsed = msx_input::parse(&text, &mut builder2).expect("round-tripped file reparses");
    let net2 = builder2.build().unwrap();

    assert_eq!(net2.species().len(), net.species().len());
    assert_eq!(reparsed.options.timestep, parsed.options.timestep);
    assert_eq!(reparsed.options.solver, parsed.options.solver);
}

#[test]
fn undefined_species_reference_is_a_collected_error() {
    let mut builder = topology();
    let bad = "[PIPES]\n RATE GHOST K1\n";
    let err = msx_input::parse(bad, &mut builder).unwrap_err();
    match err {
        msx_input::InputError::Parse(errors) => {
            assert_eq!(errors.len(), 1);
        }
        other => panic!("expected Parse error, got {other:?}"),
    }
}
