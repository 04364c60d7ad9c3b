//! The `Project` service layer (spec §5 "Engine"): opens a chemistry
//! project against a network, attaches a precomputed hydraulics file, and
//! drives the quality-step clock — the same open/attach/init/step/close
//! lifecycle as the legacy toolkit's `MSXopen`/`MSXusehydfile`/`MSXinit`/
//! `MSXstep`/`MSXclose` (`original_source/src/toolkitmsx.c`), reshaped into
//! a single owned struct that wraps a simulation run behind a
//! request/response call.

use std::path::{Path, PathBuf};

use msx_core::{SpeciesId, Ucf};
use msx_hyd::{HydReader, HydStep};
use msx_input::{parse, Options, ParsedInput, ReportConfig};
use msx_network::{Network, NetworkBuilder};
use msx_results::{OutHeader, OutReader, OutStep, OutWriter};
use msx_transport::QualityTransport;

use crate::error::{EngineError, EngineResult};

struct RunState {
    transport: QualityTransport,
    hyd: HydReader,
    flows: Vec<f64>,
    next: Option<HydStep>,
    qtime: f64,
    hyd_exhausted: bool,
    /// Next reporting time (`Rtime`); a snapshot is due once `qtime` reaches
    /// it, after which it advances by the effective report step.
    rtime: f64,
}

/// An opened chemistry project bound to a network topology, not yet
/// attached to a hydraulics file.
pub struct Project {
    network: Network,
    options: Options,
    report_config: ReportConfig,
    merge_tol: Vec<f64>,
    hyd_path: Option<PathBuf>,
    state: Option<RunState>,
}

impl Project {
    /// Parse `chem_text` against `builder`'s topology and build the
    /// network (spec §5 "`open` parses the chemistry file against a
    /// caller-supplied topology").
    pub fn open(chem_text: &str, mut builder: NetworkBuilder) -> EngineResult<(Self, ParsedInput)> {
        let parsed = parse(chem_text, &mut builder)?;
        let network = builder.build()?;
        let merge_tol = network.species().iter().map(|s| s.tolerances.abs).collect();
        let project = Self {
            network,
            options: parsed.options.clone(),
            report_config: parsed.report.clone(),
            merge_tol,
            hyd_path: None,
            state: None,
        };
        Ok((project, parsed))
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Attach a precomputed hydraulics file (spec §1 "hydraulics front end
    /// is out of scope"; this crate only replays what it already wrote).
    pub fn use_hyd_file(&mut self, path: impl Into<PathBuf>) {
        self.hyd_path = Some(path.into());
    }

    /// Open the hydraulics file and prime the transport state at `t = 0`
    /// (`MSXinit`).
    pub fn init(&mut self) -> EngineResult<()> {
        let path = self.hyd_path.clone().ok_or(EngineError::NoHydFile)?;
        let mut hyd = HydReader::open(&path, self.network.nodes().len(), self.network.links().len())?;

        let first = hyd.next_step()?;
        let next = hyd.next_step()?;
        let flows = first.map(|s| s.flow).unwrap_or_else(|| vec![0.0; self.network.links().len()]);
        let hyd_exhausted = next.is_none();

        let ucf = Ucf::new(self.options.area_units, self.options.rate_units);
        let h0 = ucf.seconds_to_rate_time((self.options.timestep / 10.0).max(1.0));
        let transport = QualityTransport::open(
            &self.network,
            self.options.coupling,
            self.options.solver,
            h0,
            ucf,
            self.options.rtol,
            self.options.atol,
        );

        self.state = Some(RunState {
            transport,
            hyd,
            flows,
            next,
            qtime: 0.0,
            hyd_exhausted,
            rtime: self.options.report_start,
        });
        Ok(())
    }

    /// `Rstep`: the reporting period length. `[OPTIONS] REPORT_STEP` falls
    /// back to the quality `TIMESTEP` when unset, so the default behavior is
    /// "report every quality step."
    fn report_step(&self) -> f64 {
        if self.options.report_step > 0.0 {
            self.options.report_step
        } else {
            self.options.timestep
        }
    }

    /// Advance quality by one `[OPTIONS] TIMESTEP`, returning the new
    /// elapsed time, or `None` once the hydraulics file has no further
    /// record to advance past (`MSXstep`'s `tleft == 0` case).
    pub fn step(&mut self) -> EngineResult<Option<f64>> {
        let state = self.state.as_mut().ok_or(EngineError::NotOpened)?;
        if state.hyd_exhausted && state.next.is_none() && state.qtime > 0.0 {
            return Ok(None);
        }

        state.qtime += self.options.timestep;
        while let Some(candidate) = state.next.take() {
            if candidate.time <= state.qtime {
                state.flows = candidate.flow;
                state.next = state.hyd.next_step()?;
            } else {
                state.next = Some(candidate);
                break;
            }
        }
        if state.next.is_none() {
            state.hyd_exhausted = true;
        }

        let pattern_step = (state.qtime / self.options.timestep).floor().max(0.0) as u64;
        state
            .transport
            .step(&mut self.network, &state.flows, self.options.timestep, &self.merge_tol, pattern_step)?;

        Ok(Some(state.qtime))
    }

    /// Run to completion, writing one binary record per reporting period
    /// (`MSXsaveoutfile`) — a snapshot is emitted only once `Qtime` reaches
    /// `Rtime`, which then advances by the effective report step, matching
    /// the time driver's reporting clock. Returns every period written, so
    /// the caller can immediately hand them to [`crate::report`] without a
    /// second read pass.
    pub fn run(&mut self, out_path: &Path) -> EngineResult<Vec<OutStep>> {
        let header = self.out_header();
        let mut writer = OutWriter::create(out_path, header)?;
        let mut steps = Vec::new();
        let report_step = self.report_step();

        if self.maybe_report(0.0, report_step) {
            self.save_step(&mut writer, 0.0)?;
            steps.push(self.snapshot(0.0));
        }

        while let Some(t) = self.step()? {
            if self.maybe_report(t, report_step) {
                self.save_step(&mut writer, t)?;
                steps.push(self.snapshot(t));
            }
        }
        Ok(steps)
    }

    /// `true` and advances `Rtime` by `report_step` if `qtime` has reached
    /// the next reporting time; otherwise leaves `Rtime` untouched.
    fn maybe_report(&mut self, qtime: f64, report_step: f64) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if qtime + 1e-9 >= state.rtime {
            state.rtime += report_step;
            true
        } else {
            false
        }
    }

    fn out_header(&self) -> OutHeader {
        OutHeader {
            n_nodes: self.network.nodes().len(),
            n_links: self.network.links().len(),
            n_tanks: self.network.tanks().len(),
            n_species: self.network.species().len(),
        }
    }

    fn snapshot(&self, time: f64) -> OutStep {
        let n_species = self.network.species().len();
        let mut node_qual = Vec::with_capacity(self.network.nodes().len() * n_species);
        for node in self.network.nodes() {
            node_qual.extend_from_slice(&node.quality);
        }
        let mut link_qual = Vec::with_capacity(self.network.links().len() * n_species);
        for i in 0..self.network.links().len() {
            let q = self
                .state
                .as_ref()
                .map(|s| s.transport.link_quality(i, n_species))
                .unwrap_or_else(|| vec![0.0; n_species]);
            link_qual.extend(q);
        }
        let tank_volume = self.network.tanks().iter().map(|t| t.volume).collect();
        OutStep {
            time,
            node_qual,
            link_qual,
            tank_volume,
        }
    }

    fn save_step(&self, writer: &mut OutWriter, time: f64) -> EngineResult<()> {
        let snap = self.snapshot(time);
        writer.write_step(time, &snap.node_qual, &snap.link_qual, &snap.tank_volume)?;
        Ok(())
    }

    pub fn node_quality(&self, node: msx_core::NodeId, species: SpeciesId) -> Option<f64> {
        self.network.node(node)?.quality.get(species.index_usize()).copied()
    }

    /// Report configuration carried over from the chemistry file's
    /// `[REPORT]` section.
    pub fn report_config(&self) -> &ReportConfig {
        &self.report_config
    }

    /// Write the text report for a completed run's steps (`MSXreport`).
    pub fn report(&self, steps: &[OutStep], out: &mut impl std::io::Write) -> EngineResult<()> {
        let page_size = if self.report_config.page_size == 0 {
            24
        } else {
            self.report_config.page_size
        };
        msx_results::write_report(out, &self.network, &self.out_header(), steps, page_size)?;
        Ok(())
    }

    /// Re-open a previously saved binary results file for read-back
    /// (used by tooling that wants to report without re-running).
    pub fn open_results(&self, out_path: &Path) -> EngineResult<OutReader> {
        Ok(OutReader::open(out_path, self.out_header())?)
    }

    /// Reset the attached hydraulics state, matching `MSXclose`'s
    /// "project stays open, run state is torn down" behavior.
    pub fn close(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msx_network::MixingModel;
    use tempfile::tempdir;

    const SIMPLE: &str = r#"
[TITLE]
t

[SPECIES]
 BULK CL2 MG 0.01 0.001

[COEFFICIENTS]
 CONSTANT KB 0.5

[TERMS]

[PIPES]
 RATE CL2 -KB*CL2

[TANKS]
 RATE CL2 -KB*CL2

[QUALITY]
 NODE N1 CL2 1.0

[OPTIONS]
 TIMESTEP 60
"#;

    fn topology() -> NetworkBuilder {
        let mut b = NetworkBuilder::new();
        let n1 = b.add_node("N1", true);
        let n2 = b.add_node("N2", true);
        b.add_link("P1", n1, n2, 1.0, 1000.0, 100.0, true);
        b.add_tank(n2, MixingModel::CompleteMix, 100.0, 500.0, 0.0);
        b
    }

    fn write_hyd(path: &std::path::Path) {
        let mut w = msx_hyd::HydWriter::create(path, 2, 1).unwrap();
        for i in 0..5 {
            w.write_step(i as f64 * 60.0, &[0.0, 0.0], &[100.0, 98.0], &[1.0]).unwrap();
        }
    }

    #[test]
    fn steps_until_hydraulics_exhausted() {
        let (mut project, _) = Project::open(SIMPLE, topology()).unwrap();
        let dir = tempdir().unwrap();
        let hyd_path = dir.path().join("h.bin");
        write_hyd(&hyd_path);
        project.use_hyd_file(&hyd_path);
        project.init().unwrap();

        let mut count = 0;
        while project.step().unwrap().is_some() {
            count += 1;
            if count > 20 {
                panic!("step loop did not terminate");
            }
        }
        assert!(count >= 3);
    }

    #[test]
    fn run_writes_and_reports() {
        let (mut project, _) = Project::open(SIMPLE, topology()).unwrap();
        let dir = tempdir().unwrap();
        let hyd_path = dir.path().join("h.bin");
        write_hyd(&hyd_path);
        project.use_hyd_file(&hyd_path);
        project.init().unwrap();

        let out_path = dir.path().join("out.bin");
        let steps = project.run(&out_path).unwrap();
        assert!(!steps.is_empty());

        let mut buf = Vec::new();
        project.report(&steps, &mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("Results Report"));
    }

    const DECAY: &str = r#"
[TITLE]
Tank first-order decay

[SPECIES]
 BULK CL2 MG 0.0001 0.001

[COEFFICIENTS]
 CONSTANT KB 0.1

[TERMS]

[PIPES]
 RATE CL2 0

[TANKS]
 RATE CL2 -KB*CL2

[QUALITY]
 NODE N2 CL2 1.0

[OPTIONS]
 RATE_UNITS HR
 TIMESTEP 300
"#;

    #[test]
    fn tank_first_order_decay_matches_exponential() {
        let (mut project, _) = Project::open(DECAY, topology()).unwrap();
        let dir = tempdir().unwrap();
        let hyd_path = dir.path().join("h.bin");
        let mut w = msx_hyd::HydWriter::create(&hyd_path, 2, 1).unwrap();
        // zero flow: the tank reacts in place, no advective exchange
        for i in 0..200 {
            w.write_step(i as f64 * 300.0, &[0.0, 0.0], &[100.0, 98.0], &[0.0]).unwrap();
        }
        drop(w);
        project.use_hyd_file(&hyd_path);
        project.init().unwrap();

        let mut t = 0.0;
        while let Some(next) = project.step().unwrap() {
            t = next;
            if t >= 10.0 * 3600.0 {
                break;
            }
        }
        assert!((t - 10.0 * 3600.0).abs() < 1.0);

        let n2 = project.network().node_id("N2").unwrap();
        let cl2 = project.network().species_id("CL2").unwrap();
        let c = project.node_quality(n2, cl2).unwrap();
        assert!((c - (-1.0f64).exp()).abs() < 1e-3, "c = {c}");
    }
}
