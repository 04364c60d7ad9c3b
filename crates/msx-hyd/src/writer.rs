//! Test-fixture writer for the hydraulics file format [`crate::reader`]
//! consumes.
//!
//! The real hydraulic-solver front end that produces this file is out of
//! this crate's scope (spec §1); this writer exists only so that unit and
//! integration tests can synthesize a hydraulics file without depending on
//! an external EPANET run.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::HydResult;
use crate::reader::MAGIC;

pub struct HydWriter {
    writer: BufWriter<File>,
}

impl HydWriter {
    pub fn create(path: &Path, n_nodes: usize, n_links: usize) -> HydResult<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&MAGIC.to_le_bytes())?;
        writer.write_all(&(n_nodes as u32).to_le_bytes())?;
        writer.write_all(&(n_links as u32).to_le_bytes())?;
        Ok(Self { writer })
    }

    pub fn write_step(&mut self, time: f64, demand: &[f64], head: &[f64], flow: &[f64]) -> HydResult<()> {
        self.writer.write_all(&time.to_le_bytes())?;
        for &d in demand {
            self.writer.write_all(&(d as f32).to_le_bytes())?;
        }
        for &h in head {
            self.writer.write_all(&(h as f32).to_le_bytes())?;
        }
        for &q in flow {
            self.writer.write_all(&(q as f32).to_le_bytes())?;
        }
        Ok(())
    }
}
