//! Binary results file: one record per reporting time step, each carrying
//! every node's and link's per-species quality and every tank's volume.
//!
//! Grounded on `original_source/src/msxout.c`'s exported surface
//! (`MSXout_open`/`saveResults`/`getNodeQual(k, j, m)`/`getLinkQual(k, j,
//! m)`, `k` the step, `j` the object, `m` the species) but with a plain
//! flat-float-array file in place of the legacy build's embedded SQLite
//! database (spec §6 describes the output file as a fixed binary
//! float-array layout, not a relational store). Follows the same
//! open/header/sequential-step shape as `msx_hyd::{HydReader, HydWriter}`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{ResultsError, ResultsResult};

const MAGIC: u32 = 0x4d53_584f; // "MSXO"

#[derive(Debug, Clone, Copy)]
pub struct OutHeader {
    pub n_nodes: usize,
    pub n_links: usize,
    pub n_tanks: usize,
    pub n_species: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutStep {
    pub time: f64,
    /// Row-major `[node][species]`, flattened.
    pub node_qual: Vec<f64>,
    /// Row-major `[link][species]`, flattened.
    pub link_qual: Vec<f64>,
    pub tank_volume: Vec<f64>,
}

impl OutStep {
    pub fn node_qual(&self, header: &OutHeader, node: usize, species: usize) -> f64 {
        self.node_qual[node * header.n_species + species]
    }

    pub fn link_qual(&self, header: &OutHeader, link: usize, species: usize) -> f64 {
        self.link_qual[link * header.n_species + species]
    }
}

pub struct OutWriter {
    writer: BufWriter<File>,
    header: OutHeader,
}

impl OutWriter {
    pub fn create(path: &Path, header: OutHeader) -> ResultsResult<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&MAGIC.to_le_bytes())?;
        writer.write_all(&(header.n_nodes as u32).to_le_bytes())?;
        writer.write_all(&(header.n_links as u32).to_le_bytes())?;
        writer.write_all(&(header.n_tanks as u32).to_le_bytes())?;
        writer.write_all(&(header.n_species as u32).to_le_bytes())?;
        Ok(Self { writer, header })
    }

    pub fn write_step(
        &mut self,
        time: f64,
        node_qual: &[f64],
        link_qual: &[f64],
        tank_volume: &[f64],
    ) -> ResultsResult<()> {
        debug_assert_eq!(node_qual.len(), self.header.n_nodes * self.header.n_species);
        debug_assert_eq!(link_qual.len(), self.header.n_links * self.header.n_species);
        debug_assert_eq!(tank_volume.len(), self.header.n_tanks);
        self.writer.write_all(&time.to_le_bytes())?;
        write_f32s(&mut self.writer, node_qual)?;
        write_f32s(&mut self.writer, link_qual)?;
        write_f32s(&mut self.writer, tank_volume)?;
        Ok(())
    }
}

fn write_f32s(w: &mut impl Write, values: &[f64]) -> std::io::Result<()> {
    for &v in values {
        w.write_all(&(v as f32).to_le_bytes())?;
    }
    Ok(())
}

/// Sequential reader, mirroring `msx_hyd::HydReader`: opened once against an
/// expected header shape, advanced one step at a time, never rewound.
pub struct OutReader {
    reader: BufReader<File>,
    header: OutHeader,
    exhausted: bool,
}

impl OutReader {
    pub fn open(path: &Path, expect: OutHeader) -> ResultsResult<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let magic = read_u32(&mut reader)?;
        if magic != MAGIC {
            return Err(ResultsError::BadHeader);
        }
        let header = OutHeader {
            n_nodes: read_u32(&mut reader)? as usize,
            n_links: read_u32(&mut reader)? as usize,
            n_tanks: read_u32(&mut reader)? as usize,
            n_species: read_u32(&mut reader)? as usize,
        };
        if header.n_nodes != expect.n_nodes
            || header.n_links != expect.n_links
            || header.n_tanks != expect.n_tanks
            || header.n_species != expect.n_species
        {
            return Err(ResultsError::BadHeader);
        }
        Ok(Self {
            reader,
            header,
            exhausted: false,
        })
    }

    pub fn header(&self) -> OutHeader {
        self.header
    }

    pub fn next_step(&mut self) -> ResultsResult<Option<OutStep>> {
        if self.exhausted {
            return Ok(None);
        }
        let time = match read_f64_opt(&mut self.reader)? {
            Some(t) => t,
            None => {
                self.exhausted = true;
                return Ok(None);
            }
        };
        let node_qual = read_f32_vec(&mut self.reader, self.header.n_nodes * self.header.n_species)?;
        let link_qual = read_f32_vec(&mut self.reader, self.header.n_links * self.header.n_species)?;
        let tank_volume = read_f32_vec(&mut self.reader, self.header.n_tanks)?;
        Ok(Some(OutStep {
            time,
            node_qual,
            link_qual,
            tank_volume,
        }))
    }
}

fn read_u32(r: &mut impl Read) -> ResultsResult<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f64_opt(r: &mut impl Read) -> ResultsResult<Option<f64>> {
    let mut buf = [0u8; 8];
    let mut read = 0;
    loop {
        match r.read(&mut buf[read..]) {
            Ok(0) => {
                if read == 0 {
                    return Ok(None);
                }
                return Err(ResultsError::TruncatedRecord);
            }
            Ok(n) => {
                read += n;
                if read == buf.len() {
                    return Ok(Some(f64::from_le_bytes(buf)));
                }
            }
            Err(e) => return Err(ResultsError::Io(e)),
        }
    }
}

fn read_f32_vec(r: &mut impl Read, count: usize) -> ResultsResult<Vec<f64>> {
    let mut out = Vec::with_capacity(count);
    let mut buf = [0u8; 4];
    for _ in 0..count {
        r.read_exact(&mut buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ResultsError::TruncatedRecord
            } else {
                ResultsError::Io(e)
            }
        })?;
        out.push(f32::from_le_bytes(buf) as f64);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn header() -> OutHeader {
        OutHeader {
            n_nodes: 2,
            n_links: 1,
            n_tanks: 1,
            n_species: 1,
        }
    }

    #[test]
    fn round_trips_steps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");
        {
            let mut w = OutWriter::create(&path, header()).unwrap();
            w.write_step(0.0, &[1.0, 2.0], &[1.5], &[100.0]).unwrap();
            w.write_step(300.0, &[1.1, 2.1], &[1.6], &[99.0]).unwrap();
        }

        let mut r = OutReader::open(&path, header()).unwrap();
        let s0 = r.next_step().unwrap().unwrap();
        assert_eq!(s0.time, 0.0);
        assert_eq!(s0.node_qual(&header(), 1, 0), 2.0);

        let s1 = r.next_step().unwrap().unwrap();
        assert_eq!(s1.time, 300.0);
        assert!(r.next_step().unwrap().is_none());
    }

    #[test]
    fn rejects_mismatched_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.bin");
        OutWriter::create(&path, header()).unwrap();
        let mut bad = header();
        bad.n_species = 3;
        let err = OutReader::open(&path, bad).unwrap_err();
        assert!(matches!(err, ResultsError::BadHeader));
    }
}
