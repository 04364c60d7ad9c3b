//! Sequential reader over a precomputed hydraulics file (spec §6
//! "Hydraulics file"): one record per hydraulic time step, each carrying
//! every link's flow and every node's demand and head.
//!
//! This crate does not produce the file — the hydraulic-solver front end
//! that does is an external collaborator (spec §1 "Out of scope"). The
//! reader positions itself once at `HydOffset` past the header and is
//! never rewound, matching `original_source/src/msxtypes.h`'s
//! `HydFile`/`HydOffset` fields.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{HydError, HydResult};

/// Magic bytes identifying a hydraulics results file this reader
/// understands. Arbitrary but stable; a mismatched header is the fixture's
/// problem, not this reader's.
pub(crate) const MAGIC: u32 = 0x4853_5158; // "HSQX"

/// One hydraulic time step's worth of state: per-node demand and head,
/// per-link flow. Units are whatever the upstream hydraulic solution used
/// (cubic feet/sec for flow, feet for head, matching `msx-network`'s
/// link geometry units).
#[derive(Debug, Clone, PartialEq)]
pub struct HydStep {
    pub time: f64,
    pub demand: Vec<f64>,
    pub head: Vec<f64>,
    pub flow: Vec<f64>,
}

/// Sequential reader over the binary hydraulics file.
///
/// `open` validates the header's node/link counts against the network
/// being simulated and leaves the cursor at the first record (`HydOffset`).
/// Each `next_step` call consumes exactly one record; there is no seek or
/// rewind API, matching spec §6 ("the reader advances sequentially; the
/// file is positioned once ... and never rewound").
pub struct HydReader {
    reader: BufReader<File>,
    n_nodes: usize,
    n_links: usize,
    exhausted: bool,
}

impl HydReader {
    pub fn open(path: &Path, n_nodes: usize, n_links: usize) -> HydResult<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let magic = read_u32(&mut reader)?;
        if magic != MAGIC {
            return Err(HydError::BadHeader);
        }
        let header_nodes = read_u32(&mut reader)? as usize;
        let header_links = read_u32(&mut reader)? as usize;
        if header_nodes != n_nodes || header_links != n_links {
            return Err(HydError::BadHeader);
        }

        Ok(Self {
            reader,
            n_nodes,
            n_links,
            exhausted: false,
        })
    }

    /// Read the next hydraulic step, or `None` once the file is exhausted.
    pub fn next_step(&mut self) -> HydResult<Option<HydStep>> {
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
        let demand = read_f32_vec(&mut self.reader, self.n_nodes)?;
        let head = read_f32_vec(&mut self.reader, self.n_nodes)?;
        let flow = read_f32_vec(&mut self.reader, self.n_links)?;
        Ok(Some(HydStep {
            time,
            demand,
            head,
            flow,
        }))
    }
}

fn read_u32(r: &mut impl Read) -> HydResult<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Reads an 8-byte timestamp, returning `None` on a clean EOF (no bytes
/// read at all) and `Err` on a partial read (a truncated record).
fn read_f64_opt(r: &mut impl Read) -> HydResult<Option<f64>> {
    let mut buf = [0u8; 8];
    let mut read = 0;
    loop {
        match r.read(&mut buf[read..]) {
            Ok(0) => {
                if read == 0 {
                    return Ok(None);
                }
                return Err(HydError::TruncatedRecord);
            }
            Ok(n) => {
                read += n;
                if read == buf.len() {
                    return Ok(Some(f64::from_le_bytes(buf)));
                }
            }
            Err(e) => return Err(HydError::Io(e)),
        }
    }
}

fn read_f32_vec(r: &mut impl Read, count: usize) -> HydResult<Vec<f64>> {
    let mut out = Vec::with_capacity(count);
    let mut buf = [0u8; 4];
    for _ in 0..count {
        r.read_exact(&mut buf).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                HydError::TruncatedRecord
            } else {
                HydError::Io(e)
            }
        })?;
        out.push(f32::from_le_bytes(buf) as f64);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::HydWriter;
    use tempfile::tempdir;

    #[test]
    fn round_trips_one_step() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hyd.bin");
        {
            let mut w = HydWriter::create(&path, 2, 1).unwrap();
            w.write_step(0.0, &[1.0, 2.0], &[100.0, 98.0], &[1.5]).unwrap();
            w.write_step(3600.0, &[1.1, 2.1], &[99.0, 97.0], &[1.6]).unwrap();
        }

        let mut r = HydReader::open(&path, 2, 1).unwrap();
        let s0 = r.next_step().unwrap().unwrap();
        assert_eq!(s0.time, 0.0);
        assert_eq!(s0.demand, vec![1.0, 2.0]);
        assert_eq!(s0.flow, vec![1.5]);

        let s1 = r.next_step().unwrap().unwrap();
        assert_eq!(s1.time, 3600.0);

        assert!(r.next_step().unwrap().is_none());
    }

    #[test]
    fn rejects_mismatched_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hyd.bin");
        HydWriter::create(&path, 2, 1).unwrap();
        let err = HydReader::open(&path, 3, 1).unwrap_err();
        assert!(matches!(err, HydError::BadHeader));
    }
}
