//! Safetensors input and JSON report output for the `met_report` binary.
//!
//! Reader: a `.safetensors` file holding three `[N, 2]` tensors named
//! `truth`, `ml` and `puppi` (F32 or F64), e.g. written by the inference
//! script with `safetensors.numpy.save_file`.
use ndarray::Array2;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

// ── Low-level safetensors parser (raw bytes → ndarray, nothing more) ─────────

type Header = HashMap<String, serde_json::Value>;

fn parse_header(bytes: &[u8]) -> Result<(Header, usize)> {
    if bytes.len() < 8 {
        return Err(Error::Format("safetensors file too small".into()));
    }
    let mut len = [0u8; 8];
    len.copy_from_slice(&bytes[..8]);
    let n = u64::from_le_bytes(len) as usize;
    let end = 8usize
        .checked_add(n)
        .filter(|&e| e <= bytes.len())
        .ok_or_else(|| Error::Format(format!("header length {n} exceeds file size")))?;
    let header: Header = serde_json::from_slice(&bytes[8..end])?;
    Ok((header, end))
}

fn shape_of(name: &str, entry: &serde_json::Value) -> Result<Vec<usize>> {
    entry["shape"]
        .as_array()
        .ok_or_else(|| Error::Format(format!("'{name}': missing shape")))?
        .iter()
        .map(|v| {
            v.as_u64()
                .map(|d| d as usize)
                .ok_or_else(|| Error::Format(format!("'{name}': bad shape entry {v}")))
        })
        .collect()
}

fn byte_range(name: &str, entry: &serde_json::Value) -> Result<(usize, usize)> {
    let offsets = entry["data_offsets"]
        .as_array()
        .filter(|o| o.len() == 2)
        .ok_or_else(|| Error::Format(format!("'{name}': missing data_offsets")))?;
    let get = |i: usize| {
        offsets[i]
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| Error::Format(format!("'{name}': bad data_offsets")))
    };
    Ok((get(0)?, get(1)?))
}

/// Read tensor `name` as f64, whatever its float dtype on disk.
fn read_tensor_f64(bytes: &[u8], header: &Header, data_start: usize, name: &str) -> Result<Array2<f64>> {
    let entry = header
        .get(name)
        .ok_or_else(|| Error::Format(format!("missing '{name}' tensor")))?;
    let shape = shape_of(name, entry)?;
    if shape.len() != 2 {
        return Err(Error::Format(format!("'{name}': expected 2-D tensor, got shape {shape:?}")));
    }
    let (s, e) = byte_range(name, entry)?;
    let raw = data_start
        .checked_add(s)
        .zip(data_start.checked_add(e))
        .and_then(|(a, b)| bytes.get(a..b))
        .ok_or_else(|| Error::Format(format!("'{name}': data_offsets out of bounds")))?;

    let vals: Vec<f64> = match entry["dtype"].as_str() {
        Some("F32") => raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
            .collect(),
        Some("F64") => raw
            .chunks_exact(8)
            .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
            .collect(),
        other => {
            return Err(Error::Format(format!("'{name}': unsupported dtype {other:?}")));
        }
    };
    Ok(Array2::from_shape_vec((shape[0], shape[1]), vals)?)
}

// ── Public structs ────────────────────────────────────────────────────────────

/// The three aligned MET vector series of one evaluation sample.
#[derive(Debug, Clone)]
pub struct MetVectors {
    /// `[N, 2]` generator-level MET (x, y).
    pub truth: Array2<f64>,
    /// `[N, 2]` model prediction.
    pub ml: Array2<f64>,
    /// `[N, 2]` PUPPI MET.
    pub puppi: Array2<f64>,
}

impl MetVectors {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let (header, data_start) = parse_header(&bytes)?;
        Ok(Self {
            truth: read_tensor_f64(&bytes, &header, data_start, "truth")?,
            ml: read_tensor_f64(&bytes, &header, data_start, "ml")?,
            puppi: read_tensor_f64(&bytes, &header, data_start, "puppi")?,
        })
    }
}

// ── Report writer ─────────────────────────────────────────────────────────────

/// Write any report type as pretty-printed JSON.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let f = std::io::BufWriter::new(std::fs::File::create(path)?);
    serde_json::to_writer_pretty(f, value)?;
    Ok(())
}
