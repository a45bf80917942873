//! Recorded sensor logs for offline replay.
//!
//! A log is `{"readings": [...]}` where each reading is a tagged
//! [`SensorReading`]. Files ending in `.gz` are gzip-compressed.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TiltError};
use crate::types::SensorReading;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub readings: Vec<SensorReading>,
}

fn is_gzip(path: &Path) -> bool {
    path.extension().map(|e| e == "gz").unwrap_or(false)
}

pub fn load_recording(path: &Path) -> Result<Recording> {
    let file = File::open(path)
        .map_err(|e| TiltError::Recording(format!("cannot open {}: {e}", path.display())))?;
    let reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    serde_json::from_reader(reader)
        .map_err(|e| TiltError::Recording(format!("cannot parse {}: {e}", path.display())))
}

pub fn save_recording(path: &Path, recording: &Recording) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| TiltError::Recording(format!("cannot create {}: {e}", path.display())))?;
    let write_err =
        |e: std::io::Error| TiltError::Recording(format!("cannot write {}: {e}", path.display()));

    if is_gzip(path) {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut encoder, recording)
            .map_err(|e| TiltError::Recording(e.to_string()))?;
        encoder.finish().and_then(|mut w| w.flush()).map_err(write_err)?;
    } else {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, recording)
            .map_err(|e| TiltError::Recording(e.to_string()))?;
        writer.flush().map_err(write_err)?;
    }
    Ok(())
}
