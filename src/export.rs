//! CSV export of detection events.

use crate::core::ledger::DetectionEvent;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Column header of the detection table.
pub const CSV_HEADER: &str = "Detector,Type,Mass,Charge,Energy,PosX,PosY,PosZ,VelX,VelY,VelZ";

/// Reject labels that would break the unquoted column layout.
pub(crate) fn check_csv_label(kind: &str, label: &str) -> Result<()> {
    if label.is_empty() {
        return Err(Error::InvalidParam(format!("{kind} must not be empty")));
    }
    if label.contains([',', '"', '\n', '\r']) {
        return Err(Error::InvalidParam(format!(
            "{kind} {label:?} must not contain commas, quotes or line breaks"
        )));
    }
    Ok(())
}

/// Write one header line and one row per event, in ledger order.
pub fn write_detections_csv<W: Write>(mut out: W, events: &[DetectionEvent]) -> Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for e in events {
        let p = &e.snapshot;
        let s = p.species();
        let r = p.position();
        let v = p.velocity();
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{}",
            e.detector_id,
            s.name,
            s.mass,
            s.charge,
            p.energy(),
            r.x,
            r.y,
            r.z,
            v.x,
            v.y,
            v.z
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write the detection table into it.
pub fn export_detections_csv(path: impl AsRef<Path>, events: &[DetectionEvent]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_detections_csv(BufWriter::new(file), events)
}
