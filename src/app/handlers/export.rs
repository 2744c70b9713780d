use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{error, info};

use crate::app::monitor_app::MonitorApp;
use crate::pipeline::DataProcessor;
use crate::utils::export_file_name;

const EXPORT_DIR: &str = "exports";

pub struct ExportHandler;

impl ExportHandler {
    /// Writes the processed history to a timestamped CSV under `exports/`.
    pub fn export_history(app: &mut MonitorApp) {
        if app.state.processor.time().is_empty() {
            app.state.hub.export_status = "No processed data to export".to_string();
            return;
        }

        let path = PathBuf::from(EXPORT_DIR).join(export_file_name());
        match write_csv(&path, &app.state.processor) {
            Ok(rows) => {
                info!("Exported {} rows to {}", rows, path.display());
                app.state.hub.export_status =
                    format!("Exported {} rows to {}", rows, path.display());
            }
            Err(e) => {
                error!("CSV export failed: {}", e);
                app.state.hub.export_status = format!("Export failed: {}", e);
            }
        }
    }
}

fn write_csv(path: &Path, processor: &DataProcessor) -> std::io::Result<usize> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(
        out,
        "time_s,acc_x,acc_y,acc_z,vel_x,vel_y,vel_z,disp_x,disp_y,disp_z"
    )?;

    let rows = processor.time().len();
    for i in 0..rows {
        write!(out, "{:.6}", processor.time()[i])?;
        for axis in 0..3 {
            write!(out, ",{:.6}", processor.acceleration(axis)[i])?;
        }
        for axis in 0..3 {
            write!(out, ",{:.6}", processor.velocity(axis)[i])?;
        }
        for axis in 0..3 {
            write!(out, ",{:.6}", processor.displacement(axis)[i])?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(rows)
}
