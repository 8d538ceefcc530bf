//! Prepares an OSRM dataset for a small Geofabrik extract.
//!
//! Downloads the `.osm.pbf` once and runs the OSRM MLD pipeline through
//! Docker, leaving the files under `OSRM_DATA_DIR` (default `osrm-data`).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Geofabrik path of the extract; Monaco keeps preprocessing to seconds.
pub const REGION: &str = "europe/monaco";

pub struct PreparedDataset {
    pub data_dir: PathBuf,
    /// File name of the `.osrm` base inside `data_dir`.
    pub osrm_file: String,
}

pub fn prepare() -> Result<PreparedDataset, String> {
    let region_name = REGION.rsplit('/').next().unwrap_or("region");
    let data_root = env::var("OSRM_DATA_DIR").unwrap_or_else(|_| "osrm-data".to_string());
    let data_dir = env::current_dir()
        .map_err(|err| err.to_string())?
        .join(data_root)
        .join(region_name);
    fs::create_dir_all(&data_dir).map_err(|err| err.to_string())?;

    let pbf_file = format!("{}-latest.osm.pbf", region_name);
    let osrm_file = format!("{}-latest.osrm", region_name);

    let pbf_path = data_dir.join(&pbf_file);
    if !pbf_path.exists() {
        let url = format!("https://download.geofabrik.de/{}-latest.osm.pbf", REGION);
        let bytes = reqwest::blocking::get(&url)
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(|err| format!("download {} failed: {}", url, err))?;
        fs::write(&pbf_path, &bytes).map_err(|err| err.to_string())?;
    }

    let osrm_data = format!("/data/{}", osrm_file);
    if !data_dir.join(&osrm_file).exists() {
        docker(&data_dir, &["osrm-extract", "-p", "/opt/car.lua", &format!("/data/{}", pbf_file)])?;
    }
    if !data_dir.join(format!("{}.partition", osrm_file)).exists() {
        docker(&data_dir, &["osrm-partition", &osrm_data])?;
        docker(&data_dir, &["osrm-customize", &osrm_data])?;
    }

    Ok(PreparedDataset { data_dir, osrm_file })
}

fn docker(data_dir: &Path, args: &[&str]) -> Result<(), String> {
    let status = Command::new("docker")
        .args(["run", "--rm", "-v"])
        .arg(format!("{}:/data", data_dir.display()))
        .arg("osrm/osrm-backend")
        .args(args)
        .status()
        .map_err(|err| format!("docker not runnable: {}", err))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("{} exited with {}", args[0], status))
    }
}
