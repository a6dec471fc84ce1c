//! Local OSRM dataset preparation: fetch a Geofabrik extract and run the
//! MLD pipeline in the `osrm/osrm-backend` image.
//!
//! Used to stand up a routing server for the live routing tests. Every
//! step is skipped when its output already exists, so a prepared data
//! directory is reused across runs.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::info;

/// Docker image providing the OSRM tools and server.
pub const OSRM_IMAGE: &str = "osrm/osrm-backend";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("extract download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("`{step}` exited with {status}")]
    Step { step: String, status: std::process::ExitStatus },
}

/// A Geofabrik extract, e.g. `north-america/us/tennessee`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub path: String,
}

impl Region {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Last path component, used for file and directory names.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn download_url(&self) -> String {
        format!("https://download.geofabrik.de/{}-latest.osm.pbf", self.path)
    }

    fn pbf_file(&self) -> String {
        format!("{}-latest.osm.pbf", self.name())
    }

    fn osrm_file(&self) -> String {
        format!("{}-latest.osrm", self.name())
    }
}

/// A prepared dataset on disk.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Directory to mount at `/data` in the OSRM container.
    pub data_dir: PathBuf,
    /// Base `.osrm` file the server is started with.
    pub osrm_base: PathBuf,
}

impl Dataset {
    /// Download and preprocess `region` under `data_root/<region name>`.
    pub fn ensure(region: &Region, data_root: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let data_root = data_root.as_ref();
        let data_root = if data_root.is_absolute() {
            data_root.to_path_buf()
        } else {
            std::env::current_dir()?.join(data_root)
        };
        let data_dir = data_root.join(region.name());
        fs::create_dir_all(&data_dir)?;

        let pbf_path = data_dir.join(region.pbf_file());
        if !pbf_path.exists() {
            info!(region = %region.path, "downloading OSM extract");
            download(&region.download_url(), &pbf_path)?;
        }

        let osrm_base = data_dir.join(region.osrm_file());
        if !osrm_base.exists() {
            let input = format!("/data/{}", region.pbf_file());
            run_tool(&data_dir, &["osrm-extract", "-p", "/opt/car.lua", &input])?;
        }

        let dataset = Self { data_dir, osrm_base };
        if !dataset.is_partitioned() {
            let base = dataset.container_base();
            run_tool(&dataset.data_dir, &["osrm-partition", &base])?;
            run_tool(&dataset.data_dir, &["osrm-customize", &base])?;
        }
        Ok(dataset)
    }

    /// Path of the base `.osrm` file inside the container.
    pub fn container_base(&self) -> String {
        let name = self
            .osrm_base
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        format!("/data/{name}")
    }

    /// The MLD partition file; its mtime identifies a dataset build.
    pub fn partition_file(&self) -> PathBuf {
        self.osrm_base.with_extension("osrm.partition")
    }

    fn is_partitioned(&self) -> bool {
        ["osrm.partition", "osrm.mldgr", "osrm.cells"]
            .iter()
            .all(|ext| self.osrm_base.with_extension(ext).exists())
    }
}

fn download(url: &str, dest: &Path) -> Result<(), DatasetError> {
    let bytes = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
    let partial = dest.with_extension("part");
    let mut writer = BufWriter::new(File::create(&partial)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    fs::rename(partial, dest)?;
    Ok(())
}

fn run_tool(data_dir: &Path, args: &[&str]) -> Result<(), DatasetError> {
    info!(step = args.first().copied().unwrap_or_default(), "running OSRM preprocessing");
    let status = Command::new("docker")
        .args(["run", "--rm", "-t", "-v"])
        .arg(format!("{}:/data", data_dir.display()))
        .arg(OSRM_IMAGE)
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(DatasetError::Step {
            step: args.join(" "),
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_names() {
        let region = Region::new("north-america/us/tennessee");
        assert_eq!(region.name(), "tennessee");
        assert_eq!(
            region.download_url(),
            "https://download.geofabrik.de/north-america/us/tennessee-latest.osm.pbf"
        );
        assert_eq!(region.osrm_file(), "tennessee-latest.osrm");
        assert_eq!(Region::new("monaco").name(), "monaco");
    }

    #[test]
    fn test_container_paths() {
        let dataset = Dataset {
            data_dir: PathBuf::from("/tmp/osrm/tennessee"),
            osrm_base: PathBuf::from("/tmp/osrm/tennessee/tennessee-latest.osrm"),
        };
        assert_eq!(dataset.container_base(), "/data/tennessee-latest.osrm");
        assert_eq!(
            dataset.partition_file(),
            PathBuf::from("/tmp/osrm/tennessee/tennessee-latest.osrm.partition")
        );
        assert!(!dataset.is_partitioned());
    }
}
