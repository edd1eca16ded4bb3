//! Run configuration, resolved once from the command line.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::ValueEnum;

use crate::window::YearMonth;

pub const DEFAULT_ARCHIVE_URL: &str =
    "https://www.ncei.noaa.gov/data/sea-surface-temperature-optimum-interpolation/v2.1/access/avhrr";

const CACHE_SUBDIR: &str = "RES_Data/OISST/oisst_mainstays";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
/// Where the run executes. Each maps to a fixed data root.
pub enum Workspace {
    Local,
    Docker,
}

impl Workspace {
    pub fn root(&self) -> Result<PathBuf> {
        match self {
            Workspace::Local => dirs::home_dir()
                .map(|home| home.join("Box"))
                .ok_or_else(|| anyhow!("Could not determine the home directory")),
            Workspace::Docker => Ok(PathBuf::from("/home/jovyan")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub cache_root: PathBuf,
    pub archive_url: String,
    pub verbose: bool,
    pub jobs: usize,
}

impl Config {
    /// Resolves the cache root from an explicit override or the workspace mapping.
    pub fn resolve(
        workspace: Workspace,
        cache_root: Option<PathBuf>,
        archive_url: &str,
        verbose: bool,
    ) -> Result<Self> {
        let cache_root = match cache_root {
            Some(root) => root,
            None => workspace.root()?.join(CACHE_SUBDIR),
        };

        Ok(Config {
            cache_root,
            archive_url: archive_url.trim_end_matches('/').to_string(),
            verbose,
            jobs: 1,
        })
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// `<cache_root>/update_caches/<MM>/`
    pub fn month_cache_dir(&self, month: u32) -> PathBuf {
        self.cache_root
            .join("update_caches")
            .join(format!("{:02}", month))
    }

    pub fn annual_dir(&self) -> PathBuf {
        self.cache_root.join("annual_observations")
    }

    /// `<cache_root>/annual_observations/sst.day.mean.<year>.v2.<ext>`
    pub fn annual_store_path(&self, year: i32, extension: &str) -> PathBuf {
        annual_store_path(&self.annual_dir(), year, extension)
    }

    /// `<archive>/<YYYYMM>/`
    pub fn listing_url(&self, period: YearMonth) -> String {
        format!("{}/{}{:02}/", self.archive_url, period.year(), period.month())
    }
}

pub fn annual_store_path(annual_dir: &Path, year: i32, extension: &str) -> PathBuf {
    annual_dir.join(format!("sst.day.mean.{}.v2.{}", year, extension))
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::resolve(
            Workspace::Docker,
            None,
            "https://example.org/avhrr/",
            false,
        )
        .unwrap()
    }

    #[test]
    fn should_map_docker_workspace() {
        let c = config();
        assert_eq!(
            c.cache_root,
            PathBuf::from("/home/jovyan/RES_Data/OISST/oisst_mainstays")
        );
    }

    #[test]
    fn should_prefer_explicit_cache_root() {
        let c = Config::resolve(
            Workspace::Local,
            Some(PathBuf::from("/tmp/cache")),
            DEFAULT_ARCHIVE_URL,
            true,
        )
        .unwrap();

        assert_eq!(c.cache_root, PathBuf::from("/tmp/cache"));
        assert!(c.verbose);
    }

    #[test]
    fn should_make_paths() {
        let c = config();

        assert_eq!(
            c.month_cache_dir(6),
            PathBuf::from("/home/jovyan/RES_Data/OISST/oisst_mainstays/update_caches/06")
        );
        assert_eq!(
            c.annual_store_path(2023, "nc"),
            PathBuf::from(
                "/home/jovyan/RES_Data/OISST/oisst_mainstays/annual_observations/sst.day.mean.2023.v2.nc"
            )
        );
        assert_eq!(
            c.listing_url(YearMonth::new(2023, 6).unwrap()),
            "https://example.org/avhrr/202306/"
        );
    }

    #[test]
    fn should_clamp_jobs() {
        assert_eq!(config().with_jobs(0).jobs, 1);
        assert_eq!(config().with_jobs(4).jobs, 4);
    }
}
