//! Project configuration.
//!
//! A project is described by one INI file:
//!
//! ```ini
//! [project]
//! name = mexico_city
//! work_dir = /data/insar
//!
//! [download]
//! platform = SENTINEL-1
//! start_date = 20240101
//! end_date = 20240301
//! aoi = POLYGON((-99.2 19.25, -99.1 19.25, -99.1 19.35, -99.2 19.35, -99.2 19.25))
//!
//! [dem]
//! data_source = COP
//!
//! [earthdata]
//! token = ...
//! ```
//!
//! Optional keys fall back to the defaults below. Relative directories
//! resolve under `<work_dir>/<name>`. The `EARTHDATA_TOKEN` environment
//! variable overrides the file token.

mod error;

pub use error::{ConfigError, ConfigResult};

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use ini::{Ini, Properties};

use crate::catalog::{AcquisitionRequest, Platform, ProductKind};
use crate::dem::DataSource;
use crate::geometry::{BufferDegrees, DEFAULT_BUFFER_DEGREES};
use crate::transfer::DEFAULT_POLL_INTERVAL;

/// Environment variable that overrides `[earthdata] token`.
pub const TOKEN_ENV: &str = "EARTHDATA_TOKEN";

/// Date format of `start_date` and `end_date`.
pub const DATE_FORMAT: &str = "%Y%m%d";

pub const DEFAULT_MAX_RESULTS: i64 = 1000;
pub const DEFAULT_PARALLEL_DOWNLOADS: i64 = 8;
pub const DEFAULT_SLC_DIR: &str = "SLC";
pub const DEFAULT_DEM_DIR: &str = "DEM";

/// `[download]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    pub platform: Platform,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub max_results: i64,
    /// Area of interest as a WKT polygon.
    pub aoi: String,
    pub parallel_downloads: i64,
    /// Download single bursts instead of whole scenes.
    pub burst_download: bool,
    pub slc_dir: PathBuf,
    pub poll_interval: Duration,
}

impl DownloadSettings {
    /// Product kind selected by `burst_download`.
    pub fn product_kind(&self) -> ProductKind {
        if self.burst_download {
            ProductKind::Subswath
        } else {
            ProductKind::Standard
        }
    }
}

/// `[dem]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DemSettings {
    pub data_source: DataSource,
    pub dem_dir: PathBuf,
    pub buffer: BufferDegrees,
}

/// A loaded project configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    pub name: String,
    pub work_dir: PathBuf,
    pub download: DownloadSettings,
    pub dem: DemSettings,
    pub earthdata_token: Option<String>,
}

impl ProjectConfig {
    /// Load a project file, applying the token environment override.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Read {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(e) => ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;

        let config = Self::from_ini(&ini)?;
        Ok(config.with_token_override(env::var(TOKEN_ENV).ok()))
    }

    /// Parse a project from INI text. No environment override is applied.
    pub fn from_ini_str(content: &str) -> ConfigResult<Self> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<string>"),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> ConfigResult<Self> {
        let project = Section::new(ini, "project");
        let download = Section::new(ini, "download");
        let dem = Section::new(ini, "dem");
        let earthdata = Section::new(ini, "earthdata");

        let download = DownloadSettings {
            platform: download.parse_required("platform")?,
            start_date: download.date("start_date")?,
            end_date: download.date("end_date")?,
            max_results: download.parse_or("max_results", DEFAULT_MAX_RESULTS)?,
            aoi: download.required("aoi")?.to_string(),
            parallel_downloads: download
                .parse_or("parallel_downloads", DEFAULT_PARALLEL_DOWNLOADS)?,
            burst_download: download.bool_or("burst_download", false)?,
            slc_dir: PathBuf::from(download.get("slc_dir").unwrap_or(DEFAULT_SLC_DIR)),
            poll_interval: download.millis_or("poll_interval_ms", DEFAULT_POLL_INTERVAL)?,
        };

        let dem = DemSettings {
            data_source: dem.parse_or("data_source", DataSource::default())?,
            dem_dir: PathBuf::from(dem.get("dem_dir").unwrap_or(DEFAULT_DEM_DIR)),
            buffer: BufferDegrees::new(
                dem.parse_or("buffer_lat", DEFAULT_BUFFER_DEGREES)?,
                dem.parse_or("buffer_lon", DEFAULT_BUFFER_DEGREES)?,
            ),
        };

        Ok(Self {
            name: project.required("name")?.to_string(),
            work_dir: PathBuf::from(project.required("work_dir")?),
            download,
            dem,
            earthdata_token: earthdata.get("token").map(str::to_string),
        })
    }

    /// Replace the file token with `token` when it is set and non-empty.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.earthdata_token = Some(token.trim().to_string());
        }
        self
    }

    /// `<work_dir>/<name>`.
    pub fn project_dir(&self) -> PathBuf {
        self.work_dir.join(&self.name)
    }

    /// Resolved product download directory.
    pub fn slc_dir(&self) -> PathBuf {
        self.project_dir().join(&self.download.slc_dir)
    }

    /// Resolved elevation output directory.
    pub fn dem_dir(&self) -> PathBuf {
        self.project_dir().join(&self.dem.dem_dir)
    }

    /// Acquisition request described by the `[download]` section.
    pub fn acquisition_request(&self) -> AcquisitionRequest {
        AcquisitionRequest {
            platform: self.download.platform,
            product_kind: self.download.product_kind(),
            aoi_wkt: self.download.aoi.clone(),
            start_date: self.download.start_date,
            end_date: self.download.end_date,
            max_results: self.download.max_results,
            parallelism: self.download.parallel_downloads,
        }
    }
}

/// Typed access to one INI section.
struct Section<'a> {
    name: &'static str,
    props: Option<&'a Properties>,
}

impl<'a> Section<'a> {
    fn new(ini: &'a Ini, name: &'static str) -> Self {
        Self {
            name,
            props: ini.section(Some(name)),
        }
    }

    /// Value with any trailing `;` or `#` comment removed; empty is absent.
    fn get(&self, key: &str) -> Option<&'a str> {
        let raw = self.props?.get(key)?;
        let value = raw
            .find([';', '#'])
            .map_or(raw, |idx| &raw[..idx])
            .trim();
        (!value.is_empty()).then_some(value)
    }

    fn required(&self, key: &str) -> ConfigResult<&'a str> {
        self.get(key).ok_or_else(|| ConfigError::Missing {
            section: self.name,
            key: key.to_string(),
        })
    }

    fn invalid(&self, key: &str, value: &str, reason: impl ToString) -> ConfigError {
        ConfigError::Invalid {
            section: self.name,
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_optional<T>(&self, key: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: ToString,
    {
        self.get(key)
            .map(|value| value.parse().map_err(|e| self.invalid(key, value, e)))
            .transpose()
    }

    fn parse_required<T>(&self, key: &str) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: ToString,
    {
        let value = self.required(key)?;
        value.parse().map_err(|e| self.invalid(key, value, e))
    }

    fn parse_or<T>(&self, key: &str, default: T) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: ToString,
    {
        Ok(self.parse_optional(key)?.unwrap_or(default))
    }

    fn date(&self, key: &str) -> ConfigResult<NaiveDate> {
        let value = self.required(key)?;
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map_err(|e| self.invalid(key, value, format!("expected YYYYMMDD ({})", e)))
    }

    /// A strictly positive millisecond duration.
    fn millis_or(&self, key: &str, default: Duration) -> ConfigResult<Duration> {
        match self.parse_optional::<u64>(key)? {
            None => Ok(default),
            Some(0) => Err(self.invalid(key, "0", "must be greater than zero")),
            Some(ms) => Ok(Duration::from_millis(ms)),
        }
    }

    fn bool_or(&self, key: &str, default: bool) -> ConfigResult<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(self.invalid(key, value, "expected true or false")),
            },
        }
    }
}
