use std::path::PathBuf;

use thiserror::Error;

pub const BACKEND_VAR: &str = "PORTAL_CAVE_BACKEND";
pub const CPU_SCALE_VAR: &str = "PORTAL_CAVE_CPU_SCALE";
pub const SNAPSHOT_VAR: &str = "PORTAL_CAVE_SNAPSHOT";
pub const SNAPSHOT_SIZE_VAR: &str = "PORTAL_CAVE_SNAPSHOT_SIZE";
pub const SNAPSHOT_TIME_VAR: &str = "PORTAL_CAVE_SNAPSHOT_TIME";

/// Whether `build.rs` compiled the shader crate to SPIR-V.
pub const SPIRV_AVAILABLE: bool = cfg!(any(
    feature = "use-installed-tools",
    feature = "use-compiled-tools"
));

const DEFAULT_CPU_SCALE: f32 = 0.5;
const DEFAULT_SNAPSHOT_SIZE: (u32, u32) = (800, 600);

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("PORTAL_CAVE_BACKEND must be `gpu` or `cpu`, got `{0}`")]
    InvalidBackend(String),
    #[error("the gpu backend needs the SPIR-V shader; rebuild with `--features use-compiled-tools`")]
    GpuUnavailable,
    #[error("PORTAL_CAVE_CPU_SCALE must be a number in (0, 1], got `{0}`")]
    InvalidScale(String),
    #[error("PORTAL_CAVE_SNAPSHOT_SIZE must look like `800x600`, got `{0}`")]
    InvalidSize(String),
    #[error("PORTAL_CAVE_SNAPSHOT_TIME must be a non-negative number of seconds, got `{0}`")]
    InvalidTime(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Gpu,
    Cpu,
}

impl Backend {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("gpu") {
            Ok(Self::Gpu)
        } else if value.eq_ignore_ascii_case("cpu") {
            Ok(Self::Cpu)
        } else {
            Err(ConfigError::InvalidBackend(value.to_owned()))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gpu => "GPU",
            Self::Cpu => "CPU",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub time: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub backend: Backend,
    /// Fraction of the window resolution the CPU backend renders at.
    pub cpu_scale: f32,
    /// Render a single frame to this file instead of opening a window.
    pub snapshot: Option<Snapshot>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = match lookup(BACKEND_VAR) {
            Some(raw) => Backend::parse(&raw)?,
            None if SPIRV_AVAILABLE => Backend::Gpu,
            None => Backend::Cpu,
        };
        if backend == Backend::Gpu && !SPIRV_AVAILABLE {
            return Err(ConfigError::GpuUnavailable);
        }

        let cpu_scale = match lookup(CPU_SCALE_VAR) {
            Some(raw) => parse_scale(&raw)?,
            None => DEFAULT_CPU_SCALE,
        };

        let snapshot = match lookup(SNAPSHOT_VAR) {
            Some(path) => {
                let (width, height) = match lookup(SNAPSHOT_SIZE_VAR) {
                    Some(raw) => parse_size(&raw)?,
                    None => DEFAULT_SNAPSHOT_SIZE,
                };
                let time = match lookup(SNAPSHOT_TIME_VAR) {
                    Some(raw) => parse_time(&raw)?,
                    None => 0.0,
                };
                Some(Snapshot {
                    path: PathBuf::from(path),
                    width,
                    height,
                    time,
                })
            }
            None => None,
        };

        Ok(Self {
            backend,
            cpu_scale,
            snapshot,
        })
    }
}

fn parse_scale(raw: &str) -> Result<f32, ConfigError> {
    match raw.trim().parse::<f32>() {
        Ok(scale) if scale > 0.0 && scale <= 1.0 => Ok(scale),
        _ => Err(ConfigError::InvalidScale(raw.to_owned())),
    }
}

fn parse_size(raw: &str) -> Result<(u32, u32), ConfigError> {
    let invalid = || ConfigError::InvalidSize(raw.to_owned());
    let (width, height) = raw.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
    let width: u32 = width.trim().parse().map_err(|_| invalid())?;
    let height: u32 = height.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}

fn parse_time(raw: &str) -> Result<f32, ConfigError> {
    match raw.trim().parse::<f32>() {
        Ok(time) if time.is_finite() && time >= 0.0 => Ok(time),
        _ => Err(ConfigError::InvalidTime(raw.to_owned())),
    }
}
