use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod fixed;
pub mod graduation;
pub mod liquidity;
pub mod plot;
pub mod pool;
pub mod reserves;
pub mod search;
pub mod supply;
pub mod ticks;
pub mod transition;
pub mod units;

pub use fixed::Fixed;
pub use graduation::{search_with_fee, GraduationCandidate, GraduationSearch, ScoreWeights};
pub use plot::PlotFormat;
pub use reserves::{LaunchTargets, ReservesCurve};
pub use search::{search, Candidate, SearchRange};

pub const CONFIG_FILE_NAME: &str = ".curvelab.toml";

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CurveError {
    #[error("min_e0_eth must be > 0")]
    NonPositiveMinE0,
    #[error("max_e0_eth must be >= min_e0_eth")]
    MaxBelowMin,
    #[error("step_e0_eth must be > 0")]
    NonPositiveStep,
    #[error("target_fee_eth must be in (0, {graduation_eth})")]
    FeeOutOfRange { graduation_eth: String },
    #[error("No valid candidate found in the provided range")]
    NoCandidate,
    #[error("invalid launch configuration: {0}")]
    InvalidLaunch(String),
    #[error("invalid curve parameters: {0}")]
    InvalidCurve(String),
    #[error("price must be finite and > 0, got {0}")]
    InvalidPrice(f64),
    #[error("tick {0} is outside [{min}, {max}]", min = ticks::MIN_TICK, max = ticks::MAX_TICK)]
    TickOutOfRange(i64),
    #[error("sqrtPriceX96 {0} is outside the supported range")]
    SqrtPriceOutOfRange(String),
    #[error("tick spacing must be > 0, got {0}")]
    InvalidTickSpacing(i32),
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error("cannot fit supply curve: {0}")]
    DegenerateFit(String),
    #[error("division by zero while computing {0}")]
    DivisionByZero(&'static str),
    #[error("failed to render plot: {0}")]
    Plot(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T, E = CurveError> = std::result::Result<T, E>;

// ── Configuration ─────────────────────────────────────────────────────────────

/// Token-launch constants shared by the curve fitters.
///
/// Token quantities are whole tokens, ETH quantities are decimal ETH; both are
/// converted to 18-decimal integers by [`LaunchConfig::targets`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LaunchConfig {
    #[serde(default = "default_total_supply")]
    pub total_supply: u64,
    #[serde(default = "default_graduation_eth")]
    pub graduation_eth: Decimal,
    #[serde(default = "default_graduation_tokens")]
    pub graduation_tokens: u64,
    #[serde(default = "default_graduation_fee_eth")]
    pub graduation_fee_eth: Decimal,
    #[serde(default = "default_creator_supply")]
    pub creator_supply: u64,
}

/// Concentrated-liquidity pool layout used by the graduation pool.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PoolConfig {
    #[serde(default = "default_tick_spacing")]
    pub tick_spacing: i32,
    #[serde(default = "default_tick_lower")]
    pub tick_lower: i32,
    #[serde(default = "default_tick_upper")]
    pub tick_upper: i32,
    #[serde(default = "default_graduation_wei_per_token")]
    pub graduation_wei_per_token: u64,
    /// Secondary position's upper tick, in tick-spacing steps below `tick_upper`.
    #[serde(default = "default_secondary_upper_offset_steps")]
    pub secondary_upper_offset_steps: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurveLabConfig {
    #[serde(default = "default_plot_dir")]
    pub plot_dir: PathBuf,
    #[serde(default)]
    pub plot_format: PlotFormat,
    #[serde(default)]
    pub launch: LaunchConfig,
    #[serde(default)]
    pub pool: PoolConfig,
}

fn default_total_supply() -> u64 {
    1_000_000_000
}

fn default_graduation_eth() -> Decimal {
    Decimal::new(85, 1)
}

fn default_graduation_tokens() -> u64 {
    200_000_000
}

fn default_graduation_fee_eth() -> Decimal {
    Decimal::new(5, 1)
}

fn default_creator_supply() -> u64 {
    10_000_000
}

fn default_tick_spacing() -> i32 {
    200
}

fn default_tick_lower() -> i32 {
    -7000
}

fn default_tick_upper() -> i32 {
    203_600
}

fn default_graduation_wei_per_token() -> u64 {
    42_500_000_000
}

fn default_secondary_upper_offset_steps() -> i32 {
    110
}

fn default_plot_dir() -> PathBuf {
    PathBuf::from("img")
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            total_supply: default_total_supply(),
            graduation_eth: default_graduation_eth(),
            graduation_tokens: default_graduation_tokens(),
            graduation_fee_eth: default_graduation_fee_eth(),
            creator_supply: default_creator_supply(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            tick_spacing: default_tick_spacing(),
            tick_lower: default_tick_lower(),
            tick_upper: default_tick_upper(),
            graduation_wei_per_token: default_graduation_wei_per_token(),
            secondary_upper_offset_steps: default_secondary_upper_offset_steps(),
        }
    }
}

impl Default for CurveLabConfig {
    fn default() -> Self {
        Self {
            plot_dir: default_plot_dir(),
            plot_format: PlotFormat::default(),
            launch: LaunchConfig::default(),
            pool: PoolConfig::default(),
        }
    }
}

impl CurveLabConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Loads `.curvelab.toml` from `dir` if present, otherwise the defaults.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "loading config");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
