use crate::state::StatusKind;
use serde::Deserialize;
use std::time::Duration;

/// Largest accepted value for the `*-delay-secs` settings
pub const MAX_DELAY_SECS: f64 = 960.0;

/// Main configuration structure for Chapter-Scout
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub probe: ProbeConfig,
    pub dispatch: DispatchConfig,
    pub open: OpenConfig,

    /// Domains whose bookmarks are reported as skipped without probing
    #[serde(rename = "skip-domains")]
    pub skip_domains: Vec<String>,

    /// Whether the built-in site table is loaded before `sites`
    #[serde(rename = "use-builtin-sites")]
    pub use_builtin_sites: bool,

    /// Extra chapter detectors, appended to the built-in table
    #[serde(rename = "site")]
    pub sites: Vec<SiteEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            probe: ProbeConfig::default(),
            dispatch: DispatchConfig::default(),
            open: OpenConfig::default(),
            skip_domains: Vec::new(),
            use_builtin_sites: true,
            sites: Vec::new(),
        }
    }
}

/// HTTP probe and classification pacing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Retries allowed per probe on timeouts and HTTP 429/503
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// First backoff delay (seconds); doubled per retry, capped at 960
    #[serde(rename = "base-delay-secs")]
    pub base_delay_secs: f64,

    /// Pause between classification steps against one domain (milliseconds)
    #[serde(rename = "step-pause-ms")]
    pub step_pause_ms: u64,

    /// Pause between successive bookmarks of one domain (seconds)
    #[serde(rename = "bucket-delay-secs")]
    pub bucket_delay_secs: f64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            connect_timeout_secs: 10,
            max_retries: 8,
            base_delay_secs: 1.0,
            step_pause_ms: 40,
            bucket_delay_secs: 0.0,
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn base_delay(&self) -> Duration {
        seconds(self.base_delay_secs)
    }

    pub fn step_pause(&self) -> Duration {
        Duration::from_millis(self.step_pause_ms)
    }

    pub fn bucket_delay(&self) -> Duration {
        seconds(self.bucket_delay_secs)
    }
}

/// Capped at [`MAX_DELAY_SECS`]; negative or NaN values become zero
fn seconds(value: f64) -> Duration {
    if value.is_nan() {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value.min(MAX_DELAY_SECS)).unwrap_or(Duration::ZERO)
}

/// Worker pool sizing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum number of domain buckets probed at once
    #[serde(rename = "max-concurrent-domains")]
    pub max_concurrent_domains: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_domains: 16,
        }
    }
}

/// How candidates are opened once the run is over
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenConfig {
    /// Binary invoked as `<opener> <url>`
    pub opener: String,

    /// Pause between two opens (milliseconds)
    #[serde(rename = "delay-ms")]
    pub delay_ms: u64,

    /// Wait for the user to hit enter before opening anything
    pub prompt: bool,

    /// Outcomes that are listed but never opened, e.g. `["Tiny", "Broken"]`
    #[serde(rename = "skip-kinds")]
    pub skip_kinds: Vec<StatusKind>,
}

impl Default for OpenConfig {
    fn default() -> Self {
        Self {
            opener: default_opener().to_string(),
            delay_ms: 200,
            prompt: true,
            skip_kinds: Vec::new(),
        }
    }
}

impl OpenConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// One entry of the chapter detector table
///
/// A page counts as "chapter found" when every `contains` marker appears in
/// it and no `excludes` marker does. An entry with neither list always
/// reports found; that suits sites which answer 404 for missing chapters.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SiteEntry {
    /// Registrable domain (e.g., "mangakatana.com")
    pub domain: String,

    #[serde(default)]
    pub contains: Vec<String>,

    #[serde(default)]
    pub excludes: Vec<String>,
}

fn default_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    }
}
