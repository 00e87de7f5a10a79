use std::path::Path;
use std::sync::OnceLock;

const CONFIG_ENV: &str = "UTF8_MARSHAL_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "utf8_marshal.cfg";

/// What `decode` does with bytes that are not valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Utf8Policy {
    /// Fail with `MarshalError::InvalidUtf8`.
    #[default]
    Strict,
    /// Replace each malformed sequence with U+FFFD.
    Lossy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarshalConfig {
    pub utf8_policy: Utf8Policy,
    /// Upper bound on the terminator scan. `None` scans until the first NUL.
    pub max_scan_len: Option<usize>,
    pub log_level: log::LevelFilter,
}

impl Default for MarshalConfig {
    fn default() -> Self {
        Self {
            utf8_policy: Utf8Policy::Strict,
            max_scan_len: None,
            log_level: if cfg!(feature = "verbose_logs") {
                log::LevelFilter::Debug
            } else {
                log::LevelFilter::Info
            },
        }
    }
}

static CONFIG: OnceLock<MarshalConfig> = OnceLock::new();

/// Process-wide configuration, read once on first use.
pub fn marshal_config() -> &'static MarshalConfig {
    CONFIG.get_or_init(read_config)
}

fn read_config() -> MarshalConfig {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(Path::new(&path))
}

/// Read and parse the file at `path`. A missing or unreadable file gives defaults.
fn load_config(path: &Path) -> MarshalConfig {
    match std::fs::read_to_string(path) {
        Ok(text) => MarshalConfig::parse(&text),
        Err(_) => MarshalConfig::default(),
    }
}

impl MarshalConfig {
    /// Parse `key = value` lines. Unknown keys and bad values keep the default.
    pub fn parse(text: &str) -> Self {
        let mut cfg = Self::default();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().unwrap_or("").trim();
            let value = parts.next().unwrap_or("").trim();

            if key.eq_ignore_ascii_case("utf8_policy") {
                if value.eq_ignore_ascii_case("lossy") {
                    cfg.utf8_policy = Utf8Policy::Lossy;
                } else if value.eq_ignore_ascii_case("strict") {
                    cfg.utf8_policy = Utf8Policy::Strict;
                }
            }
            if key.eq_ignore_ascii_case("max_scan_len") {
                // 0 means unbounded.
                if let Ok(n) = value.parse::<usize>() {
                    cfg.max_scan_len = (n > 0).then_some(n);
                }
            }
            if key.eq_ignore_ascii_case("log_level") {
                if let Ok(level) = value.parse::<log::LevelFilter>() {
                    cfg.log_level = level;
                }
            }
        }

        cfg
    }
}
