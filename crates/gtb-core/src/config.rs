use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

pub const DEFAULT_DATA_FILE: &str = "data.json";
pub const DEFAULT_BACKUP_DIR: &str = "backups";
pub const DEFAULT_BACKUP_RETENTION: usize = 10;
pub const DEFAULT_BACKUP_LIST_LIMIT: usize = 5;
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Typed configuration for the bot.
///
/// Everything except the token and the admin id has a default, so a bare
/// `TELEGRAM_BOT_TOKEN` + `ADMIN_ID` environment is enough to start.
#[derive(Clone, Debug)]
pub struct Config {
    // Core
    pub telegram_bot_token: String,
    pub admin_id: i64,

    // Storage
    pub data_file: PathBuf,
    pub backup_dir: PathBuf,
    pub backup_retention: usize,
    pub backup_list_limit: usize,

    // Translation
    pub translate_endpoint: String,
    pub translate_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(env_str)
    }

    /// Build a config from an arbitrary key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Required env vars
        let telegram_bot_token = get("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let admin_raw = get("ADMIN_ID").and_then(non_empty).ok_or_else(|| {
            Error::Config("ADMIN_ID environment variable is required".to_string())
        })?;
        let admin_id = admin_raw
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::Config(format!("ADMIN_ID is not a numeric user id: {admin_raw}")))?;

        let data_file = PathBuf::from(
            get("DATA_FILE")
                .and_then(non_empty)
                .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string()),
        );
        let backup_dir = PathBuf::from(
            get("BACKUP_DIR")
                .and_then(non_empty)
                .unwrap_or_else(|| DEFAULT_BACKUP_DIR.to_string()),
        );
        let backup_retention = parse_usize(get("BACKUP_RETENTION"))
            .unwrap_or(DEFAULT_BACKUP_RETENTION)
            .max(1);
        let backup_list_limit = parse_usize(get("BACKUP_LIST_LIMIT"))
            .unwrap_or(DEFAULT_BACKUP_LIST_LIMIT)
            .max(1);

        let translate_endpoint = get("TRANSLATE_ENDPOINT")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_TRANSLATE_ENDPOINT.to_string());
        let translate_timeout =
            Duration::from_millis(parse_u64(get("TRANSLATE_TIMEOUT_MS")).unwrap_or(10_000));

        Ok(Self {
            telegram_bot_token,
            admin_id,
            data_file,
            backup_dir,
            backup_retention,
            backup_list_limit,
            translate_endpoint,
            translate_timeout,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, strip_quotes(v.trim()));
    }
}

fn strip_quotes(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn parse_u64(v: Option<String>) -> Option<u64> {
    v.and_then(|s| s.trim().parse::<u64>().ok())
}

fn parse_usize(v: Option<String>) -> Option<usize> {
    v.and_then(|s| s.trim().parse::<usize>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
