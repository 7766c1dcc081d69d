#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::BackendName;
use crate::domain::services::RandomSource;
use crate::domain::services::SeededRandom;
use crate::domain::services::ThreadRandom;
use crate::domain::services::UploadTimings;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    Backend,
    ConfigFile,
    UploadTickMs,
    SettleDelayMs,
    ReviewDelayMinMs,
    ReviewDelayMaxMs,
    VerifyProbability,
    TypingDelayMs,
    Seed,
}

impl ConfigKey {
    pub fn env_name(&self) -> String {
        return format!(
            "CAMPUSFLOW_{}",
            self.to_string().to_uppercase().replace('-', "_")
        );
    }
}

fn parse_millis(key: ConfigKey, val: &str) -> Result<u64> {
    if let Ok(res) = val.trim().parse::<u64>() {
        return Ok(res);
    }

    bail!(format!(
        "Invalid value for '{key}': {val} is not a whole number of milliseconds"
    ));
}

fn parse_probability(key: ConfigKey, val: &str) -> Result<f64> {
    if let Ok(res) = val.trim().parse::<f64>() {
        if (0.0..=1.0).contains(&res) {
            return Ok(res);
        }
    }

    bail!(format!(
        "Invalid value for '{key}': {val} is not a number between 0 and 1"
    ));
}

fn parse_seed(val: &str) -> Result<Option<u64>> {
    if val.trim().is_empty() {
        return Ok(None);
    }

    if let Ok(res) = val.trim().parse::<u64>() {
        return Ok(Some(res));
    }

    bail!(format!(
        "Invalid value for '{}': {val} is not a whole number",
        ConfigKey::Seed
    ));
}

/// Rejects values that would fail later when read through a typed getter.
fn check_value(key: ConfigKey, val: &str) -> Result<()> {
    match key {
        ConfigKey::UploadTickMs
        | ConfigKey::SettleDelayMs
        | ConfigKey::ReviewDelayMinMs
        | ConfigKey::ReviewDelayMaxMs
        | ConfigKey::TypingDelayMs => {
            parse_millis(key, val)?;
        }
        ConfigKey::VerifyProbability => {
            parse_probability(key, val)?;
        }
        ConfigKey::Seed => {
            parse_seed(val)?;
        }
        ConfigKey::Backend => {
            if BackendName::parse(val).is_none() {
                bail!(format!("Invalid value for '{key}': no backend named {val}"));
            }
        }
        ConfigKey::ConfigFile => (),
    }

    return Ok(());
}

pub fn timings_from(
    tick_ms: u64,
    settle_delay_ms: u64,
    review_delay_min_ms: u64,
    review_delay_max_ms: u64,
    verify_probability: f64,
) -> Result<UploadTimings> {
    if tick_ms == 0 {
        bail!(format!("'{}' must be greater than 0", ConfigKey::UploadTickMs));
    }

    if review_delay_min_ms > review_delay_max_ms {
        bail!(format!(
            "'{}' ({review_delay_min_ms}) must not exceed '{}' ({review_delay_max_ms})",
            ConfigKey::ReviewDelayMinMs,
            ConfigKey::ReviewDelayMaxMs
        ));
    }

    return Ok(UploadTimings {
        tick: Duration::from_millis(tick_ms),
        settle_delay: Duration::from_millis(settle_delay_ms),
        review_delay_min: Duration::from_millis(review_delay_min_ms),
        review_delay_max: Duration::from_millis(review_delay_max_ms),
        verify_probability,
        ..UploadTimings::default()
    });
}

pub fn random_source_from(seed: &str) -> Result<Arc<dyn RandomSource>> {
    if let Some(seed) = parse_seed(seed)? {
        return Ok(Arc::new(SeededRandom::new(seed)));
    }

    return Ok(Arc::new(ThreadRandom::default()));
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    /// Falls back to the default when the key was never loaded.
    fn get_or_default(key: ConfigKey) -> String {
        let val = Config::get(key);
        if val.is_empty() {
            return Config::default(key);
        }

        return val;
    }

    pub fn default(key: ConfigKey) -> String {
        let default_backend = BackendName::Canned.to_string();

        #[cfg(not(target_os = "macos"))]
        let config_path = dirs::config_dir()
            .unwrap_or_else(env::temp_dir)
            .join("campusflow/config.toml");
        #[cfg(target_os = "macos")]
        let config_path = dirs::home_dir()
            .unwrap_or_else(env::temp_dir)
            .join(".config/campusflow/config.toml");

        let res = match key {
            ConfigKey::Backend => default_backend,
            ConfigKey::UploadTickMs => "200".to_string(),
            ConfigKey::SettleDelayMs => "500".to_string(),
            ConfigKey::ReviewDelayMinMs => "3000".to_string(),
            ConfigKey::ReviewDelayMaxMs => "5000".to_string(),
            ConfigKey::VerifyProbability => "0.9".to_string(),
            ConfigKey::TypingDelayMs => "1200".to_string(),
            ConfigKey::Seed => "".to_string(),

            // Special
            ConfigKey::ConfigFile => config_path.to_string_lossy().to_string(),
        };

        return res;
    }

    pub fn backend() -> Result<BackendName> {
        let name = Config::get_or_default(ConfigKey::Backend);
        if let Some(backend) = BackendName::parse(&name) {
            return Ok(backend);
        }

        bail!(format!("No backend named {name}"));
    }

    pub fn upload_timings() -> Result<UploadTimings> {
        let millis = |key: ConfigKey| {
            return parse_millis(key, &Config::get_or_default(key));
        };

        return timings_from(
            millis(ConfigKey::UploadTickMs)?,
            millis(ConfigKey::SettleDelayMs)?,
            millis(ConfigKey::ReviewDelayMinMs)?,
            millis(ConfigKey::ReviewDelayMaxMs)?,
            parse_probability(
                ConfigKey::VerifyProbability,
                &Config::get_or_default(ConfigKey::VerifyProbability),
            )?,
        );
    }

    pub fn typing_delay() -> Result<Duration> {
        let ms = parse_millis(
            ConfigKey::TypingDelayMs,
            &Config::get_or_default(ConfigKey::TypingDelayMs),
        )?;

        return Ok(Duration::from_millis(ms));
    }

    pub fn random_source() -> Result<Arc<dyn RandomSource>> {
        return random_source_from(&Config::get(ConfigKey::Seed));
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let key_str = key.to_string();
                    let mut possible_values = vec![];
                    if let Some(arg) = cmd
                        .get_arguments()
                        .find(|e| return e.get_long() == Some(key_str.as_str()))
                    {
                        possible_values = arg
                            .get_possible_values()
                            .iter()
                            .map(|e| return e.get_name().to_string())
                            .collect::<Vec<String>>();
                    }

                    let val_str = if let Some(val_int) = val.as_integer() {
                        val_int.to_string()
                    } else if let Some(val_float) = val.as_float() {
                        val_float.to_string()
                    } else if let Some(val_str) = val.as_str() {
                        val_str.to_string()
                    } else {
                        bail!(format!("config.toml has an unsupported value for key '{key}'"));
                    };

                    if val_str.is_empty() {
                        continue;
                    }
                    if !possible_values.is_empty() && !possible_values.contains(&val_str) {
                        bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                    }
                    check_value(key, &val_str)?;
                    Config::set(key, &val_str);
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    check_value(key, val)?;
                    Config::set(key, val)
                }
            }
        }

        Config::upload_timings()?;

        tracing::debug!(
            backend = Config::get(ConfigKey::Backend),
            upload_tick_ms = Config::get(ConfigKey::UploadTickMs),
            settle_delay_ms = Config::get(ConfigKey::SettleDelayMs),
            review_delay_min_ms = Config::get(ConfigKey::ReviewDelayMinMs),
            review_delay_max_ms = Config::get(ConfigKey::ReviewDelayMaxMs),
            verify_probability = Config::get(ConfigKey::VerifyProbability),
            typing_delay_ms = Config::get(ConfigKey::TypingDelayMs),
            seed = Config::get(ConfigKey::Seed),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                let key_str = key.to_string();
                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key_str.as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|help| return help.to_string())
                    .unwrap_or_default();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<f64>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
