use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs};

/// Archive suffix used when nothing else is configured.
pub const DEFAULT_EXTENSION: &str = ".zip";

/// Base-name prefix marking a file as hidden.
pub const HIDDEN_MARKER: &str = ".";

/// Prefix for every environment variable read by [`Config::from_env`].
pub const ENV_PREFIX: &str = "DIRZIP_";

/// Layered run configuration. Every field is optional so that the
/// environment, a config file and the command line can each fill in
/// only what they know; see [`merge_configs`].
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub root: Option<String>,
    pub config: Option<String>,
    pub extension: Option<String>,
    pub skip: Option<Vec<String>>,
    pub max_tasks: Option<usize>,
    pub remove_partial: Option<bool>,
    pub dry: Option<bool>,
}

impl Config {
    /// Reads `DIRZIP_*` variables from the process environment.
    pub fn from_env() -> Config {
        Config::from_vars(std::env::vars())
    }

    /// Reads `DIRZIP_*` entries from an arbitrary set of key/value pairs.
    pub fn from_vars<I>(vars: I) -> Config
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();

        macro_rules! get_env {
            ($key:expr) => {
                vars.get(&format!("{}{}", ENV_PREFIX, $key)).cloned()
            };
        }

        Config {
            root: get_env!("ROOT"),
            config: get_env!("CONFIG"),
            extension: get_env!("EXTENSION"),
            skip: get_env!("SKIP").map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
            max_tasks: get_env!("MAX_TASKS").and_then(|v| v.parse().ok()),
            remove_partial: get_env!("REMOVE_PARTIAL").map(|v| parse_flag(&v)),
            dry: get_env!("DRY").map(|v| parse_flag(&v)),
        }
    }

    /// Reads a YAML or JSON config file. JSON is picked by extension,
    /// anything else is parsed as YAML.
    pub fn from_file(path: &str) -> Result<Config> {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading config file {path}"))?;
        let cfg = if path.to_lowercase().ends_with(".json") {
            serde_json::from_str(&content).with_context(|| format!("parsing JSON config {path}"))?
        } else {
            serde_yaml::from_str(&content).with_context(|| format!("parsing YAML config {path}"))?
        };
        Ok(cfg)
    }

    /// Fills every unset field with its default.
    pub fn with_defaults(mut self) -> Config {
        if self.extension.is_none() {
            self.extension = Some(DEFAULT_EXTENSION.to_string());
        }
        if self.skip.is_none() {
            self.skip = Some(Vec::new());
        }
        if self.max_tasks.is_none() {
            self.max_tasks = Some(0);
        }
        if self.remove_partial.is_none() {
            self.remove_partial = Some(false);
        }
        if self.dry.is_none() {
            self.dry = Some(false);
        }
        self
    }
}

fn parse_flag(v: &str) -> bool {
    v == "true" || v == "1" || v.eq_ignore_ascii_case("yes")
}

/// Merge configs by priority: env < file < cli
pub fn merge_configs(env: Config, file: Config, cli: Config) -> Config {
    fn pick<T>(env: Option<T>, file: Option<T>, cli: Option<T>) -> Option<T> {
        cli.or(file).or(env)
    }

    Config {
        root: pick(env.root, file.root, cli.root),
        config: pick(env.config, file.config, cli.config),
        extension: pick(env.extension, file.extension, cli.extension),
        skip: pick(env.skip, file.skip, cli.skip),
        max_tasks: pick(env.max_tasks, file.max_tasks, cli.max_tasks),
        remove_partial: pick(env.remove_partial, file.remove_partial, cli.remove_partial),
        dry: pick(env.dry, file.dry, cli.dry),
    }
}
