use crate::schema::HeraldConfig;
use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Jsonc,
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;

        match ext {
            "jsonc" => Some(Self::Jsonc),
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: HeraldConfig,
    pub path: PathBuf,
    pub format: ConfigFormat,
}

/// Load configuration, falling back to defaults when no explicit path is
/// given and no config file is found.
pub fn load_config(config_path: Option<&Path>) -> Result<HeraldConfig> {
    match config_path {
        Some(path) => load_config_from_file(path).map(|r| r.config),
        None => match find_config_file() {
            Some(path) => load_config_from_file(&path).map(|r| r.config),
            None => Ok(HeraldConfig::default()),
        },
    }
}

pub fn load_config_from_file(path: &Path) -> Result<ResolvedConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| anyhow!("Unknown config format for: {}", path.display()))?;

    let config = parse_config_content(&content, format)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;

    Ok(ResolvedConfig {
        config: expand_env_vars(config),
        path: path.to_path_buf(),
        format,
    })
}

fn parse_config_content(content: &str, format: ConfigFormat) -> Result<HeraldConfig> {
    match format {
        ConfigFormat::Jsonc => json5::from_str(content).context("Failed to parse JSONC"),
        ConfigFormat::Json => serde_json::from_str(content).context("Failed to parse JSON"),
        ConfigFormat::Yaml => serde_yaml_ng::from_str(content).context("Failed to parse YAML"),
    }
}

const CONFIG_CANDIDATES: &[&str] = &[
    "herald.jsonc",
    "herald.json",
    "herald.yml",
    "herald.yaml",
    ".herald.jsonc",
    ".herald.json",
    ".herald.yml",
    ".herald.yaml",
];

fn search_dirs() -> Vec<PathBuf> {
    let mut roots = vec![PathBuf::new()];
    if let Some(config_dir) = dirs::config_dir() {
        roots.push(config_dir.join("herald"));
    }
    roots
}

fn find_config_file() -> Option<PathBuf> {
    find_all_config_files().into_iter().next()
}

/// Every existing config file, in lookup priority order.
pub fn find_all_config_files() -> Vec<PathBuf> {
    search_dirs()
        .iter()
        .flat_map(|dir| CONFIG_CANDIDATES.iter().map(move |c| dir.join(c)))
        .filter(|path| path.exists())
        .collect()
}

fn expand_env_vars(mut config: HeraldConfig) -> HeraldConfig {
    config.demo.event_key = expand_env_string(&config.demo.event_key);
    config.telemetry.level = expand_env_string(&config.telemetry.level);
    if let Some(name) = config.telemetry.service_name.take() {
        config.telemetry.service_name = Some(expand_env_string(&name));
    }
    config
}

fn expand_env_string(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        if chars.peek() == Some(&'{') {
            // ${VAR}
            chars.next();
            let var_name: String = chars.by_ref().take_while(|&c| c != '}').collect();
            match env::var(&var_name) {
                Ok(value) => result.push_str(&value),
                Err(_) => {
                    result.push_str("${");
                    result.push_str(&var_name);
                    result.push('}');
                }
            }
            continue;
        }

        // $VAR, stopping at the first character that cannot be in a name
        let mut var_name = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                var_name.push(c);
                chars.next();
            } else {
                break;
            }
        }

        if var_name.is_empty() {
            result.push('$');
        } else if let Ok(value) = env::var(&var_name) {
            result.push_str(&value);
        } else {
            result.push('$');
            result.push_str(&var_name);
        }
    }

    result
}
