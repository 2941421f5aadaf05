#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};

use crate::error::TaskListError;
use crate::logging;
use crate::task::manager::{EmptyEditPolicy, ListOptions};
use crate::task::model::FilterMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub list: ListConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    #[serde(alias = "path")]
    pub dir: String,
    pub key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: "~/.config/tasklist/store".to_owned(),
            key: "todo_tasks_v1".to_owned(),
        }
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListConfig {
    pub allow_duplicate_titles: bool,
    pub duplicate_ignore_case: bool,
    pub supports_description: bool,
    pub supports_priority: bool,
    pub empty_edit: EmptyEditPolicy,
}

impl Default for ListConfig {
    fn default() -> Self {
        let opts = ListOptions::default();
        Self {
            allow_duplicate_titles: opts.allow_duplicate_titles,
            duplicate_ignore_case: opts.duplicate_ignore_case,
            supports_description: opts.supports_description,
            supports_priority: opts.supports_priority,
            empty_edit: opts.empty_edit,
        }
    }
}

impl ListConfig {
    #[must_use]
    pub fn options(&self) -> ListOptions {
        ListOptions {
            allow_duplicate_titles: self.allow_duplicate_titles,
            duplicate_ignore_case: self.duplicate_ignore_case,
            supports_description: self.supports_description,
            supports_priority: self.supports_priority,
            empty_edit: self.empty_edit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub icons: bool,
    pub default_filter: String,
    pub show_progress: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            icons: true,
            default_filter: "all".to_owned(),
            show_progress: true,
        }
    }
}

impl UiConfig {
    /// Falls back to `all` for values `validate` would reject.
    #[must_use]
    pub fn filter(&self) -> FilterMode {
        self.default_filter.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_file: PathBuf,
}

pub fn default_paths() -> anyhow::Result<ConfigPaths> {
    // An existing ~/.config file wins on every platform.
    let dotfile = home_dir().map(|h| h.join(".config").join("tasklist").join("config.toml"));
    match dotfile {
        Some(path) if !cfg!(windows) || path.exists() => Ok(ConfigPaths { config_file: path }),
        _ => {
            let proj = ProjectDirs::from("com", "tasklist", "tasklist")
                .context("failed to determine platform config directory")?;
            Ok(ConfigPaths {
                config_file: proj.config_dir().join("config.toml"),
            })
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| BaseDirs::new().map(|d| d.home_dir().to_path_buf()))
}

/// `~/rest` becomes an absolute path under the home directory.
#[must_use]
pub fn expand_tilde(input: &str) -> String {
    match (input.strip_prefix("~/"), home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().into_owned(),
        _ => input.to_owned(),
    }
}

/// Shortens paths under the home directory for display.
#[must_use]
pub fn tilde_path(input: &str) -> String {
    let Some(home) = home_dir() else {
        return input.to_owned();
    };
    match Path::new(input).strip_prefix(&home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_owned(),
        Ok(rest) => format!("~{}{}", std::path::MAIN_SEPARATOR, rest.display()),
        Err(_) => input.to_owned(),
    }
}

pub fn expand_path(input: &str) -> anyhow::Result<PathBuf> {
    let expanded = expand_env_vars(&expand_tilde(input));
    let p = PathBuf::from(expanded);
    if p.is_absolute() {
        return Ok(p);
    }
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    Ok(cwd.join(p))
}

fn expand_env_vars(input: &str) -> String {
    // $VAR and ${VAR}; unknown variables stay as written.
    let Ok(re) = regex::Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*)\}?") else {
        return input.to_owned();
    };
    re.replace_all(input, |caps: &regex::Captures<'_>| {
        let key = &caps[1];
        std::env::var(key).unwrap_or_else(|_| caps[0].to_owned())
    })
    .to_string()
}

pub fn load() -> anyhow::Result<(Config, ConfigPaths)> {
    let paths = default_paths()?;
    let cfg = load_at_path(&paths.config_file)?;
    Ok((cfg, paths))
}

pub fn load_at_path(path: &Path) -> anyhow::Result<Config> {
    let (_doc, cfg) = load_from_file(path)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn list_resolved_toml() -> anyhow::Result<String> {
    let (cfg, _paths) = load()?;
    Ok(toml::to_string_pretty(&cfg)?)
}

pub fn get_value_string(key: &str) -> anyhow::Result<Option<String>> {
    let paths = default_paths()?;
    get_value_string_at_path(&paths.config_file, key)
}

pub fn set_value_string(key: &str, value: &str) -> anyhow::Result<()> {
    let paths = default_paths()?;
    set_value_string_at_path(&paths.config_file, key, value)
}

fn load_from_file(path: &Path) -> anyhow::Result<(toml_edit::DocumentMut, Config)> {
    if !path.exists() {
        return Ok((toml_edit::DocumentMut::new(), Config::default()));
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let doc = raw
        .parse::<toml_edit::DocumentMut>()
        .with_context(|| format!("failed to parse TOML in {}", path.display()))?;

    let cfg: Config = toml::from_str(&raw)
        .with_context(|| format!("failed to deserialize TOML in {}", path.display()))?;
    Ok((doc, cfg))
}

pub fn get_value_string_at_path(path: &Path, key: &str) -> anyhow::Result<Option<String>> {
    let (_doc, cfg) = load_from_file(path)?;
    cfg.validate()?;

    let norm = normalize_key(key);
    let value = lookup_value(&cfg, norm);
    Ok(value.map(format_value_for_stdout))
}

pub fn set_value_string_at_path(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let (mut doc, cfg) = load_from_file(path)?;
    cfg.validate()?;

    let (norm_key, value_item) = normalize_key_and_parse_value(key, value)?;
    apply_set(&mut doc, norm_key, value_item)?;

    // Re-parse so an update can never leave an unloadable file behind.
    let new_raw = doc.to_string();
    let new_cfg: Config = toml::from_str(&new_raw)
        .with_context(|| format!("config update produced invalid TOML for {}", path.display()))?;
    new_cfg.validate()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, new_raw.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(key = norm_key, path = %path.display(), "updated config");

    Ok(())
}

impl Config {
    pub fn validate(&self) -> Result<(), TaskListError> {
        if self.store.dir.trim().is_empty() {
            return Err(TaskListError::Config(
                "store.dir must not be empty".to_owned(),
            ));
        }
        if self.store.key.trim().is_empty() {
            return Err(TaskListError::Config(
                "store.key must not be empty".to_owned(),
            ));
        }
        if self.ui.default_filter.parse::<FilterMode>().is_err() {
            return Err(TaskListError::Config(format!(
                "ui.default_filter must be one of: all, active, completed (got '{}')",
                self.ui.default_filter
            )));
        }
        let level = self.log.level.trim().to_ascii_lowercase();
        if !logging::LEVELS.contains(&level.as_str()) {
            return Err(TaskListError::Config(format!(
                "log.level must be one of: {}",
                logging::LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyType {
    Bool,
    String,
    Enum(&'static [&'static str]),
}

fn normalize_key(key: &str) -> &str {
    // Option names as they appear in the list options and older spellings.
    match key {
        "store.path" => "store.dir",
        "allow_duplicate_titles" | "allowDuplicateTitles" => "list.allow_duplicate_titles",
        "supports_description" | "supportsDescription" => "list.supports_description",
        "supports_priority" | "supportsPriority" => "list.supports_priority",
        "ui.filter" => "ui.default_filter",
        "log_level" => "log.level",
        _ => key,
    }
}

fn normalize_key_and_parse_value(
    key: &str,
    value: &str,
) -> anyhow::Result<(&'static str, toml_edit::Item)> {
    let (norm, key_type) =
        key_type(normalize_key(key)).ok_or_else(|| TaskListError::InvalidConfigKey(key.to_owned()))?;
    let invalid = |msg: String| TaskListError::InvalidConfigValue {
        key: key.to_owned(),
        msg,
    };

    let item = match key_type {
        KeyType::Bool => toml_edit::value(parse_bool(value).map_err(invalid)?),
        KeyType::String => {
            if value.trim().is_empty() {
                return Err(invalid("must not be empty".to_owned()).into());
            }
            toml_edit::value(value)
        }
        KeyType::Enum(allowed) => {
            let v = value.trim().to_ascii_lowercase();
            if !allowed.contains(&v.as_str()) {
                return Err(invalid(format!("must be one of: {}", allowed.join(", "))).into());
            }
            toml_edit::value(v)
        }
    };

    Ok((norm, item))
}

fn key_type(key: &str) -> Option<(&'static str, KeyType)> {
    Some(match key {
        "store.dir" => ("store.dir", KeyType::String),
        "store.key" => ("store.key", KeyType::String),

        "list.allow_duplicate_titles" => ("list.allow_duplicate_titles", KeyType::Bool),
        "list.duplicate_ignore_case" => ("list.duplicate_ignore_case", KeyType::Bool),
        "list.supports_description" => ("list.supports_description", KeyType::Bool),
        "list.supports_priority" => ("list.supports_priority", KeyType::Bool),
        "ui.icons" => ("ui.icons", KeyType::Bool),
        "ui.show_progress" => ("ui.show_progress", KeyType::Bool),

        "list.empty_edit" => ("list.empty_edit", KeyType::Enum(&["ignore", "remove"])),
        "ui.default_filter" => (
            "ui.default_filter",
            KeyType::Enum(&["all", "active", "completed"]),
        ),
        "log.level" => ("log.level", KeyType::Enum(&logging::LEVELS)),

        _ => return None,
    })
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim() {
        "true" | "yes" | "on" => Ok(true),
        "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected true|false, got '{other}'")),
    }
}

fn apply_set(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    value: toml_edit::Item,
) -> anyhow::Result<()> {
    let Some((table, leaf)) = key.split_once('.') else {
        return Err(TaskListError::InvalidConfigKey(key.to_owned()).into());
    };

    let root = doc.as_table_mut();
    if !root.contains_key(table) {
        root.insert(table, toml_edit::Item::Table(toml_edit::Table::new()));
    }
    let section = root[table].as_table_mut().ok_or_else(|| {
        TaskListError::Config(format!("cannot set {key}: '{table}' is not a table"))
    })?;
    section.insert(leaf, value);
    Ok(())
}

fn lookup_value(cfg: &Config, key: &str) -> Option<serde_json::Value> {
    let mut v = serde_json::to_value(cfg).ok()?;
    for seg in key.split('.').filter(|s| !s.is_empty()) {
        match v {
            serde_json::Value::Object(mut map) => {
                v = map.remove(seg)?;
            }
            _ => return None,
        }
    }
    Some(v)
}

fn format_value_for_stdout(v: serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "null".to_owned(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s,
        other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
    }
}
