// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use billdesk_app::ViewKind;
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "billdesk";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub invoice: Invoice,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            ui: Ui::default(),
            invoice: Invoice::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub start_view: Option<String>,
    #[serde(default)]
    pub clients: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Invoice {
    pub print_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("BILLDESK_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set BILLDESK_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and keep values under [ui], [invoice], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Regenerate it with --print-example-config",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(view) = &self.ui.start_view
            && ViewKind::parse(view).is_none()
        {
            let choices = ViewKind::ALL.map(ViewKind::label).join(", ");
            bail!(
                "ui.start_view in {} must be one of {choices}, got {view:?}",
                path.display()
            );
        }

        if let Some(client) = self.ui.clients.iter().find(|client| client.trim().is_empty()) {
            bail!(
                "ui.clients in {} contains a blank name {client:?} -- remove it and retry",
                path.display()
            );
        }

        let mut seen = HashSet::new();
        if let Some(client) = self
            .ui
            .clients
            .iter()
            .find(|client| !seen.insert(client.trim()))
        {
            bail!(
                "ui.clients in {} lists {:?} more than once -- keep one entry and retry",
                path.display(),
                client.trim()
            );
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.as_str())
        {
            bail!(
                "log.level in {} must be one of {}, got {level:?}",
                path.display(),
                LOG_LEVELS.join(", ")
            );
        }

        for (key, value) in [
            ("invoice.print_dir", &self.invoice.print_dir),
            ("log.file", &self.log.file),
        ] {
            if let Some(value) = value
                && value.trim().is_empty()
            {
                bail!(
                    "{key} in {} is empty -- set a path or remove the key",
                    path.display()
                );
            }
        }

        Ok(())
    }

    pub fn start_view(&self) -> ViewKind {
        self.ui
            .start_view
            .as_deref()
            .and_then(ViewKind::parse)
            .unwrap_or(ViewKind::Dashboard)
    }

    pub fn clients(&self) -> Vec<String> {
        self.ui
            .clients
            .iter()
            .map(|client| client.trim().to_owned())
            .collect()
    }

    pub fn print_dir(&self) -> Result<PathBuf> {
        match &self.invoice.print_dir {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(data_dir()?.join("prints")),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        match &self.log.file {
            Some(path) => Ok(PathBuf::from(path)),
            None => Ok(data_dir()?.join(format!("{APP_NAME}.log"))),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# billdesk config\n# Place this file at: {}\n\nversion = 1\n\n[ui]\n# One of: dashboard, projects, invoices, payments, reports\nstart_view = \"dashboard\"\n# Choices offered by the project client filter\nclients = [\"Acme Studio\", \"Globex\"]\n\n[invoice]\n# Optional. Default is the platform data dir (for example ~/.local/share/billdesk/prints)\n# print_dir = \"/absolute/path/to/prints\"\n\n[log]\n# RUST_LOG overrides this when set\nlevel = \"{DEFAULT_LOG_LEVEL}\"\n# file = \"/absolute/path/to/billdesk.log\"\n",
            path.display(),
        )
    }
}

fn data_dir() -> Result<PathBuf> {
    let root = dirs::data_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set [invoice].print_dir and [log].file explicitly")
    })?;
    Ok(root.join(APP_NAME))
}
