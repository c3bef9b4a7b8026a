//! Layered configuration
//!
//! Values are resolved from, lowest to highest precedence: built-in defaults,
//! the user config file, a project `extmodgen.toml` next to the input, an
//! explicit `--config` file, `EXTMODGEN_*` environment variables and finally
//! the command line (applied by the caller).

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use etcetera::BaseStrategy;
use log::debug;
use serde::Deserialize;

use crate::{
    code_generator::{GeneratorOptions, templates},
    types::ModuleFlavor,
};

pub const CONFIG_FILE_NAME: &str = "extmodgen.toml";
const ENV_PREFIX: &str = "EXTMODGEN_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Generate a user C module (`true`) or a core-port module (`false`)
    pub external_module: bool,
    /// Fallback when the module has no `__author__`
    pub author: Option<String>,
    /// File replacing the built-in license header
    pub header_template: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub force: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            external_module: true,
            author: None,
            header_template: None,
            output_dir: None,
            force: false,
        }
    }
}

/// One configuration file; absent keys leave the lower layer untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigLayer {
    external_module: Option<bool>,
    author: Option<String>,
    header_template: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    force: Option<bool>,
}

impl Config {
    /// Resolve the configuration for an input living in `project_dir`.
    pub fn load(project_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let mut files = Vec::new();
        if let Some(user) = user_config_path() {
            files.push(user);
        }
        if let Some(dir) = project_dir {
            files.push(dir.join(CONFIG_FILE_NAME));
        }
        if let Some(explicit) = explicit {
            if !explicit.is_file() {
                bail!("Config file {} does not exist", explicit.display());
            }
            files.push(explicit.to_path_buf());
        }
        Self::load_layers(&files, |key| std::env::var(key).ok())
    }

    /// Apply `files` in order (missing ones are skipped), then the environment.
    pub fn load_layers(files: &[PathBuf], env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        for path in files {
            if !path.is_file() {
                continue;
            }
            debug!("Loading configuration from {}", path.display());
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let layer: ConfigLayer = toml::from_str(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            config.apply(layer);
        }
        config.apply_env(env)?;
        Ok(config)
    }

    fn apply(&mut self, layer: ConfigLayer) {
        if let Some(value) = layer.external_module {
            self.external_module = value;
        }
        if layer.author.is_some() {
            self.author = layer.author;
        }
        if layer.header_template.is_some() {
            self.header_template = layer.header_template;
        }
        if layer.output_dir.is_some() {
            self.output_dir = layer.output_dir;
        }
        if let Some(value) = layer.force {
            self.force = value;
        }
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| env(&format!("{ENV_PREFIX}{key}"));
        let layer = ConfigLayer {
            external_module: var("EXTERNAL_MODULE")
                .map(|v| parse_bool("EXTERNAL_MODULE", &v))
                .transpose()?,
            author: var("AUTHOR"),
            header_template: var("HEADER_TEMPLATE").map(PathBuf::from),
            output_dir: var("OUTPUT_DIR").map(PathBuf::from),
            force: var("FORCE").map(|v| parse_bool("FORCE", &v)).transpose()?,
        };
        self.apply(layer);
        Ok(())
    }

    pub fn flavor(&self) -> ModuleFlavor {
        if self.external_module {
            ModuleFlavor::External
        } else {
            ModuleFlavor::CorePort
        }
    }

    /// Render the license header for `module_author`, falling back to the
    /// configured author.
    pub fn render_header(&self, module_author: &str, year: i32) -> Result<String> {
        let author = if module_author.is_empty() {
            self.author.as_deref().unwrap_or_default()
        } else {
            module_author
        };
        let template = match &self.header_template {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read header template {}", path.display()))?,
            None => templates::DEFAULT_HEADER_TEMPLATE.to_owned(),
        };
        Ok(templates::render_header(&template, year, author))
    }

    pub fn generator_options(&self, module_author: &str, year: i32) -> Result<GeneratorOptions> {
        Ok(GeneratorOptions {
            flavor: self.flavor(),
            header: self.render_header(module_author, year)?,
        })
    }
}

/// `extmodgen/extmodgen.toml` under the platform config directory
pub fn user_config_path() -> Option<PathBuf> {
    etcetera::choose_base_strategy()
        .ok()
        .map(|strategy| strategy.config_dir().join("extmodgen").join(CONFIG_FILE_NAME))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("Invalid boolean '{other}' in {ENV_PREFIX}{key}"),
    }
}
