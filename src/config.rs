/// Configuration module for gedchart.
///
/// Chart options can come from a JSON file and are then overridden by
/// command-line flags. Everything is validated before the GEDCOM input is
/// opened.
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chart::{ChartOptions, NameFormatter};
use crate::graph::select::SelectionMode;

static ROOT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^[FI]\d+$").unwrap());

// ── Default value functions ──────────────────────────────────────────

fn default_true() -> bool {
    true
}

// ── Config struct ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ChartConfig {
    /// Root individual (`I12`) or family (`F3`); prunes unrelated records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Show the children of every ancestor family.
    #[serde(default)]
    pub children: bool,

    /// Show every blood relative of the root.
    #[serde(default)]
    pub blood: bool,

    /// Abbreviate middle names to initials.
    #[serde(default = "default_true")]
    pub initials: bool,

    /// Close each family block with a separator line.
    #[serde(default = "default_true")]
    pub family_separator: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            root: None,
            children: false,
            blood: false,
            initials: default_true(),
            family_separator: default_true(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl ChartConfig {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults. Invalid JSON is reported and
    /// also yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        let cfg: ChartConfig = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {}: {e}", path.display());
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data)
            .with_context(|| format!("failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Validate the option combination and the root id format.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !(self.children && self.blood),
            "Only one of --children and --blood can be specified"
        );
        if let Some(root) = &self.root {
            anyhow::ensure!(
                ROOT_RE.is_match(root),
                "--root argument must be F or I followed by digits, like F123 or I4 (got {root:?})"
            );
        }
        Ok(())
    }

    /// The root id, upper-cased.
    #[must_use]
    pub fn root_id(&self) -> Option<String> {
        self.root.as_deref().map(str::to_uppercase)
    }

    /// Selection mode implied by the `children` / `blood` flags.
    #[must_use]
    pub fn mode(&self) -> SelectionMode {
        if self.blood {
            SelectionMode::Blood
        } else if self.children {
            SelectionMode::Children
        } else {
            SelectionMode::Ancestors
        }
    }

    #[must_use]
    pub fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            formatter: NameFormatter::new(self.initials),
            family_separator: self.family_separator,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
