use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::calendar::parse_date;
use crate::expand::default_ceiling;

const CONFIG_FILE: &str =
  "cadence.toml";
const CONFIG_DIR: &str = "cadence";
const CONFIG_ENV_VAR: &str =
  "CADENCE_CONFIG";
const CEILING_ENV_VAR: &str =
  "CADENCE_CEILING";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
  ceiling: Option<String>,
  expand:  Option<ExpandSection>,
  output:  Option<OutputSection>
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExpandSection {
  ceiling: Option<String>
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputSection {
  pretty: Option<bool>
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  pub ceiling:      NaiveDate,
  pub pretty:       bool,
  pub loaded_files: Vec<PathBuf>
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      ceiling:      default_ceiling(),
      pretty:       true,
      loaded_files: vec![]
    }
  }
}

impl Settings {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut settings = Self::default();

    let env_path =
      std::env::var(CONFIG_ENV_VAR)
        .ok();
    match resolve_config_path(
      config_override,
      env_path.as_deref()
    ) {
      | Some(path) => {
        info!(config = %path.display(), "loading config");
        settings.load_file(&path)?;
      }
      | None => {
        info!(
          "no config file found; \
           using defaults"
        );
      }
    }

    let env_ceiling =
      std::env::var(CEILING_ENV_VAR)
        .ok();
    settings.apply_env_ceiling(
      env_ceiling.as_deref()
    )?;

    Ok(settings)
  }

  /// Blank values count as unset.
  pub fn apply_env_ceiling(
    &mut self,
    raw: Option<&str>
  ) -> anyhow::Result<()> {
    let Some(raw) = raw else {
      return Ok(());
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      warn!(
        var = CEILING_ENV_VAR,
        "ceiling variable was empty"
      );
      return Ok(());
    }
    self.apply_ceiling(
      trimmed,
      CEILING_ENV_VAR
    )
  }

  #[tracing::instrument(skip(self))]
  pub fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let text =
      fs::read_to_string(path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    let parsed: FileConfig =
      toml::from_str(&text)
        .with_context(|| {
          format!(
            "failed to parse {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.to_path_buf());

    let source =
      format!("file:{}", path.display());
    let ceiling = parsed
      .ceiling
      .or_else(|| {
        parsed.expand.and_then(
          |section| section.ceiling
        )
      });
    if let Some(raw) = ceiling {
      self.apply_ceiling(&raw, &source)?;
    }

    if let Some(pretty) = parsed
      .output
      .and_then(|section| section.pretty)
    {
      debug!(pretty, source = %source, "configured output");
      self.pretty = pretty;
    }

    Ok(())
  }

  pub fn apply_ceiling(
    &mut self,
    raw: &str,
    source: &str
  ) -> anyhow::Result<()> {
    let ceiling = parse_date(raw)
      .with_context(|| {
        format!(
          "invalid ceiling from \
           {source}"
        )
      })?;
    info!(
      source,
      %ceiling,
      "configured repeat ceiling"
    );
    self.ceiling = ceiling;
    Ok(())
  }
}

fn resolve_config_path(
  override_path: Option<&Path>,
  env_path: Option<&str>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Some(raw) = env_path {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
      return Some(PathBuf::from(
        trimmed
      ));
    }
    warn!(
      var = CONFIG_ENV_VAR,
      "config path variable was empty"
    );
  }

  let candidates = [
    dirs::config_dir().map(|dir| {
      dir.join(CONFIG_DIR).join(CONFIG_FILE)
    }),
    std::env::current_dir()
      .ok()
      .map(|dir| dir.join(CONFIG_FILE))
  ];
  candidates
    .into_iter()
    .flatten()
    .find(|path| path.exists())
}
