use crate::error::{AutoRstError, Result};
use crate::templates::RootHeading;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_SOURCE_EXTENSION: &str = "py";

#[derive(Debug, Clone)]
pub struct Config {
    pub name_prefix: String,
    pub source_extension: String,
    pub library_name: Option<String>,
    pub library_heading: Option<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name_prefix: String::new(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            library_name: None,
            library_heading: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let name_prefix = env::var("AUTORST_NAME_PREFIX").unwrap_or_default();

        let source_extension = env::var("AUTORST_SOURCE_EXTENSION")
            .unwrap_or_else(|_| DEFAULT_SOURCE_EXTENSION.to_string());

        let library_name = env::var("AUTORST_LIBRARY_NAME").ok();
        let library_heading = env::var("AUTORST_LIBRARY_HEADING").ok();

        let log_level = env::var("AUTORST_LOG_LEVEL")
            .or_else(|_| env::var("LOG_LEVEL"))
            .unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            name_prefix,
            source_extension,
            library_name,
            library_heading,
            log_level,
        })
    }

    pub fn validate(&self) -> Result<()> {
        validate_prefix(&self.name_prefix)?;
        validate_extension(&self.source_extension)?;

        if self.library_name.is_some() != self.library_heading.is_some() {
            return Err(AutoRstError::config(
                "AUTORST_LIBRARY_NAME and AUTORST_LIBRARY_HEADING must be set together",
            ));
        }

        self.log_level_filter()?;

        log::debug!("Configuration loaded:");
        log::debug!("  Name prefix: {:?}", self.name_prefix);
        log::debug!("  Source extension: {}", self.source_extension);
        log::debug!("  Log level: {}", self.log_level);

        Ok(())
    }

    pub fn log_level_filter(&self) -> Result<log::LevelFilter> {
        log::LevelFilter::from_str(&self.log_level)
            .map_err(|_| AutoRstError::config(format!("Invalid log level: {}", self.log_level)))
    }

    pub fn root_heading(&self) -> Option<RootHeading> {
        match (&self.library_name, &self.library_heading) {
            (Some(library), Some(heading)) => Some(RootHeading::new(library, heading)),
            _ => None,
        }
    }
}

fn validate_prefix(prefix: &str) -> Result<()> {
    if !prefix.is_empty() && !prefix.ends_with('.') {
        return Err(AutoRstError::config(format!(
            "Name prefix must be empty or end with '.': {prefix:?}"
        )));
    }
    Ok(())
}

fn validate_extension(extension: &str) -> Result<()> {
    if extension.is_empty() || extension.contains('.') {
        return Err(AutoRstError::config(format!(
            "Source extension must be a bare extension such as \"py\": {extension:?}"
        )));
    }
    Ok(())
}

/// Parameters of one mirror invocation.
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub clean: bool,
    pub overwrite: bool,
    pub name_prefix: String,
    pub source_extension: String,
    pub root_heading: Option<RootHeading>,
}

impl MirrorOptions {
    pub fn new(source_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            output_root: output_root.into(),
            clean: false,
            overwrite: false,
            name_prefix: String::new(),
            source_extension: DEFAULT_SOURCE_EXTENSION.to_string(),
            root_heading: None,
        }
    }

    pub fn from_config(
        config: &Config,
        source_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name_prefix: config.name_prefix.clone(),
            source_extension: config.source_extension.clone(),
            root_heading: config.root_heading(),
            ..Self::new(source_root, output_root)
        }
    }

    pub fn clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    pub fn source_extension(mut self, extension: impl Into<String>) -> Self {
        self.source_extension = extension.into();
        self
    }

    pub fn root_heading(mut self, root_heading: Option<RootHeading>) -> Self {
        self.root_heading = root_heading;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_prefix(&self.name_prefix)?;
        validate_extension(&self.source_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.source_extension, "py");
        assert!(config.root_heading().is_none());
    }

    #[test]
    fn test_prefix_must_end_with_dot() {
        let config = Config {
            name_prefix: "org".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(AutoRstError::Config(_))));

        let config = Config {
            name_prefix: "org.".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_extension_validation() {
        let config = Config {
            source_extension: ".py".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            source_extension: String::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_library_heading_pairing() {
        let config = Config {
            library_name: Some("tianshou".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            library_name: Some("tianshou".to_string()),
            library_heading: Some("Tianshou API Reference".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(
            config.root_heading(),
            Some(RootHeading::new("tianshou", "Tianshou API Reference"))
        );
    }

    #[test]
    fn test_invalid_log_level() {
        let config = Config {
            log_level: "chatty".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_options_from_config() {
        let config = Config {
            name_prefix: "org.".to_string(),
            source_extension: "pyi".to_string(),
            ..Config::default()
        };
        let options = MirrorOptions::from_config(&config, "src/pkg", "docs/api").overwrite(true);

        assert_eq!(options.name_prefix, "org.");
        assert_eq!(options.source_extension, "pyi");
        assert!(options.overwrite);
        assert!(!options.clean);
        assert!(options.validate().is_ok());
    }
}
