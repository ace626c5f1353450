// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::path::Path;

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::audio::format::{MAX_SAMPLING_RATE, MIN_SAMPLING_RATE};
use crate::audio::{NumBits, ReaderOptions, SamplingRateLimits};
use crate::numeric::LargeBcd;

mod error;

pub use error::ConfigError;

/// Prefix of environment variables that override settings, e.g.
/// `OUTOFPHASE_IMPORT__ALLOW_TRUNCATED=true`.
pub const ENV_PREFIX: &str = "OUTOFPHASE";

/// Settings for importing and exporting audio files.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    import: ImportSettings,
    export: ExportSettings,
}

/// Settings that control how files are decoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Zero-pad short sound data instead of failing.
    allow_truncated: bool,
    min_sampling_rate: u32,
    max_sampling_rate: u32,
}

impl Default for ImportSettings {
    fn default() -> Self {
        ImportSettings {
            allow_truncated: false,
            min_sampling_rate: MIN_SAMPLING_RATE,
            max_sampling_rate: MAX_SAMPLING_RATE,
        }
    }
}

/// Settings that control how files are written.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    bits: NumBits,
    /// Gain applied to every sample before quantization.
    volume_scaling: LargeBcd,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            bits: NumBits::Sixteen,
            volume_scaling: LargeBcd::from_raw(LargeBcd::SCALE),
        }
    }
}

impl Settings {
    /// Loads settings from an optional YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        Self::load_with_environment(path, environment())
    }

    fn load_with_environment(
        path: Option<&Path>,
        environment: Environment,
    ) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        Self::from_builder(builder.add_source(environment))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
        let settings = builder.build()?.try_deserialize::<Settings>()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = (
            self.import.min_sampling_rate,
            self.import.max_sampling_rate,
        );
        if min == 0 || min > max {
            return Err(ConfigError::InvalidSamplingRateLimits { min, max });
        }
        Ok(())
    }

    pub fn import(&self) -> &ImportSettings {
        &self.import
    }

    pub fn export(&self) -> &ExportSettings {
        &self.export
    }

    /// The decoder options described by the import settings.
    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            allow_truncated: self.import.allow_truncated,
            sampling_rate_limits: SamplingRateLimits {
                min: self.import.min_sampling_rate,
                max: self.import.max_sampling_rate,
            },
        }
    }
}

impl ImportSettings {
    pub fn allow_truncated(&self) -> bool {
        self.allow_truncated
    }
}

impl ExportSettings {
    pub fn bits(&self) -> NumBits {
        self.bits
    }

    pub fn volume_scaling(&self) -> LargeBcd {
        self.volume_scaling
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use config::{FileFormat, Map};

    use super::*;

    fn from_yaml(yaml: &str) -> Result<Settings, ConfigError> {
        Settings::from_builder(
            Config::builder().add_source(File::from_str(yaml, FileFormat::Yaml)),
        )
    }

    #[test]
    fn test_defaults() {
        let settings = from_yaml("").unwrap();
        assert!(!settings.import().allow_truncated());
        assert_eq!(settings.export().bits(), NumBits::Sixteen);
        assert_eq!(settings.export().volume_scaling().to_f64(), 1.0);

        let options = settings.reader_options();
        assert!(!options.allow_truncated);
        assert_eq!(options.sampling_rate_limits, SamplingRateLimits::default());
    }

    #[test]
    fn test_settings_deserialize() {
        let yaml = r#"
            import:
              allow_truncated: true
              min_sampling_rate: 8000
              max_sampling_rate: 96000
            export:
              bits: 24
              volume_scaling: "0.5"
        "#;

        let settings = from_yaml(yaml).unwrap();
        assert!(settings.import().allow_truncated());
        assert_eq!(settings.export().bits(), NumBits::TwentyFour);
        assert_eq!(settings.export().volume_scaling().raw(), 500_000);

        let options = settings.reader_options();
        assert!(options.allow_truncated);
        assert_eq!(options.sampling_rate_limits.min, 8000);
        assert_eq!(options.sampling_rate_limits.max, 96000);
    }

    #[test]
    fn test_volume_scaling_accepts_numbers() {
        let settings = from_yaml("export:\n  volume_scaling: 1.25\n").unwrap();
        assert_eq!(settings.export().volume_scaling().raw(), 1_250_000);

        let settings = from_yaml("export:\n  volume_scaling: 2\n").unwrap();
        assert_eq!(settings.export().volume_scaling().raw(), 2_000_000);

        assert!(from_yaml("export:\n  volume_scaling: loud\n").is_err());
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            from_yaml("export:\n  bits: 20\n"),
            Err(ConfigError::Load(_))
        ));
        assert!(matches!(
            from_yaml("import:\n  min_sampling_rate: 48000\n  max_sampling_rate: 44100\n"),
            Err(ConfigError::InvalidSamplingRateLimits {
                min: 48000,
                max: 44100
            })
        ));
        assert!(matches!(
            from_yaml("import:\n  min_sampling_rate: 0\n"),
            Err(ConfigError::InvalidSamplingRateLimits { min: 0, .. })
        ));
    }

    #[test]
    fn test_environment_overrides_file() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("outofphase.yaml");
        fs::write(
            &path,
            "import:\n  allow_truncated: false\nexport:\n  bits: 8\n",
        )
        .unwrap();

        let mut env = Map::new();
        env.insert(
            "OUTOFPHASE_IMPORT__ALLOW_TRUNCATED".to_string(),
            "true".to_string(),
        );
        env.insert(
            "OUTOFPHASE_EXPORT__VOLUME_SCALING".to_string(),
            "0.25".to_string(),
        );

        let settings =
            Settings::load_with_environment(Some(path.as_path()), environment().source(Some(env)))
                .unwrap();
        assert!(settings.import().allow_truncated());
        assert_eq!(settings.export().bits(), NumBits::Eight);
        assert_eq!(settings.export().volume_scaling().raw(), 250_000);
    }

    #[test]
    fn test_missing_file() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("missing.yaml");
        let result = Settings::load_with_environment(
            Some(path.as_path()),
            environment().source(Some(Map::new())),
        );
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
