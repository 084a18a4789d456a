//! Loading of tuning overrides from TOML files.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use whack_core::{Tuning, TuningError};

/// Reasons a tuning file may be rejected.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("failed to read tuning file {}", path.display())]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid TOML or names unknown fields.
    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The values parsed but describe an unplayable game.
    #[error("invalid tuning: {0}")]
    Invalid(#[from] TuningError),
}

/// Reads and validates the tuning stored at `path`.
pub(crate) fn load_tuning(path: &Path) -> Result<Tuning, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let tuning = parse_tuning(&contents)?;
    log::info!("loaded tuning overrides from {}", path.display());
    Ok(tuning)
}

/// Parses tuning overrides; omitted fields keep their classic values.
pub(crate) fn parse_tuning(contents: &str) -> Result<Tuning, ConfigError> {
    let tuning: Tuning = toml::from_str(contents)?;
    if let Err(error) = tuning.validate() {
        log::warn!("rejecting tuning: {error}");
        return Err(error.into());
    }
    Ok(tuning)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_classic_tuning() {
        let tuning = parse_tuning("").expect("empty overrides are valid");

        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn partial_overrides_keep_remaining_defaults() {
        let tuning = parse_tuning(
            r#"
            round_limit = 10
            friendly_chance = 0.25
            reveal_thresholds = [2, 6]
            "#,
        )
        .expect("overrides are valid");

        assert_eq!(tuning.round_limit, 10);
        assert!((tuning.friendly_chance - 0.25).abs() < f64::EPSILON);
        assert_eq!(tuning.reveal_thresholds, vec![2, 6]);
        assert!((tuning.spawn_interval_decay - 0.991).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = parse_tuning("spawn_speed = 3.0").expect_err("unknown field must fail");

        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn unplayable_values_are_rejected() {
        let error = parse_tuning("spawn_interval_decay = 1.5").expect_err("decay above one");

        assert!(matches!(
            error,
            ConfigError::Invalid(TuningError::DecayOutOfRange { .. })
        ));

        let error = parse_tuning("reveal_thresholds = [4, 13]").expect_err("threshold too high");
        assert!(matches!(
            error,
            ConfigError::Invalid(TuningError::InvalidThresholds { draw_max: 12 })
        ));

        let error =
            parse_tuning("initial_spawn_interval_secs = 1e30").expect_err("interval too long");
        assert!(matches!(
            error,
            ConfigError::Invalid(TuningError::DurationOutOfRange {
                field: "initial_spawn_interval_secs"
            })
        ));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let path = std::env::temp_dir().join("whack-a-penguin-missing-tuning.toml");

        let error = load_tuning(&path).expect_err("missing file must fail");

        assert!(matches!(error, ConfigError::Read { .. }));
        assert!(error.to_string().contains("whack-a-penguin-missing-tuning.toml"));
    }

    #[test]
    fn file_contents_are_loaded() {
        let path = std::env::temp_dir().join(format!(
            "whack-a-penguin-tuning-{}.toml",
            std::process::id()
        ));
        fs::write(&path, "first_wave_delay_secs = 2.5\n").expect("temp file is writable");

        let loaded = load_tuning(&path);
        let _ = fs::remove_file(&path);

        let tuning = loaded.expect("file parses");
        assert!((tuning.first_wave_delay_secs - 2.5).abs() < f64::EPSILON);
    }
}
