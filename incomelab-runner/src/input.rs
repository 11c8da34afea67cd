//! Cycle input files (JSON).

use std::io;
use std::path::{Path, PathBuf};

use incomelab_core::CycleInput;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse cycle input: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn load_input(path: &Path) -> Result<CycleInput, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_input(&content)
}

pub fn parse_input(json: &str) -> Result<CycleInput, InputError> {
    Ok(serde_json::from_str(json)?)
}

/// Write an input file as pretty JSON, creating parent directories.
pub fn save_input(path: &Path, input: &CycleInput) -> Result<(), InputError> {
    let json = serde_json::to_string_pretty(input)?;
    let io_err = |source| InputError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, json).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_input_parses() {
        let input = parse_input(
            r#"{
                "instruments": [
                    {"ticker": "QDTE", "price_14d": 40.1, "price_28d": 39.5, "monthly_income": 143.0}
                ],
                "sentiment": {"QDTE": {"score": 0.3, "label": "positive"}},
                "indicators": {"breadth": 0.7}
            }"#,
        )
        .unwrap();
        assert_eq!(input.instruments.len(), 1);
        assert_eq!(input.sentiment["QDTE"].score, 0.3);
        assert_eq!(input.indicators.breadth, Some(0.7));
        assert_eq!(input.indicators.volatility, None);
        assert!(input.as_of.is_none());
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        assert!(matches!(
            parse_input(r#"{"instruments": 3}"#),
            Err(InputError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_input(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("here.json"));
    }
}
