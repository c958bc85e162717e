//! Program images in their text form: base-10 integers separated by commas,
//! spread over any number of lines.

use crate::machine::Machine;
use std::fs;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}, field {field}: invalid integer {text:?}: {source}")]
    InvalidValue {
        line: usize,
        field: usize,
        text: String,
        #[source]
        source: ParseIntError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    image: Vec<i64>,
}

impl Program {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProgramError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ProgramError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        text.parse()
    }

    pub fn image(&self) -> &[i64] {
        &self.image
    }

    pub fn into_image(self) -> Vec<i64> {
        self.image
    }

    pub fn len(&self) -> usize {
        self.image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }

    /// Fresh machine loaded with a copy of this image.
    pub fn machine(&self, inputs: impl IntoIterator<Item = i64>) -> Machine {
        Machine::new(self.image.clone(), inputs)
    }
}

impl From<Vec<i64>> for Program {
    fn from(image: Vec<i64>) -> Self {
        Self { image }
    }
}

impl FromStr for Program {
    type Err = ProgramError;

    /// Empty fields are skipped, so trailing commas and blank lines are fine.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut image = Vec::new();
        for (line_idx, line) in text.lines().enumerate() {
            for (field_idx, field) in line.split(',').enumerate() {
                let field = field.trim();
                if field.is_empty() {
                    continue;
                }
                let value = field
                    .parse::<i64>()
                    .map_err(|source| ProgramError::InvalidValue {
                        line: line_idx + 1,
                        field: field_idx + 1,
                        text: field.to_string(),
                        source,
                    })?;
                image.push(value);
            }
        }
        Ok(Self { image })
    }
}
