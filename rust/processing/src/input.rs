// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layout input acquisition.
//!
//! The pipeline only needs an immutable per-layer list of polygons, each a
//! flat `x0, y0, x1, y1, ...` coordinate list. Anything able to produce
//! that implements [`LayoutSource`]; a JSON document is the built-in form:
//!
//! ```json
//! { "layers": { "6": [[0, 0, 10, 0, 10, 10, 0, 10]], "42": [] } }
//! ```

use crate::error::InputError;
use polystack_geometry::LayerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Raw per-layer polygon lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutData {
    pub layers: BTreeMap<LayerId, Vec<Vec<f64>>>,
}

impl LayoutData {
    /// Parse a JSON layout document.
    pub fn from_json_str(json: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a JSON layout document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InputError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }
}

/// Fallible provider of layout data.
pub trait LayoutSource {
    /// Load every layer. An error here terminates the run.
    fn load(&self) -> Result<LayoutData, InputError>;

    /// Human-readable origin used in logs.
    fn describe(&self) -> String;
}

/// JSON layout file on disk.
#[derive(Debug, Clone)]
pub struct JsonLayoutFile {
    path: PathBuf,
}

impl JsonLayoutFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LayoutSource for JsonLayoutFile {
    fn load(&self) -> Result<LayoutData, InputError> {
        let file = File::open(&self.path).map_err(|source| InputError::Io {
            path: self.path.clone(),
            source,
        })?;
        let data = LayoutData::from_reader(BufReader::new(file))?;
        if data.layers.is_empty() {
            return Err(InputError::Empty);
        }
        Ok(data)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory layouts act as their own source.
impl LayoutSource for LayoutData {
    fn load(&self) -> Result<LayoutData, InputError> {
        if self.layers.is_empty() {
            return Err(InputError::Empty);
        }
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory layout ({} layers)", self.layers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layers_with_integer_keys() {
        let data = LayoutData::from_json_str(
            r#"{"layers": {"6": [[0, 0, 1, 0, 0, 1]], "-2": [[0, 0, 2, 0, 2, 2], [5, 5, 6, 5, 6, 6]]}}"#,
        )
        .unwrap();

        assert_eq!(data.layer_count(), 2);
        assert_eq!(data.polygon_count(), 3);
        assert_eq!(data.layers.keys().copied().collect::<Vec<_>>(), vec![-2, 6]);
        assert_eq!(data.layers[&6][0], vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(matches!(
            LayoutData::from_json_str("{\"layers\": [1, 2"),
            Err(InputError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = JsonLayoutFile::new("/nonexistent/polystack/layout.json");
        assert!(matches!(source.load(), Err(InputError::Io { .. })));
    }

    #[test]
    fn test_empty_in_memory_layout_is_error() {
        assert!(matches!(LayoutData::default().load(), Err(InputError::Empty)));
    }
}
