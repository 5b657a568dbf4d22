//! Class labels from a Hugging Face `config.json` (`id2label`).

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::ModelError;

/// Upper bound on class ids; real label tables stay in the low thousands.
const MAX_LABEL_ID: usize = 1 << 16;

#[derive(Deserialize)]
struct ModelConfigFile {
    id2label: HashMap<String, String>,
}

/// Index-addressed label table.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    labels: Vec<String>,
}

impl Labels {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ModelError::new(format!("Failed to read {}: {e}", path.display())))?;
        Self::from_config_json(&content)
            .map_err(|e| ModelError::new(format!("{}: {}", path.display(), e.message())))
    }

    pub fn from_config_json(content: &str) -> Result<Self, ModelError> {
        let file: ModelConfigFile = serde_json::from_str(content)
            .map_err(|e| ModelError::new(format!("Invalid model config: {e}")))?;

        let mut indexed = Vec::with_capacity(file.id2label.len());
        for (id, label) in file.id2label {
            let index: usize = id
                .parse()
                .map_err(|_| ModelError::new(format!("Non-numeric label id {id:?}")))?;
            if index >= MAX_LABEL_ID {
                return Err(ModelError::new(format!(
                    "Label id {index} exceeds the limit of {MAX_LABEL_ID}"
                )));
            }
            indexed.push((index, label));
        }

        let size = indexed.iter().map(|(i, _)| i + 1).max().unwrap_or(0);
        let mut labels = vec![String::new(); size];
        for (index, label) in indexed {
            labels[index] = label;
        }

        Ok(Self { labels })
    }

    /// Label for a class index, or `None` if the index is unknown or the
    /// label is blank.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels
            .get(index)
            .map(String::as_str)
            .filter(|label| !label.is_empty())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
