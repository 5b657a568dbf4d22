//! ONNX Runtime session loading shared by the backends.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use ort::session::Session;

use crate::error::ModelError;

/// A loaded ONNX session.
///
/// Uses a `Mutex` because `Session::run` requires `&mut self`; wrapped in an
/// `Arc` so inference can move onto the blocking pool.
#[derive(Clone)]
pub(crate) struct SharedSession {
    session: Arc<Mutex<Session>>,
    input_names: Arc<Vec<String>>,
}

impl SharedSession {
    pub(crate) fn load(model_path: &Path) -> Result<Self, ModelError> {
        if !model_path.exists() {
            return Err(ModelError::new(format!(
                "Model not found at {}. Run `pictag models download` first.",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| ModelError::new(format!("Failed to create ONNX session builder: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e| {
                ModelError::new(format!(
                    "Failed to load ONNX model {}: {e}",
                    model_path.display()
                ))
            })?;

        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|i| i.name().to_string())
            .collect();

        tracing::debug!(
            "Loaded ONNX model from {:?} (inputs: {:?}, outputs: {:?})",
            model_path,
            input_names,
            session
                .outputs()
                .iter()
                .map(|o| o.name())
                .collect::<Vec<_>>()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_names: Arc::new(input_names),
        })
    }

    /// Name of the first input, or `fallback` if the model declares none.
    pub(crate) fn first_input_or(&self, fallback: &str) -> String {
        self.input_names
            .first()
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }

    pub(crate) fn has_input(&self, name: &str) -> bool {
        self.input_names.iter().any(|n| n == name)
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Session>, ModelError> {
        self.session
            .lock()
            .map_err(|e| ModelError::new(format!("Session lock poisoned: {e}")))
    }
}

/// Run CPU-bound inference on tokio's blocking pool.
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, ModelError>
where
    F: FnOnce() -> Result<T, ModelError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ModelError::new(format!("Inference task join error: {e}")))?
}
