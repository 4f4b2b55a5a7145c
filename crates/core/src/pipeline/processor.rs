//! Graph-first image analysis with a direct fallback.
//!
//! The primary path routes the image through the analysis workflow. When it
//! fails for any reason, the same model is called once more directly,
//! bypassing the orchestration layer. There are no further retries.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::image::ImageFormat;
use crate::task::ProcessingMethod;
use crate::vision::{ImagePayload, VisionClient, VisionError, VisionRequest};
use crate::workflow::{node_fn, CompiledWorkflow, Workflow, WorkflowError, END, START};

const ANALYSIS_SYSTEM_PROMPT: &str =
    "You are a professional image analyst. Reply with what you see in the image.";
const ANALYSIS_USER_PROMPT: &str = "Describe the contents of this image.";

/// State keys threaded through the analysis workflow.
const STATE_IMAGE: &str = "image_base64";
const STATE_MIME: &str = "image_mime";
const STATE_ANALYSIS: &str = "analysis";

/// Result of a processing run.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// The model's analysis text, passed through verbatim.
    pub analysis: String,
    /// Which path produced the analysis.
    pub method: ProcessingMethod,
    /// Primary-path failure, kept when the fallback succeeded.
    pub graph_error: Option<String>,
}

/// Runs images through the analysis workflow with automatic fallback.
pub struct ImageProcessor {
    client: Arc<dyn VisionClient>,
    temperature: f32,
}

impl ImageProcessor {
    pub fn new(client: Arc<dyn VisionClient>) -> Self {
        Self {
            client,
            temperature: 0.3,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Analyze an image: workflow first, one direct call on workflow failure.
    ///
    /// An error here means both paths failed; the returned error is the
    /// direct call's, with the workflow failure already logged.
    pub async fn process(&self, image: ImagePayload) -> Result<ProcessOutcome, VisionError> {
        match self.run_workflow(&image).await {
            Ok(analysis) => Ok(ProcessOutcome {
                analysis,
                method: ProcessingMethod::Graph,
                graph_error: None,
            }),
            Err(graph_error) => {
                warn!(%graph_error, "analysis workflow failed, falling back to direct call");
                let analysis = self.analyze(image).await?;
                Ok(ProcessOutcome {
                    analysis,
                    method: ProcessingMethod::Fallback,
                    graph_error: Some(graph_error.to_string()),
                })
            }
        }
    }

    /// Analyze an image with a single direct call, no orchestration.
    pub async fn process_direct(&self, image: ImagePayload) -> Result<ProcessOutcome, VisionError> {
        let analysis = self.analyze(image).await?;
        Ok(ProcessOutcome {
            analysis,
            method: ProcessingMethod::Direct,
            graph_error: None,
        })
    }

    async fn run_workflow(&self, image: &ImagePayload) -> Result<String, WorkflowError> {
        let workflow = self.build_analysis_workflow()?;
        let state = json!({
            STATE_IMAGE: image.base64_data(),
            STATE_MIME: image.format().mime_type(),
        });
        let out = workflow.run(state).await?;

        out[STATE_ANALYSIS]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| WorkflowError::node("analyze", "workflow produced no analysis"))
    }

    /// The analysis workflow: `prepare` normalizes the image state, then
    /// `analyze` invokes the model.
    fn build_analysis_workflow(&self) -> Result<CompiledWorkflow, WorkflowError> {
        let client = Arc::clone(&self.client);
        let temperature = self.temperature;

        let prepare = node_fn(|mut state| async move {
            let has_image = state[STATE_IMAGE].as_str().is_some_and(|s| !s.is_empty());
            if !has_image {
                return Err(WorkflowError::node("prepare", "no image provided"));
            }
            // Unknown or absent MIME types default to JPEG, the most common
            // upload format.
            let format = state[STATE_MIME]
                .as_str()
                .and_then(ImageFormat::from_content_type)
                .unwrap_or(ImageFormat::Jpeg);
            state[STATE_MIME] = json!(format.mime_type());
            Ok(state)
        });

        let analyze = node_fn(move |mut state| {
            let client = Arc::clone(&client);
            async move {
                let base64_data = state[STATE_IMAGE]
                    .as_str()
                    .ok_or_else(|| WorkflowError::node("analyze", "no image in state"))?
                    .to_string();
                let format = state[STATE_MIME]
                    .as_str()
                    .and_then(ImageFormat::from_content_type)
                    .unwrap_or(ImageFormat::Jpeg);

                let request = VisionRequest::new(ANALYSIS_USER_PROMPT)
                    .with_system(ANALYSIS_SYSTEM_PROMPT)
                    .with_image(ImagePayload::from_base64(base64_data, format))
                    .with_temperature(temperature);

                let response = client
                    .complete(request)
                    .await
                    .map_err(|e| WorkflowError::node("analyze", e.to_string()))?;

                state[STATE_ANALYSIS] = json!(response.text);
                Ok(state)
            }
        });

        Workflow::new()
            .add_node("prepare", prepare)
            .add_node("analyze", analyze)
            .add_edge(START, "prepare")
            .add_edge("prepare", "analyze")
            .add_edge("analyze", END)
            .compile()
    }

    async fn analyze(&self, image: ImagePayload) -> Result<String, VisionError> {
        let request = VisionRequest::new(ANALYSIS_USER_PROMPT)
            .with_system(ANALYSIS_SYSTEM_PROMPT)
            .with_image(image)
            .with_temperature(self.temperature);

        let response = self.client.complete(request).await?;
        if response.text.is_empty() {
            return Err(VisionError::EmptyResponse);
        }
        Ok(response.text)
    }
}
