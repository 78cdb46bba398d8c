//! Collaboration pipeline: gather, analyze, synthesize.
//!
//! Three strictly ordered stages over the completion backend. Gather fans
//! out one sub-task per configured facet and joins them at a barrier before
//! analysis starts; analysis output feeds a single synthesis call. Each
//! stage may retry once on a transient failure, after which the stage error
//! is promoted to a fatal [`OrchestratorError::Pipeline`] and the executor
//! falls back to a direct reply.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::config::CollabConfig;
use crate::error::OrchestratorError;
use crate::providers::CompletionClient;
use crate::sessions::ConversationContext;
use crate::workflow::TaskType;

/// Result of a collaboration run. `degraded` marks the single-call path
/// taken when the engine is disabled.
#[derive(Debug, Clone)]
pub struct CollaborationOutcome {
    pub text: String,
    pub degraded: bool,
}

pub struct Coordinator {
    client: Arc<dyn CompletionClient>,
    config: CollabConfig,
}

impl Coordinator {
    pub fn new(client: Arc<dyn CompletionClient>, config: CollabConfig) -> Self {
        Self { client, config }
    }

    /// Whether the multi-stage engine is enabled. When false,
    /// [`coordinate`](Self::coordinate) takes the degraded single-call path.
    pub fn is_available(&self) -> bool {
        self.config.engine_enabled
    }

    pub async fn coordinate(
        &self,
        query: &str,
        context: &ConversationContext,
        task_type: TaskType,
    ) -> Result<CollaborationOutcome, OrchestratorError> {
        let topics_hint = topics_hint(context);

        if !self.is_available() {
            tracing::info!(task_type = task_type.as_str(), "collaboration engine disabled, answering directly");
            let prompt = format!("Answer directly and concisely{topics_hint}: {query}");
            let text = self.timed_complete("collab direct", &prompt).await?;
            return Ok(CollaborationOutcome {
                text,
                degraded: true,
            });
        }

        tracing::info!(
            task_type = task_type.as_str(),
            facets = self.config.gather_facets.len(),
            "starting collaboration pipeline"
        );

        let findings = self
            .run_stage("gather", || self.gather_once(query, &topics_hint))
            .await?;
        let analysis = self
            .run_stage("analyze", || self.analyze_once(query, &findings, task_type))
            .await?;
        let synthesis = self
            .run_stage("synthesize", || self.synthesize_once(query, &analysis))
            .await?;

        let bullets = analysis
            .iter()
            .map(|line| format!("- {}", line.replace('\n', " ")))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(CollaborationOutcome {
            text: format!("{synthesis}\n\nKey findings:\n{bullets}"),
            degraded: false,
        })
    }

    /// Run one stage, retrying a single time on a transient failure. A
    /// second failure is promoted to a fatal pipeline error so later stages
    /// never run on partial input.
    async fn run_stage<T, F, Fut>(
        &self,
        stage: &'static str,
        mut attempt: F,
    ) -> Result<T, OrchestratorError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, OrchestratorError>>,
    {
        let err = match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() => {
                tracing::warn!(stage, reason = err.reason_code(), "stage failed, retrying once");
                match attempt().await {
                    Ok(value) => return Ok(value),
                    Err(err) => err,
                }
            }
            Err(err) => err,
        };
        Err(OrchestratorError::Pipeline {
            stage: stage.to_string(),
            message: err.to_string(),
        })
    }

    /// One gather attempt: every facet runs concurrently and the stage
    /// resolves only once all sub-tasks settle.
    async fn gather_once(
        &self,
        query: &str,
        topics_hint: &str,
    ) -> Result<Vec<String>, OrchestratorError> {
        let prompts: Vec<String> = self
            .config
            .gather_facets
            .iter()
            .map(|facet| {
                format!("Collect information on {facet} for the request{topics_hint}: {query}")
            })
            .collect();
        let results = join_all(
            prompts
                .iter()
                .map(|prompt| self.timed_complete("collab gather", prompt)),
        )
        .await;
        results.into_iter().collect()
    }

    async fn analyze_once(
        &self,
        query: &str,
        findings: &[String],
        task_type: TaskType,
    ) -> Result<Vec<String>, OrchestratorError> {
        let corpus = findings.join("\n---\n");
        let angles: [String; 2] = match task_type {
            TaskType::Research => [
                format!("Identify the patterns and trends relevant to '{query}' in these findings:\n{corpus}"),
                format!("Draw out the strategic implications of these findings for '{query}':\n{corpus}"),
            ],
            TaskType::Analysis => [
                format!("Break down the data and patterns relevant to '{query}' in these findings:\n{corpus}"),
                format!("List the risks, opportunities, and recommendations for '{query}' given these findings:\n{corpus}"),
            ],
        };
        let results = join_all(
            angles
                .iter()
                .map(|prompt| self.timed_complete("collab analyze", prompt)),
        )
        .await;
        results.into_iter().collect()
    }

    async fn synthesize_once(
        &self,
        query: &str,
        analysis: &[String],
    ) -> Result<String, OrchestratorError> {
        let prompt = format!(
            "Synthesize a final answer to '{query}' from this analysis:\n{}",
            analysis.join("\n---\n")
        );
        self.timed_complete("collab synthesize", &prompt).await
    }

    async fn timed_complete(
        &self,
        operation: &'static str,
        prompt: &str,
    ) -> Result<String, OrchestratorError> {
        let timeout = Duration::from_secs(self.config.call_timeout_secs);
        match tokio::time::timeout(timeout, self.client.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(OrchestratorError::Timeout {
                operation: operation.to_string(),
                seconds: self.config.call_timeout_secs,
            }),
        }
    }
}

fn topics_hint(context: &ConversationContext) -> String {
    if context.recent_topics.is_empty() {
        String::new()
    } else {
        format!(
            " (recent topics: {})",
            context.recent_topics.join(", ")
        )
    }
}
