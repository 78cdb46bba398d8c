use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ── Top-level config ──────────────────────────────────────────────

/// Top-level Maestro configuration, loaded from `maestro.toml`.
///
/// Every section is optional in the file; missing sections fall back to the
/// defaults below. The router's priority-rule structure is the contract;
/// thresholds and keyword lists here are tuning values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Completion provider settings (`[provider]`).
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Router thresholds and keyword lists (`[routing]`).
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Graph executor and retry budgets (`[workflow]`).
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Collaboration pipeline settings (`[collab]`).
    #[serde(default)]
    pub collab: CollabConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            routing: RoutingConfig::default(),
            workflow: WorkflowConfig::default(),
            collab: CollabConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing sections.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents).context("Failed to parse config file")
    }
}

/// Completion provider configuration (`[provider]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider ID (e.g. `"openai"`). Default: `"openai"`.
    #[serde(default = "default_provider_name")]
    pub name: String,
    /// API key. Overridden by the `MAESTRO_API_KEY` env var.
    pub api_key: Option<String>,
    /// Base URL override (e.g. a local OpenAI-compatible gateway).
    pub api_url: Option<String>,
    /// Model routed through the provider. Default: `"gpt-4o-mini"`.
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-call deadline in seconds. A timeout classifies as transient.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            api_key: None,
            api_url: None,
            model: default_model(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

fn default_provider_name() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_call_timeout_secs() -> u64 {
    30
}

/// A phrase table entry mapping direct-capability phrases to a named tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolIntentRule {
    /// Registered tool name (e.g. `"system_info"`).
    pub tool: String,
    /// Phrases that unambiguously select this tool (matched case-insensitively).
    pub phrases: Vec<String>,
}

/// Router configuration (`[routing]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Direct-capability phrase table, checked before any other rule.
    #[serde(default = "default_tool_intents")]
    pub tool_intents: Vec<ToolIntentRule>,
    /// Keywords signalling open-ended research.
    #[serde(default = "default_research_keywords")]
    pub research_keywords: Vec<String>,
    /// Keywords signalling data/pattern analysis.
    #[serde(default = "default_analysis_keywords")]
    pub analysis_keywords: Vec<String>,
    /// Queries longer than this (chars) count as open-ended. Default: `220`.
    #[serde(default = "default_long_query_chars")]
    pub long_query_chars: usize,
    /// Minimum question marks for a query to count as multi-part. Default: `2`.
    #[serde(default = "default_multi_part_questions")]
    pub multi_part_questions: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            tool_intents: default_tool_intents(),
            research_keywords: default_research_keywords(),
            analysis_keywords: default_analysis_keywords(),
            long_query_chars: default_long_query_chars(),
            multi_part_questions: default_multi_part_questions(),
        }
    }
}

fn default_tool_intents() -> Vec<ToolIntentRule> {
    vec![
        ToolIntentRule {
            tool: "system_info".to_string(),
            phrases: vec!["system info".to_string(), "system status".to_string()],
        },
        ToolIntentRule {
            tool: "website_summarize".to_string(),
            phrases: vec![
                "summarize website".to_string(),
                "summarize this website".to_string(),
                "summarize the website".to_string(),
            ],
        },
        ToolIntentRule {
            tool: "video_summarize".to_string(),
            phrases: vec![
                "summarize video".to_string(),
                "summarize this video".to_string(),
                "summarize the video".to_string(),
            ],
        },
        ToolIntentRule {
            tool: "music_generate".to_string(),
            phrases: vec!["generate music".to_string(), "compose music".to_string()],
        },
        ToolIntentRule {
            tool: "write_assist".to_string(),
            phrases: vec!["write a draft".to_string(), "draft an article".to_string()],
        },
    ]
}

fn default_research_keywords() -> Vec<String> {
    ["research", "investigate", "study", "explore", "examine"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_analysis_keywords() -> Vec<String> {
    [
        "analysis",
        "analyze",
        "pattern",
        "insight",
        "recommendation",
        "strategy",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_long_query_chars() -> usize {
    220
}

fn default_multi_part_questions() -> usize {
    2
}

/// Graph executor configuration (`[workflow]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Retry budget shared across all node types in one turn. Default: `3`.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Extra ROUTE passes allowed beyond the retry budget. Default: `3`.
    #[serde(default = "default_route_slack")]
    pub route_slack: u32,
    /// First backoff delay in milliseconds. Default: `250`.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Backoff ceiling in milliseconds. Default: `5000`.
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,
    /// FIFO capacity for recent topics and insights. Default: `10`.
    #[serde(default = "default_memory_cap")]
    pub memory_cap: usize,
    /// Maximum history turns retained per session. Default: `50`.
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            route_slack: default_route_slack(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
            memory_cap: default_memory_cap(),
            history_cap: default_history_cap(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_route_slack() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    250
}

fn default_backoff_cap_ms() -> u64 {
    5000
}

fn default_memory_cap() -> usize {
    10
}

fn default_history_cap() -> usize {
    50
}

/// Collaboration pipeline configuration (`[collab]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollabConfig {
    /// When false the coordinator degrades to a single direct completion.
    #[serde(default = "default_engine_enabled")]
    pub engine_enabled: bool,
    /// Per-sub-task deadline in seconds. Default: `30`.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    /// Facets gathered concurrently in the first stage.
    #[serde(default = "default_gather_facets")]
    pub gather_facets: Vec<String>,
}

impl Default for CollabConfig {
    fn default() -> Self {
        Self {
            engine_enabled: default_engine_enabled(),
            call_timeout_secs: default_call_timeout_secs(),
            gather_facets: default_gather_facets(),
        }
    }
}

fn default_engine_enabled() -> bool {
    true
}

fn default_gather_facets() -> Vec<String> {
    [
        "background and key facts",
        "current developments",
        "notable perspectives and open questions",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}
