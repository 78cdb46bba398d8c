pub mod schema;

pub use schema::{
    CollabConfig, Config, ProviderConfig, RoutingConfig, ToolIntentRule, WorkflowConfig,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reexported_config_default_is_constructible() {
        let config = Config::default();

        assert_eq!(config.provider.name, "openai");
        assert!(config.workflow.max_retries > 0);
        assert!(config.routing.long_query_chars > 0);
    }
}
