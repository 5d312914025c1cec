#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::server::config::ServerConfig;

    fn parse(value: serde_json::Value) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.apply(serde_json::from_value(value).unwrap());
        config
    }

    #[test]
    fn test_empty_section_keeps_defaults() {
        assert_eq!(parse(serde_json::json!({})), ServerConfig::default());
    }

    #[test]
    fn test_camel_case_keys() {
        let config = parse(serde_json::json!({
            "inlayHints": { "enabled": true, "types": false },
            "formatting": { "command": "meson", "args": ["format", "-"] },
            "performance": { "debounceMs": 0, "maxConcurrent": 4 }
        }));
        assert!(!config.inlay_hints_types);
        assert!(config.inlay_hints_parameters);
        assert_eq!(config.formatter.command, "meson");
        assert_eq!(config.formatter.args, vec!["format", "-"]);
        assert_eq!(config.workspace_options().debounce, Duration::ZERO);
        assert_eq!(config.workspace_options().max_concurrent, 4);
    }

    #[test]
    fn test_disabled_inlay_hints() {
        let config = parse(serde_json::json!({ "inlayHints": { "enabled": false } }));
        assert!(config.inlay_hint_options().is_none());
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let config = parse(serde_json::json!({
            "formatting": { "command": "  " },
            "performance": { "maxConcurrent": 0 }
        }));
        assert_eq!(config.formatter.command, "muon");
        assert_eq!(config.max_concurrent, 2);
    }
}
