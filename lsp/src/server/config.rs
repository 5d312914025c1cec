use std::time::Duration;

use serde::Deserialize;
use tower_lsp::lsp_types::ConfigurationItem;

use super::state::MesonLanguageServer;
use crate::{
    features::{ExternalFormatter, InlayHintOptions},
    workspace::WorkspaceOptions,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServerConfig {
    pub(crate) inlay_hints_enabled: bool,
    pub(crate) inlay_hints_parameters: bool,
    pub(crate) inlay_hints_types: bool,
    pub(crate) formatter: ExternalFormatter,
    pub(crate) debounce_ms: u64,
    pub(crate) max_concurrent: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            inlay_hints_enabled: true,
            inlay_hints_parameters: true,
            inlay_hints_types: true,
            formatter: ExternalFormatter::default(),
            debounce_ms: 100,
            max_concurrent: 2,
        }
    }
}

impl ServerConfig {
    pub(crate) fn inlay_hint_options(&self) -> Option<InlayHintOptions> {
        self.inlay_hints_enabled.then_some(InlayHintOptions {
            types: self.inlay_hints_types,
            parameters: self.inlay_hints_parameters,
        })
    }

    pub(crate) fn workspace_options(&self) -> WorkspaceOptions {
        WorkspaceOptions {
            debounce: Duration::from_millis(self.debounce_ms),
            max_concurrent: self.max_concurrent.max(1),
        }
    }

    /// Overlay the values present in a client section onto `self`.
    pub(crate) fn apply(&mut self, section: MesonLspConfigSection) {
        self.inlay_hints_enabled = section.inlay_hints.enabled.unwrap_or(true);
        self.inlay_hints_parameters = section.inlay_hints.parameters.unwrap_or(true);
        self.inlay_hints_types = section.inlay_hints.types.unwrap_or(true);

        if let Some(command) = section.formatting.command.filter(|c| !c.trim().is_empty()) {
            self.formatter.command = command;
        }
        if let Some(args) = section.formatting.args {
            self.formatter.args = args;
        }
        if let Some(v) = section.performance.debounce_ms {
            self.debounce_ms = v;
        }
        if let Some(v) = section.performance.max_concurrent.filter(|v| *v > 0) {
            self.max_concurrent = v;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MesonLspConfigSection {
    #[serde(default)]
    inlay_hints: InlayHintsConfig,
    #[serde(default)]
    formatting: FormattingConfig,
    #[serde(default)]
    performance: PerformanceConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct InlayHintsConfig {
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    parameters: Option<bool>,
    #[serde(default)]
    types: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FormattingConfig {
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PerformanceConfig {
    #[serde(default)]
    debounce_ms: Option<u64>,
    #[serde(default)]
    max_concurrent: Option<usize>,
}

impl MesonLanguageServer {
    pub(crate) async fn load_config(&self) {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some("mesonlsp".to_string()),
        }];

        let Ok(values) = self.client.configuration(items).await else {
            return;
        };
        let Some(value) = values.into_iter().next().filter(|v| !v.is_null()) else {
            return;
        };
        let section = match serde_json::from_value::<MesonLspConfigSection>(value) {
            Ok(section) => section,
            Err(e) => {
                tracing::warn!("ignoring malformed mesonlsp settings: {}", e);
                return;
            }
        };

        let options = {
            let mut guard = match self.config.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.apply(section);
            guard.workspace_options()
        };
        if let Some(handle) = self.workspace.get() {
            handle.workspace().configure(options);
        }
    }
}
