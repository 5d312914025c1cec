use std::{
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use dashmap::DashMap;
use meson_core::diagnostic::{Diagnostic, Severity};
use once_cell::sync::OnceCell;
use ropey::Rope;
use tower_lsp::{
    Client,
    lsp_types::{self, DiagnosticSeverity, Url},
};

use super::config::ServerConfig;
use crate::{
    features::{DocLookup, NoDocs, to_range},
    workspace::{DiagnosticsSink, WorkspaceHandle},
};

/// An open build file as the editor currently has it.
#[derive(Debug, Default)]
pub(crate) struct Document {
    pub(crate) content: Rope,
    pub(crate) version: i32,
}

/// Primary LSP server state shared across handlers.
pub(crate) struct MesonLanguageServer {
    pub(crate) client: Client,
    pub(crate) documents: DashMap<Url, Document>,
    pub(crate) config: Mutex<ServerConfig>,
    /// Set once `initialize` knows the project root.
    pub(crate) workspace: OnceCell<WorkspaceHandle>,
    pub(crate) docs: Arc<dyn DocLookup>,
}

impl MesonLanguageServer {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: DashMap::new(),
            config: Mutex::new(ServerConfig::default()),
            workspace: OnceCell::new(),
            docs: Arc::new(NoDocs),
        }
    }

    pub(crate) fn config(&self) -> MutexGuard<'_, ServerConfig> {
        match self.config.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Current buffer text of an open document.
    pub(crate) fn document_text(&self, uri: &Url) -> Option<String> {
        self.documents.get(uri).map(|doc| doc.content.to_string())
    }
}

/// Publishes committed diagnostics to the editor.
pub(crate) struct ClientSink {
    pub(crate) client: Client,
}

pub(crate) fn to_lsp_diagnostic(diagnostic: &Diagnostic) -> lsp_types::Diagnostic {
    let severity = match diagnostic.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Information => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    };
    lsp_types::Diagnostic {
        range: to_range(diagnostic.span),
        severity: Some(severity),
        source: Some("meson".to_string()),
        message: diagnostic.message.clone(),
        ..Default::default()
    }
}

#[tower_lsp::async_trait]
impl DiagnosticsSink for ClientSink {
    async fn publish(&self, file: &Path, diagnostics: &[Diagnostic]) {
        let Ok(uri) = Url::from_file_path(file) else {
            tracing::warn!("cannot publish diagnostics for {}", file.display());
            return;
        };
        let diagnostics = diagnostics.iter().map(to_lsp_diagnostic).collect();
        self.client.publish_diagnostics(uri, diagnostics, None).await;
    }
}
