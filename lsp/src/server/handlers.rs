use std::{path::PathBuf, sync::Arc};

use ropey::Rope;
use tower_lsp::{
    LanguageServer,
    jsonrpc::{Error, Result},
    lsp_types::{
        request::{GotoDeclarationParams, GotoDeclarationResponse},
        *,
    },
};
use tracing::{debug, info, warn};

use super::{
    state::{ClientSink, Document, MesonLanguageServer},
    text::apply_incremental_change_rope,
    utils::url_to_path,
};
use crate::{
    features::{self, to_range},
    project::MesonTree,
    workspace::{Signal, Workspace, WorkspaceHandle},
};

fn build_file_operations() -> FileOperationRegistrationOptions {
    FileOperationRegistrationOptions {
        filters: vec![FileOperationFilter {
            scheme: Some("file".to_string()),
            pattern: FileOperationPattern {
                glob: "**/meson.build".to_string(),
                matches: Some(FileOperationPatternKind::File),
                options: None,
            },
        }],
    }
}

fn file_uris_to_paths<'a>(uris: impl Iterator<Item = &'a str>) -> Vec<PathBuf> {
    uris.filter_map(|uri| Url::parse(uri).ok())
        .filter_map(|url| url_to_path(&url))
        .collect()
}

impl MesonLanguageServer {
    fn send(&self, signal: Signal) {
        match self.workspace.get() {
            Some(handle) => {
                debug!("signal {}", signal.name());
                handle.send(signal);
            }
            None => debug!("no workspace yet, dropping {} signal", signal.name()),
        }
    }

    /// Committed tree plus the path of `uri`, if both exist.
    async fn view(&self, uri: &Url) -> Option<(Arc<MesonTree>, PathBuf)> {
        let path = url_to_path(uri)?;
        let tree = self.workspace.get()?.workspace().snapshot().await?;
        Some((tree, path))
    }

    fn location(definition: features::Definition) -> Option<Location> {
        let uri = Url::from_file_path(&definition.file).ok()?;
        Some(Location::new(uri, to_range(definition.span)))
    }

    async fn find_definition(&self, params: &TextDocumentPositionParams) -> Option<GotoDefinitionResponse> {
        let (tree, path) = self.view(&params.text_document.uri).await?;
        let position = params.position;
        let definition = features::definition(&tree, &path, position.line, position.character)?;
        Self::location(definition).map(GotoDefinitionResponse::Scalar)
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for MesonLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        #[allow(deprecated)]
        let root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| folder.uri.clone())
            .or(params.root_uri)
            .and_then(|uri| url_to_path(&uri));
        info!("Meson Language Server initializing with root {:?}", root);

        if let Some(root) = root {
            let ns = meson_stdlib::namespace().map_err(|e| {
                let mut error = Error::internal_error();
                error.message = format!("{:#}", e).into();
                error
            })?;
            let options = self.config().workspace_options();
            let sink = Arc::new(ClientSink {
                client: self.client.clone(),
            });
            let workspace = Workspace::new(root, ns, sink, options);
            if self.workspace.set(WorkspaceHandle::spawn(workspace)).is_err() {
                warn!("initialize received twice, keeping the first workspace");
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                    ..Default::default()
                })),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![".".to_string()]),
                    ..Default::default()
                }),
                definition_provider: Some(OneOf::Left(true)),
                declaration_provider: Some(DeclarationCapability::Simple(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                document_highlight_provider: Some(OneOf::Left(true)),
                semantic_tokens_provider: Some(SemanticTokensServerCapabilities::SemanticTokensOptions(
                    SemanticTokensOptions {
                        work_done_progress_options: Default::default(),
                        legend: features::semantic_tokens_legend(),
                        range: None,
                        full: Some(SemanticTokensFullOptions::Bool(true)),
                    },
                )),
                inlay_hint_provider: Some(OneOf::Left(true)),
                code_action_provider: Some(CodeActionProviderCapability::Options(CodeActionOptions {
                    code_action_kinds: Some(vec![CodeActionKind::REFACTOR_REWRITE]),
                    ..Default::default()
                })),
                folding_range_provider: Some(FoldingRangeProviderCapability::Simple(true)),
                document_formatting_provider: Some(OneOf::Left(true)),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: None,
                    file_operations: Some(WorkspaceFileOperationsServerCapabilities {
                        did_create: Some(build_file_operations()),
                        did_delete: Some(build_file_operations()),
                        ..Default::default()
                    }),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "Meson Language Server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("Meson Language Server initialized");
        let _ = self
            .client
            .log_message(MessageType::INFO, "Meson Language Server started")
            .await;
        self.load_config().await;
        self.send(Signal::Reload);
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Meson Language Server shutting down");
        Ok(())
    }

    async fn did_change_configuration(&self, _params: DidChangeConfigurationParams) {
        self.load_config().await;
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        self.documents.insert(
            uri.clone(),
            Document {
                content: Rope::from_str(&text),
                version: params.text_document.version,
            },
        );
        if let Some(path) = url_to_path(&uri) {
            self.send(Signal::Open { path, text });
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = {
            let mut entry = self.documents.entry(uri.clone()).or_default();
            entry.version = params.text_document.version;
            for change in &params.content_changes {
                apply_incremental_change_rope(&mut entry.content, change);
            }
            entry.content.to_string()
        };
        if let Some(path) = url_to_path(&uri) {
            self.send(Signal::Change { path, text });
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        if let Some(path) = url_to_path(&params.text_document.uri) {
            self.send(Signal::Save { path });
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        if let Some(path) = url_to_path(&uri) {
            self.send(Signal::Close { path });
        }
    }

    async fn did_create_files(&self, params: CreateFilesParams) {
        let paths = file_uris_to_paths(params.files.iter().map(|f| f.uri.as_str()));
        if !paths.is_empty() {
            self.send(Signal::CreateFiles(paths));
        }
    }

    async fn did_delete_files(&self, params: DeleteFilesParams) {
        let paths = file_uris_to_paths(params.files.iter().map(|f| f.uri.as_str()));
        for path in &paths {
            if let Ok(uri) = Url::from_file_path(path) {
                self.documents.remove(&uri);
            }
        }
        if !paths.is_empty() {
            self.send(Signal::DeleteFiles(paths));
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params.position;
        let Some((tree, path)) = self.view(&params.text_document_position_params.text_document.uri).await else {
            return Ok(None);
        };
        Ok(features::hover(
            &tree,
            &path,
            position.line,
            position.character,
            self.docs.as_ref(),
        ))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let (Some((tree, path)), Some(handle)) = (self.view(uri).await, self.workspace.get()) else {
            return Ok(None);
        };
        // the buffer may be ahead of the committed tree
        let text = match self.document_text(uri) {
            Some(text) => text,
            None => match handle.workspace().source().read(&path) {
                Ok(text) => text,
                Err(_) => return Ok(None),
            },
        };
        let items = features::completion(
            &tree,
            handle.workspace().namespace(),
            &path,
            &text,
            position.line,
            position.character,
        );
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        Ok(self.find_definition(&params.text_document_position_params).await)
    }

    async fn goto_declaration(&self, params: GotoDeclarationParams) -> Result<Option<GotoDeclarationResponse>> {
        Ok(self.find_definition(&params.text_document_position_params).await)
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> Result<Option<DocumentSymbolResponse>> {
        let Some((tree, path)) = self.view(&params.text_document.uri).await else {
            return Ok(None);
        };
        Ok(Some(DocumentSymbolResponse::Nested(features::document_symbols(
            &tree, &path,
        ))))
    }

    async fn document_highlight(&self, params: DocumentHighlightParams) -> Result<Option<Vec<DocumentHighlight>>> {
        let position = params.text_document_position_params.position;
        let Some((tree, path)) = self.view(&params.text_document_position_params.text_document.uri).await else {
            return Ok(None);
        };
        let highlights = features::document_highlights(&tree, &path, position.line, position.character);
        Ok((!highlights.is_empty()).then_some(highlights))
    }

    async fn semantic_tokens_full(&self, params: SemanticTokensParams) -> Result<Option<SemanticTokensResult>> {
        let Some((tree, path)) = self.view(&params.text_document.uri).await else {
            return Ok(None);
        };
        Ok(Some(SemanticTokensResult::Tokens(SemanticTokens {
            result_id: None,
            data: features::semantic_tokens(&tree, &path),
        })))
    }

    async fn inlay_hint(&self, params: InlayHintParams) -> Result<Option<Vec<InlayHint>>> {
        let Some(options) = self.config().inlay_hint_options() else {
            return Ok(None);
        };
        let Some((tree, path)) = self.view(&params.text_document.uri).await else {
            return Ok(None);
        };
        Ok(Some(features::inlay_hints(&tree, &path, params.range, options)))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = &params.text_document.uri;
        let Some((tree, path)) = self.view(uri).await else {
            return Ok(None);
        };
        let actions = features::code_actions(&tree, &path, uri, params.range);
        Ok(Some(actions.into_iter().map(CodeActionOrCommand::CodeAction).collect()))
    }

    async fn folding_range(&self, params: FoldingRangeParams) -> Result<Option<Vec<FoldingRange>>> {
        let Some((tree, path)) = self.view(&params.text_document.uri).await else {
            return Ok(None);
        };
        Ok(Some(features::folding_ranges(&tree, &path)))
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let Some(text) = self.document_text(&params.text_document.uri) else {
            return Ok(None);
        };
        let formatter = self.config().formatter.clone();
        match features::format_document(&formatter, &text).await {
            Ok(edits) => Ok(edits),
            Err(e) => {
                warn!("formatting failed: {:#}", e);
                let _ = self
                    .client
                    .show_message(MessageType::WARNING, format!("Formatting failed: {:#}", e))
                    .await;
                Ok(None)
            }
        }
    }
}
