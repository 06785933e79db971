use std::path::PathBuf;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crosskit_bridge::error::RenameError;

use crate::handlers::{document_sync, rename};
use crate::state::WorldState;

pub struct CrosskitBackend {
    pub client: Client,
    pub state: WorldState,
}

fn into_jsonrpc_error(error: RenameError) -> tower_lsp::jsonrpc::Error {
    tracing::error!(%error, "request failed");
    let code = match error {
        RenameError::Cancelled => tower_lsp::jsonrpc::ErrorCode::RequestCancelled,
        RenameError::WorkspaceNotOpen(_) => tower_lsp::jsonrpc::ErrorCode::InvalidParams,
        _ => tower_lsp::jsonrpc::ErrorCode::InternalError,
    };
    tower_lsp::jsonrpc::Error {
        code,
        message: error.to_string().into(),
        data: None,
    }
}

/// Workspace roots claimed by the client, most specific source first:
/// every workspace folder, or the legacy single root when no folders
/// were sent. Rename rejects URIs outside these roots.
fn workspace_roots_from(params: &InitializeParams) -> Vec<PathBuf> {
    let from_folders: Vec<PathBuf> = params
        .workspace_folders
        .iter()
        .flatten()
        .filter_map(|folder| folder.uri.to_file_path().ok())
        .collect();
    if !from_folders.is_empty() {
        return from_folders;
    }

    if let Some(root) = params
        .root_uri
        .as_ref()
        .and_then(|uri| uri.to_file_path().ok())
    {
        return vec![root];
    }

    #[allow(deprecated)]
    let legacy_root = params.root_path.clone();
    legacy_root
        .map(PathBuf::from)
        .filter(|path| path.is_dir())
        .into_iter()
        .collect()
}

#[tower_lsp::async_trait]
impl LanguageServer for CrosskitBackend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let roots = workspace_roots_from(&params);
        if roots.is_empty() {
            tracing::warn!("client sent no usable workspace root; rename requests will be rejected");
        } else {
            tracing::info!(count = roots.len(), "tracking workspace roots");
        }
        *self.state.workspace_roots.lock().unwrap() = roots;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                rename_provider: Some(OneOf::Right(RenameOptions {
                    prepare_provider: Some(true),
                    work_done_progress_options: WorkDoneProgressOptions {
                        work_done_progress: None,
                    },
                })),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "crosskit-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("crosskit language server initialized");
        if self.state.index.is_none() {
            self.client
                .log_message(
                    MessageType::INFO,
                    "crosskit-lsp: no symbol index connected; rename is local-only",
                )
                .await;
        }
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        document_sync::handle_did_open(&self.state, params);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        document_sync::handle_did_change(&self.state, params);
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        document_sync::handle_did_close(&self.state, params);
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        document_sync::handle_did_change_watched_files(&self.state, params).await;
    }

    async fn prepare_rename(
        &self,
        params: TextDocumentPositionParams,
    ) -> Result<Option<PrepareRenameResponse>> {
        rename::handle_prepare_rename(&self.state, params)
            .await
            .map_err(into_jsonrpc_error)
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        rename::handle_rename(&self.state, params)
            .await
            .map_err(into_jsonrpc_error)
    }
}
