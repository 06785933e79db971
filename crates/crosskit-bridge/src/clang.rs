use std::collections::HashMap;

use async_trait::async_trait;
use lsp_types::{Position, Range, Url, WorkspaceEdit};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Rename every given position of a symbol across the listed files in
/// one request, driven by the caller's index knowledge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedRenameRequest {
    pub text_document: Url,
    pub old_name: String,
    pub new_name: String,
    pub positions: HashMap<Url, Vec<Position>>,
}

/// Details of the symbol at a position; `usr` identifies it across
/// files when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
}

/// A prepare-rename answer: the symbol's range and, when the backend
/// knows it, the placeholder to seed the dialog with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedRename {
    pub range: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// The Clang-family backend, an out-of-process language server.
#[async_trait]
pub trait ClangBackend: Send + Sync {
    /// Index-driven rename across files; `None` when the backend cannot
    /// rename the symbol.
    async fn indexed_rename(&self, request: IndexedRenameRequest)
        -> Result<Option<WorkspaceEdit>>;

    /// Local (single-file view) rename at a position.
    async fn rename(
        &self,
        uri: Url,
        position: Position,
        new_name: String,
    ) -> Result<Option<WorkspaceEdit>>;

    async fn prepare_rename(&self, uri: Url, position: Position)
        -> Result<Option<PreparedRename>>;

    async fn symbol_info(&self, uri: Url, position: Position) -> Result<Vec<SymbolDetail>>;
}
