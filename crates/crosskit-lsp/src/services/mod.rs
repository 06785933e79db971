pub mod clang;
pub mod swift;

use async_trait::async_trait;
use lsp_types::{Position, TextEdit, WorkspaceEdit};

use crosskit_bridge::clang::{PreparedRename, SymbolDetail};
use crosskit_bridge::error::Result;
use crosskit_bridge::index::RenameLocation;
use crosskit_bridge::translate::TranslatableName;
use crosskit_syntax::snapshot::Snapshot;

/// Outcome of a local (single-file) rename: the edits plus the USR that
/// lets the orchestrator extend the rename across the workspace.
pub struct LocalRename {
    pub edit: WorkspaceEdit,
    pub usr: Option<String>,
}

/// Per-language capabilities the rename orchestrator composes. One
/// implementation per backend family.
#[async_trait]
pub trait LanguageService: Send + Sync {
    /// Local rename within the primary file. `None` when there is no
    /// renameable symbol at the position.
    async fn rename(
        &self,
        snapshot: &Snapshot,
        position: Position,
        new_name: &str,
    ) -> Result<Option<LocalRename>>;

    /// Edits renaming `old_name` to `new_name` at the given index
    /// locations of one file.
    async fn edits_to_rename(
        &self,
        locations: &[RenameLocation],
        snapshot: &Snapshot,
        old_name: &TranslatableName,
        new_name: &TranslatableName,
    ) -> Result<Vec<TextEdit>>;

    /// The range and placeholder for the client's rename dialog.
    async fn prepare_rename(
        &self,
        snapshot: &Snapshot,
        position: Position,
    ) -> Result<Option<PreparedRename>>;

    /// Details of the symbol at a position.
    async fn symbol_info(
        &self,
        snapshot: &Snapshot,
        position: Position,
    ) -> Result<Vec<SymbolDetail>>;
}
