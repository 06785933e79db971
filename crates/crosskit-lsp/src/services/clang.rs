use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lsp_types::{Position, TextEdit};

use crosskit_bridge::clang::{ClangBackend, IndexedRenameRequest, PreparedRename, SymbolDetail};
use crosskit_bridge::error::Result;
use crosskit_bridge::index::RenameLocation;
use crosskit_bridge::swift::SwiftBackend;
use crosskit_bridge::translate::TranslatableName;
use crosskit_syntax::snapshot::Snapshot;

use super::{LanguageService, LocalRename};

/// Rename support for Clang-family documents. The heavy lifting is
/// delegated to the Clang backend; the Swift backend is only consulted
/// to translate names of Swift-defined symbols into their Clang
/// spelling.
pub struct ClangService {
    backend: Arc<dyn ClangBackend>,
    swift: Arc<dyn SwiftBackend>,
}

impl ClangService {
    pub fn new(backend: Arc<dyn ClangBackend>, swift: Arc<dyn SwiftBackend>) -> ClangService {
        ClangService { backend, swift }
    }
}

#[async_trait]
impl LanguageService for ClangService {
    async fn rename(
        &self,
        snapshot: &Snapshot,
        position: Position,
        new_name: &str,
    ) -> Result<Option<LocalRename>> {
        let Some(edit) = self
            .backend
            .rename(snapshot.uri.clone(), position, new_name.to_string())
            .await?
        else {
            return Ok(None);
        };

        let usr = match self.backend.symbol_info(snapshot.uri.clone(), position).await {
            Ok(details) => details.into_iter().find_map(|detail| detail.usr),
            Err(error) => {
                tracing::info!(%error, "symbol info unavailable; rename stays local");
                None
            }
        };
        Ok(Some(LocalRename { edit, usr }))
    }

    async fn edits_to_rename(
        &self,
        locations: &[RenameLocation],
        snapshot: &Snapshot,
        old_name: &TranslatableName,
        new_name: &TranslatableName,
    ) -> Result<Vec<TextEdit>> {
        let old_spelled = old_name.clang_name(&*self.swift).await?.to_string();
        let new_spelled = new_name.clang_name(&*self.swift).await?.to_string();

        let positions: Vec<Position> = locations
            .iter()
            .filter_map(|location| snapshot.position_of_utf8(location.line, location.utf8_column))
            .collect();
        let request = IndexedRenameRequest {
            text_document: snapshot.uri.clone(),
            old_name: old_spelled,
            new_name: new_spelled,
            positions: HashMap::from([(snapshot.uri.clone(), positions)]),
        };

        match self.backend.indexed_rename(request).await {
            Ok(Some(edit)) => Ok(edit
                .changes
                .and_then(|mut changes| changes.remove(&snapshot.uri))
                .unwrap_or_default()),
            Ok(None) => Ok(Vec::new()),
            Err(error) => {
                tracing::warn!(uri = %snapshot.uri, %error, "indexed rename failed");
                Ok(Vec::new())
            }
        }
    }

    async fn prepare_rename(
        &self,
        snapshot: &Snapshot,
        position: Position,
    ) -> Result<Option<PreparedRename>> {
        self.backend.prepare_rename(snapshot.uri.clone(), position).await
    }

    async fn symbol_info(
        &self,
        snapshot: &Snapshot,
        position: Position,
    ) -> Result<Vec<SymbolDetail>> {
        self.backend.symbol_info(snapshot.uri.clone(), position).await
    }
}
