use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lsp_types::{Position, Range, TextEdit, WorkspaceEdit};

use crosskit_bridge::clang::{PreparedRename, SymbolDetail};
use crosskit_bridge::error::{RenameError, Result};
use crosskit_bridge::index::{RenameLocation, RenameUsage};
use crosskit_bridge::swift::{
    CursorInfoRequest, RelatedIdentifiersRequest, SwiftBackend,
};
use crosskit_bridge::syntactic::syntactic_ranges;
use crosskit_bridge::translate::TranslatableName;
use crosskit_bridge::uri_to_source_path;
use crosskit_syntax::compound::CompoundName;
use crosskit_syntax::edit::edits_for_occurrence;
use crosskit_syntax::snapshot::Snapshot;

use super::{LanguageService, LocalRename};

/// Rename support for Swift-family documents. Occurrence discovery,
/// name classification, and the per-piece edit policy all run in this
/// process; the backend supplies related identifiers, cursor info, and
/// the categorized syntactic ranges.
pub struct SwiftService {
    backend: Arc<dyn SwiftBackend>,
    compiler_args: Vec<String>,
}

impl SwiftService {
    pub fn new(backend: Arc<dyn SwiftBackend>, compiler_args: Vec<String>) -> SwiftService {
        SwiftService {
            backend,
            compiler_args,
        }
    }

    /// All within-file occurrences of the symbol at `offset`, plus its
    /// compound name.
    async fn local_occurrences(
        &self,
        snapshot: &Snapshot,
        offset: usize,
    ) -> Result<Option<(String, Vec<(Range, RenameLocation)>)>> {
        let related = self
            .backend
            .related_identifiers(RelatedIdentifiersRequest {
                source_file: uri_to_source_path(&snapshot.uri),
                compiler_args: self.compiler_args.clone(),
                offset,
            })
            .await?;

        let Some(name) = related.name else {
            return Ok(None);
        };
        let mut occurrences = Vec::with_capacity(related.related_identifiers.len());
        for identifier in related.related_identifiers {
            let start = snapshot.position_at(identifier.offset);
            let end = snapshot.position_at(identifier.offset + identifier.length);
            let Some((line, utf8_column)) = snapshot.utf8_of_position(start) else {
                continue;
            };
            occurrences.push((
                Range::new(start, end),
                RenameLocation {
                    line,
                    utf8_column,
                    usage: RenameUsage::Reference,
                },
            ));
        }
        if occurrences.is_empty() {
            return Ok(None);
        }
        Ok(Some((name, occurrences)))
    }

    /// Compose the per-piece edits for `locations`, both names given in
    /// their Swift spelling.
    async fn compose_edits(
        &self,
        locations: &[RenameLocation],
        snapshot: &Snapshot,
        old_name: &str,
        new_name: &str,
    ) -> Result<Vec<TextEdit>> {
        let old = CompoundName::parse(old_name);
        let new = CompoundName::parse(new_name);
        let categorized = syntactic_ranges(&*self.backend, locations, old_name, snapshot).await?;
        Ok(categorized
            .iter()
            .flat_map(|occurrence| edits_for_occurrence(occurrence, &old, &new, snapshot))
            .collect())
    }
}

#[async_trait]
impl LanguageService for SwiftService {
    async fn rename(
        &self,
        snapshot: &Snapshot,
        position: Position,
        new_name: &str,
    ) -> Result<Option<LocalRename>> {
        let offset = snapshot
            .offset_of(position)
            .ok_or(RenameError::CannotComputeOffset(position))?;
        let Some((old_name, occurrences)) = self.local_occurrences(snapshot, offset).await? else {
            return Ok(None);
        };

        let locations: Vec<RenameLocation> =
            occurrences.iter().map(|(_, location)| *location).collect();
        let edits = self
            .compose_edits(&locations, snapshot, &old_name, new_name)
            .await?;

        // The USR is what upgrades this to a workspace-wide rename;
        // rename still works locally without one.
        let usr = match self
            .backend
            .cursor_info(CursorInfoRequest {
                source_file: uri_to_source_path(&snapshot.uri),
                compiler_args: self.compiler_args.clone(),
                offset,
            })
            .await
        {
            Ok(info) => info.usr,
            Err(error) => {
                tracing::info!(%error, "cursor info unavailable; rename stays local");
                None
            }
        };

        let mut changes = HashMap::new();
        changes.insert(snapshot.uri.clone(), edits);
        Ok(Some(LocalRename {
            edit: WorkspaceEdit {
                changes: Some(changes),
                ..Default::default()
            },
            usr,
        }))
    }

    async fn edits_to_rename(
        &self,
        locations: &[RenameLocation],
        snapshot: &Snapshot,
        old_name: &TranslatableName,
        new_name: &TranslatableName,
    ) -> Result<Vec<TextEdit>> {
        let Some(first) = locations.first() else {
            return Ok(Vec::new());
        };
        // Any location works as the translation anchor; every
        // occurrence here shares the definition.
        let position = snapshot
            .position_of_utf8(first.line, first.utf8_column)
            .ok_or_else(|| {
                RenameError::Internal(format!(
                    "rename location {}:{} outside `{}`",
                    first.line, first.utf8_column, snapshot.uri
                ))
            })?;

        let old_spelled = old_name
            .swift_name(position, snapshot, &*self.backend)
            .await?
            .to_string();
        let new_spelled = new_name
            .swift_name(position, snapshot, &*self.backend)
            .await?
            .to_string();

        self.compose_edits(locations, snapshot, &old_spelled, &new_spelled)
            .await
    }

    async fn prepare_rename(
        &self,
        snapshot: &Snapshot,
        position: Position,
    ) -> Result<Option<PreparedRename>> {
        let offset = snapshot
            .offset_of(position)
            .ok_or(RenameError::CannotComputeOffset(position))?;
        let Some((name, occurrences)) = self.local_occurrences(snapshot, offset).await? else {
            return Ok(None);
        };
        let at_cursor = occurrences.iter().find(|(range, _)| {
            range.start <= position && position <= range.end
        });
        Ok(at_cursor.map(|(range, _)| PreparedRename {
            range: *range,
            placeholder: Some(name.clone()),
        }))
    }

    async fn symbol_info(
        &self,
        snapshot: &Snapshot,
        position: Position,
    ) -> Result<Vec<SymbolDetail>> {
        let offset = snapshot
            .offset_of(position)
            .ok_or(RenameError::CannotComputeOffset(position))?;
        let info = self
            .backend
            .cursor_info(CursorInfoRequest {
                source_file: uri_to_source_path(&snapshot.uri),
                compiler_args: self.compiler_args.clone(),
                offset,
            })
            .await?;
        Ok(vec![SymbolDetail {
            name: info.name,
            usr: info.usr,
            container_name: None,
        }])
    }
}
