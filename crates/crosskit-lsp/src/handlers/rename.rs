use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use lsp_types::{
    PrepareRenameResponse, RenameParams, TextDocumentPositionParams, TextEdit, Url, WorkspaceEdit,
};

use crosskit_bridge::error::{RenameError, Result};
use crosskit_bridge::index::{
    IndexLanguage, IndexSymbolKind, RenameLocation, SymbolIndex, SymbolOccurrence,
    SymbolProviderKind, SymbolRole,
};
use crosskit_bridge::translate::TranslatableName;
use crosskit_syntax::snapshot::Language;

use crate::convert::path_to_uri;
use crate::state::WorldState;

/// Workspace-wide rename.
///
/// The primary file is renamed through its language service; the USR it
/// reports is then resolved to the symbol's unique definition site,
/// every indexed occurrence is grouped by file, and per-file edits are
/// computed concurrently through the service matching each file's
/// symbol provider. Any failure after the local rename degrades to the
/// local result; any per-file failure omits that file.
pub async fn handle_rename(
    state: &WorldState,
    params: RenameParams,
) -> Result<Option<WorkspaceEdit>> {
    let uri = params.text_document_position.text_document.uri;
    let position = params.text_document_position.position;
    let new_name = params.new_name;

    if state.workspace_root_for(&uri).is_none() {
        return Err(RenameError::WorkspaceNotOpen(uri));
    }
    let Some(language) = state.language_of(&uri) else {
        return Ok(None);
    };
    let service = state.service_for(language);
    let snapshot = state.snapshot_or_load(&uri, language).await?;

    let Some(local) = service.rename(&snapshot, position, &new_name).await? else {
        return Ok(None);
    };
    let (Some(usr), Some(index)) = (local.usr, state.index.as_ref()) else {
        return Ok(Some(local.edit));
    };

    let Some(old_name) = translatable_name(state, index.as_ref(), &usr).await else {
        tracing::info!(%usr, "falling back to local-only rename");
        return Ok(Some(local.edit));
    };
    let old_name = Arc::new(old_name);
    // The new name is supplied in the definition language; only the
    // spelling changes, the definition site stays.
    let new_name = Arc::new(old_name.with_definition_name(new_name));

    // Local edits were computed in the primary file's language. They
    // only survive when the symbol is defined in that same family;
    // otherwise the fan-out below recomputes the primary file with
    // properly translated names.
    let mut changes: HashMap<Url, Vec<TextEdit>> =
        if old_name.definition_language().same_family(language) {
            local.edit.changes.unwrap_or_default()
        } else {
            HashMap::new()
        };

    let occurrences = index.occurrences(
        &usr,
        SymbolRole::DECLARATION | SymbolRole::DEFINITION | SymbolRole::REFERENCE | SymbolRole::CALL,
    );
    let mut by_file: HashMap<PathBuf, Vec<RenameLocation>> = HashMap::new();
    for occurrence in &occurrences {
        by_file
            .entry(occurrence.location.path.clone())
            .or_default()
            .push(RenameLocation::from_occurrence(occurrence));
    }

    let tasks = by_file
        .into_iter()
        .filter_map(|(path, locations)| {
            let Some(file_uri) = path_to_uri(&path) else {
                tracing::warn!(path = %path.display(), "skipping unaddressable file");
                return None;
            };
            if changes.contains_key(&file_uri) {
                return None;
            }
            Some((path, file_uri, locations))
        })
        .map(|(path, file_uri, locations)| {
            let old_name = Arc::clone(&old_name);
            let new_name = Arc::clone(&new_name);
            async move {
                rename_in_file(state, index.as_ref(), path, file_uri, locations, old_name, new_name)
                    .await
            }
        });

    for (file_uri, edits) in join_all(tasks).await.into_iter().flatten() {
        if edits.is_empty() {
            continue;
        }
        debug_assert!(
            !changes.contains_key(&file_uri),
            "edits for {file_uri} computed twice"
        );
        changes.insert(file_uri, edits);
    }

    Ok(Some(WorkspaceEdit {
        changes: Some(changes),
        ..Default::default()
    }))
}

/// Per-file rename work. Failures are logged and the file is omitted
/// from the workspace edit.
async fn rename_in_file(
    state: &WorldState,
    index: &dyn SymbolIndex,
    path: PathBuf,
    uri: Url,
    locations: Vec<RenameLocation>,
    old_name: Arc<TranslatableName>,
    new_name: Arc<TranslatableName>,
) -> Option<(Url, Vec<TextEdit>)> {
    let Some(provider) = index.symbol_provider(&path) else {
        tracing::debug!(path = %path.display(), "skipping file without symbol provider");
        return None;
    };
    let language = match provider {
        SymbolProviderKind::Clang => Language::C,
        SymbolProviderKind::Swift => Language::Swift,
    };
    let service = state.service_for(language);
    let snapshot = match state.snapshot_or_load(&uri, language).await {
        Ok(snapshot) => snapshot,
        Err(error) => {
            tracing::warn!(%uri, %error, "skipping unreadable file in workspace rename");
            return None;
        }
    };
    match service
        .edits_to_rename(&locations, &snapshot, &old_name, &new_name)
        .await
    {
        Ok(edits) => Some((uri, edits)),
        Err(error) => {
            tracing::warn!(%uri, %error, "skipping file in workspace rename");
            None
        }
    }
}

/// Model the symbol by its unique definition occurrence. `None` (zero
/// or several definitions, unaddressable path, unreadable defining
/// file) refuses the global rename.
async fn translatable_name(
    state: &WorldState,
    index: &dyn SymbolIndex,
    usr: &str,
) -> Option<TranslatableName> {
    let definition = unique_definition(index, usr)?;

    let definition_language = definition.symbol.language.to_language();
    let is_objc_selector = definition.symbol.language == IndexLanguage::ObjC
        && matches!(
            definition.symbol.kind,
            IndexSymbolKind::InstanceMethod | IndexSymbolKind::ClassMethod
        );

    let definition_uri = path_to_uri(&definition.location.path)?;
    let defining_snapshot = match state
        .snapshot_or_load(&definition_uri, definition_language)
        .await
    {
        Ok(snapshot) => Arc::new(snapshot),
        Err(error) => {
            tracing::warn!(%definition_uri, %error, "cannot load defining file");
            return None;
        }
    };
    let definition_position = defining_snapshot
        .position_of_utf8(definition.location.line, definition.location.utf8_column)?;

    Some(TranslatableName::new(
        definition.symbol.name.clone(),
        definition_language,
        is_objc_selector,
        defining_snapshot,
        definition_position,
        state.compiler_args.clone(),
    ))
}

fn unique_definition(index: &dyn SymbolIndex, usr: &str) -> Option<SymbolOccurrence> {
    let mut definitions = index.occurrences(usr, SymbolRole::DEFINITION);
    if definitions.is_empty() {
        definitions = index.occurrences(usr, SymbolRole::DECLARATION);
    }
    if definitions.len() != 1 {
        tracing::info!(
            usr,
            count = definitions.len(),
            "global rename refused: no unique definition"
        );
        return None;
    }
    definitions.pop()
}

/// Resolve the range and placeholder for the client's rename dialog.
/// When the symbol is indexed, the placeholder becomes the
/// definition-site spelling: that is the name the user must type, even
/// when renaming from the other language.
pub async fn handle_prepare_rename(
    state: &WorldState,
    params: TextDocumentPositionParams,
) -> Result<Option<PrepareRenameResponse>> {
    let uri = params.text_document.uri;
    let position = params.position;

    let Some(language) = state.language_of(&uri) else {
        return Ok(None);
    };
    let service = state.service_for(language);
    let snapshot = state.snapshot_or_load(&uri, language).await?;

    let Some(prepared) = service.prepare_rename(&snapshot, position).await? else {
        return Ok(None);
    };
    let mut placeholder = match prepared.placeholder {
        Some(placeholder) => placeholder,
        None => snapshot
            .text_in(prepared.range)
            .unwrap_or_default()
            .to_string(),
    };

    if let Some(index) = state.index.as_ref() {
        let usr = match service.symbol_info(&snapshot, position).await {
            Ok(details) => details.into_iter().find_map(|detail| detail.usr),
            Err(error) => {
                tracing::debug!(%error, "symbol info unavailable for prepare rename");
                None
            }
        };
        if let Some(usr) = usr {
            if let Some(definition) = unique_definition(index.as_ref(), &usr) {
                placeholder = definition.symbol.name;
            }
        }
    }

    Ok(Some(PrepareRenameResponse::RangeWithPlaceholder {
        range: prepared.range,
        placeholder,
    }))
}
