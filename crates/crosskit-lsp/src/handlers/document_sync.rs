use lsp_types::{
    DidChangeTextDocumentParams, DidChangeWatchedFilesParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, FileChangeType,
};

use crosskit_syntax::document::DocumentState;
use crosskit_syntax::snapshot::Language;

use crate::state::WorldState;

pub fn handle_did_open(state: &WorldState, params: DidOpenTextDocumentParams) {
    let doc = params.text_document;
    let language = Language::from_language_id(&doc.language_id).or_else(|| {
        doc.uri
            .to_file_path()
            .ok()
            .and_then(|path| Language::from_path(&path))
    });
    let Some(language) = language else {
        tracing::debug!(uri = %doc.uri, language_id = %doc.language_id, "ignoring unsupported document");
        return;
    };
    state
        .documents
        .insert(doc.uri, DocumentState::new(&doc.text, language, doc.version));
}

pub fn handle_did_change(state: &WorldState, params: DidChangeTextDocumentParams) {
    let uri = params.text_document.uri;
    let version = params.text_document.version;

    if let Some(mut doc) = state.documents.get_mut(&uri) {
        for change in params.content_changes {
            match change.range {
                Some(range) => doc.replace_range(range.start, range.end, &change.text, version),
                None => doc.replace_full(&change.text, version),
            }
        }
    }
}

pub fn handle_did_close(state: &WorldState, params: DidCloseTextDocumentParams) {
    // A closed tab is not a deleted file. The fan-out snapshots every
    // occurrence file, open or not, so evicting here would force a disk
    // read that may not match what the index saw. Entries leave the map
    // only when the watcher reports a deletion.
    tracing::debug!(
        uri = %params.text_document.uri,
        tracked = state.documents.len(),
        "document closed, text retained"
    );
}

pub async fn handle_did_change_watched_files(
    state: &WorldState,
    params: DidChangeWatchedFilesParams,
) {
    for change in &params.changes {
        match change.typ {
            FileChangeType::CREATED | FileChangeType::CHANGED => {
                state.reload_file_from_disk(&change.uri).await;
            }
            FileChangeType::DELETED => {
                state.documents.remove(&change.uri);
            }
            _ => {}
        }
    }
}
