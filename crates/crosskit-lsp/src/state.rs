use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use lsp_types::Url;

use crosskit_bridge::clang::ClangBackend;
use crosskit_bridge::error::{RenameError, Result};
use crosskit_bridge::index::SymbolIndex;
use crosskit_bridge::swift::SwiftBackend;
use crosskit_syntax::document::DocumentState;
use crosskit_syntax::snapshot::{Language, Snapshot};

use crate::services::clang::ClangService;
use crate::services::swift::SwiftService;
use crate::services::LanguageService;

/// Global server state: open documents, workspace roots, the symbol
/// index (when one is connected), and the two language services.
pub struct WorldState {
    pub documents: DashMap<Url, DocumentState>,
    pub workspace_roots: Mutex<Vec<PathBuf>>,
    pub index: Option<Arc<dyn SymbolIndex>>,
    pub compiler_args: Vec<String>,
    swift_service: Arc<dyn LanguageService>,
    clang_service: Arc<dyn LanguageService>,
}

impl WorldState {
    pub fn new(
        swift: Arc<dyn SwiftBackend>,
        clang: Arc<dyn ClangBackend>,
        index: Option<Arc<dyn SymbolIndex>>,
        compiler_args: Vec<String>,
    ) -> WorldState {
        let swift_service = Arc::new(SwiftService::new(
            Arc::clone(&swift),
            compiler_args.clone(),
        ));
        let clang_service = Arc::new(ClangService::new(clang, swift));
        WorldState {
            documents: DashMap::new(),
            workspace_roots: Mutex::new(Vec::new()),
            index,
            compiler_args,
            swift_service,
            clang_service,
        }
    }

    /// The workspace root containing `uri`, if any.
    pub fn workspace_root_for(&self, uri: &Url) -> Option<PathBuf> {
        let path = uri.to_file_path().ok()?;
        self.workspace_roots
            .lock()
            .unwrap()
            .iter()
            .find(|root| path.starts_with(root))
            .cloned()
    }

    /// Language of a document: the open document's language if any,
    /// the file extension otherwise.
    pub fn language_of(&self, uri: &Url) -> Option<Language> {
        if let Some(doc) = self.documents.get(uri) {
            return Some(doc.language);
        }
        Language::from_path(&uri.to_file_path().ok()?)
    }

    /// The language service responsible for documents of `language`.
    pub fn service_for(&self, language: Language) -> Arc<dyn LanguageService> {
        if language.is_swift_family() {
            Arc::clone(&self.swift_service)
        } else {
            Arc::clone(&self.clang_service)
        }
    }

    /// Snapshot of `uri`: the open document's current text, or a
    /// one-shot read from disk for files that are not open.
    pub async fn snapshot_or_load(&self, uri: &Url, fallback: Language) -> Result<Snapshot> {
        if let Some(doc) = self.documents.get(uri) {
            return Ok(doc.snapshot(uri.clone()));
        }
        let path = uri
            .to_file_path()
            .map_err(|_| RenameError::Internal(format!("`{uri}` is not a file uri")))?;
        let text = tokio::fs::read_to_string(&path).await?;
        let language = Language::from_path(&path).unwrap_or(fallback);
        Ok(Snapshot::new(uri.clone(), language, text))
    }

    /// Replace a document with its on-disk contents, used when the
    /// client reports an external change.
    pub async fn reload_file_from_disk(&self, uri: &Url) {
        let Ok(path) = uri.to_file_path() else { return };
        let Some(language) = Language::from_path(&path) else { return };
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                self.documents
                    .insert(uri.clone(), DocumentState::new(&text, language, 0));
            }
            Err(error) => {
                tracing::warn!(%uri, %error, "failed to reload file from disk");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crosskit_bridge::process::{DisconnectedClang, DisconnectedSwift};
    use std::io::Write;

    fn world() -> WorldState {
        WorldState::new(
            Arc::new(DisconnectedSwift),
            Arc::new(DisconnectedClang),
            None,
            Vec::new(),
        )
    }

    #[test]
    fn test_workspace_root_lookup() {
        let state = world();
        state
            .workspace_roots
            .lock()
            .unwrap()
            .push(PathBuf::from("/test"));
        let inside = Url::parse("file:///test/src/a.swift").unwrap();
        let outside = Url::parse("file:///elsewhere/a.swift").unwrap();
        assert_eq!(state.workspace_root_for(&inside), Some(PathBuf::from("/test")));
        assert_eq!(state.workspace_root_for(&outside), None);
    }

    #[test]
    fn test_language_of_prefers_open_document() {
        let state = world();
        // An Objective-C header opened with an explicit language id
        // wins over the `.h` extension guess.
        let uri = Url::parse("file:///test/a.h").unwrap();
        state.documents.insert(
            uri.clone(),
            DocumentState::new("@interface Foo\n@end\n", Language::ObjectiveC, 1),
        );
        assert_eq!(state.language_of(&uri), Some(Language::ObjectiveC));

        let closed = Url::parse("file:///test/b.swift").unwrap();
        assert_eq!(state.language_of(&closed), Some(Language::Swift));
    }

    #[tokio::test]
    async fn test_snapshot_prefers_open_document() {
        let state = world();
        let uri = Url::parse("file:///test/a.swift").unwrap();
        state.documents.insert(
            uri.clone(),
            DocumentState::new("let x = 1\n", Language::Swift, 1),
        );
        let snapshot = state.snapshot_or_load(&uri, Language::Swift).await.unwrap();
        assert_eq!(snapshot.text(), "let x = 1\n");
    }

    #[tokio::test]
    async fn test_snapshot_loads_closed_file_from_disk() {
        let state = world();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("closed.swift");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "func foo() {{}}").unwrap();

        let uri = Url::from_file_path(&path).unwrap();
        let snapshot = state.snapshot_or_load(&uri, Language::C).await.unwrap();
        assert_eq!(snapshot.text(), "func foo() {}\n");
        assert_eq!(snapshot.language, Language::Swift);

        let missing = Url::from_file_path(dir.path().join("missing.swift")).unwrap();
        assert!(state.snapshot_or_load(&missing, Language::Swift).await.is_err());
    }
}
