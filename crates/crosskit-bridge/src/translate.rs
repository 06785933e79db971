use std::sync::Arc;

use lsp_types::{Position, Url};
use tokio::sync::OnceCell;

use crosskit_syntax::compound::CompoundName;
use crosskit_syntax::snapshot::{Language, Snapshot};

use crate::error::{RenameError, Result, TranslationDirection};
use crate::swift::{NameTranslationRequest, NameTranslationResponse, SwiftBackend};

/// A symbol name tied to its definition site, translatable between its
/// Swift and Clang spellings.
///
/// All properties refer to the declaring site, regardless of where the
/// rename was invoked; two call sites of the same USR always translate
/// to the same name. Each direction is translated at most once: the
/// first caller starts the translation and concurrent callers await the
/// same in-flight computation.
pub struct TranslatableName {
    definition_name: String,
    definition_language: Language,
    /// Whether the definition is an Objective-C method (instance or
    /// class), i.e. its Clang spelling is a selector.
    is_objc_selector: bool,
    definition_snapshot: Arc<Snapshot>,
    definition_position: Position,
    compiler_args: Vec<String>,
    clang_name: OnceCell<String>,
    swift_name: OnceCell<String>,
}

impl TranslatableName {
    pub fn new(
        definition_name: String,
        definition_language: Language,
        is_objc_selector: bool,
        definition_snapshot: Arc<Snapshot>,
        definition_position: Position,
        compiler_args: Vec<String>,
    ) -> TranslatableName {
        TranslatableName {
            definition_name,
            definition_language,
            is_objc_selector,
            definition_snapshot,
            definition_position,
            compiler_args,
            clang_name: OnceCell::new(),
            swift_name: OnceCell::new(),
        }
    }

    pub fn definition_name(&self) -> &str {
        &self.definition_name
    }

    pub fn definition_language(&self) -> Language {
        self.definition_language
    }

    pub fn definition_uri(&self) -> &Url {
        &self.definition_snapshot.uri
    }

    /// The same definition site carrying a different name. Used for the
    /// new name of a rename, which the user supplies in the definition
    /// language. Translation caches start out empty.
    pub fn with_definition_name(&self, definition_name: String) -> TranslatableName {
        TranslatableName::new(
            definition_name,
            self.definition_language,
            self.is_objc_selector,
            Arc::clone(&self.definition_snapshot),
            self.definition_position,
            self.compiler_args.clone(),
        )
    }

    /// The name's Clang-side spelling. Verbatim for Clang-family
    /// definitions; translated through the Swift backend (at the
    /// definition offset) for Swift definitions.
    pub async fn clang_name(&self, backend: &dyn SwiftBackend) -> Result<&str> {
        match self.definition_language {
            language if language.is_clang_family() => Ok(&self.definition_name),
            Language::Swift => self
                .clang_name
                .get_or_try_init(|| self.translate_to_clang(backend))
                .await
                .map(String::as_str),
            _ => Err(RenameError::UnsupportedLanguage),
        }
    }

    /// The name's Swift-side spelling. Verbatim for Swift definitions;
    /// translated through the Swift backend for Clang-family
    /// definitions. The backend needs a Swift-side anchor, so the
    /// caller passes a position inside a Swift file that references the
    /// symbol.
    pub async fn swift_name(
        &self,
        position: Position,
        snapshot: &Snapshot,
        backend: &dyn SwiftBackend,
    ) -> Result<&str> {
        match self.definition_language {
            Language::Swift => Ok(&self.definition_name),
            language if language.is_clang_family() => self
                .swift_name
                .get_or_try_init(|| self.translate_to_swift(position, snapshot, backend))
                .await
                .map(String::as_str),
            _ => Err(RenameError::UnsupportedLanguage),
        }
    }

    async fn translate_to_clang(&self, backend: &dyn SwiftBackend) -> Result<String> {
        let offset = self
            .definition_snapshot
            .offset_of(self.definition_position)
            .ok_or(RenameError::CannotComputeOffset(self.definition_position))?;

        let name = CompoundName::parse(&self.definition_name);
        let arg_names = name
            .parameters
            .iter()
            .map(|parameter| parameter.label_or_underscore().to_string())
            .collect();
        let request = NameTranslationRequest::swift_name(
            crate::uri_to_source_path(&self.definition_snapshot.uri),
            self.compiler_args.clone(),
            offset,
            name.base_name,
            arg_names,
        );
        let response = backend.name_translation(request).await?;

        let Some(pieces) = response.selector_pieces.as_deref().filter(|p| !p.is_empty()) else {
            return Err(malformed(TranslationDirection::SwiftToClang, &response));
        };
        if response.is_zero_arg_selector.unwrap_or(false) {
            Ok(pieces.concat())
        } else {
            Ok(pieces
                .iter()
                .map(|piece| format!("{piece}:"))
                .collect::<String>())
        }
    }

    async fn translate_to_swift(
        &self,
        position: Position,
        snapshot: &Snapshot,
        backend: &dyn SwiftBackend,
    ) -> Result<String> {
        let offset = snapshot
            .offset_of(position)
            .ok_or(RenameError::CannotComputeOffset(position))?;

        let source_file = crate::uri_to_source_path(&snapshot.uri);
        let request = if self.is_objc_selector {
            let pieces = self
                .definition_name
                .split(':')
                .filter(|piece| !piece.is_empty())
                .map(|piece| format!("{piece}:"))
                .collect();
            NameTranslationRequest::objc_selector(
                source_file,
                self.compiler_args.clone(),
                offset,
                pieces,
            )
        } else {
            NameTranslationRequest::objc_base_name(
                source_file,
                self.compiler_args.clone(),
                offset,
                self.definition_name.clone(),
            )
        };
        let response = backend.name_translation(request).await?;

        let Some(base_name) = response.base_name.as_deref() else {
            return Err(malformed(TranslationDirection::ClangToSwift, &response));
        };
        let arg_names = response.arg_names.as_deref().unwrap_or(&[]);
        if arg_names.is_empty() {
            return Ok(base_name.to_string());
        }
        let mut out = String::from(base_name);
        out.push('(');
        for arg_name in arg_names {
            if arg_name.is_empty() {
                out.push_str("_:");
            } else {
                out.push_str(arg_name);
                out.push(':');
            }
        }
        out.push(')');
        Ok(out)
    }
}

fn malformed(direction: TranslationDirection, response: &NameTranslationResponse) -> RenameError {
    RenameError::MalformedTranslationResponse {
        direction,
        payload: serde_json::to_string(response).unwrap_or_else(|_| "<unencodable>".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swift::{
        CursorInfoRequest, CursorInfoResponse, NameKind, RelatedIdentifiersRequest,
        RelatedIdentifiersResponse, SyntacticRenameRangesRequest, SyntacticRenameRangesResponse,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockBackend {
        response: NameTranslationResponse,
        calls: AtomicUsize,
    }

    impl MockBackend {
        fn new(response: NameTranslationResponse) -> MockBackend {
            MockBackend {
                response,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SwiftBackend for MockBackend {
        async fn name_translation(
            &self,
            request: NameTranslationRequest,
        ) -> Result<NameTranslationResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Direction must match the payload shape.
            match request.name_kind {
                NameKind::Swift => assert!(request.base_name.is_some()),
                NameKind::ObjC => {
                    assert!(request.base_name.is_some() || request.selector_pieces.is_some())
                }
            }
            Ok(self.response.clone())
        }

        async fn find_syntactic_rename_ranges(
            &self,
            _request: SyntacticRenameRangesRequest,
        ) -> Result<SyntacticRenameRangesResponse> {
            unimplemented!("not used by translation tests")
        }

        async fn related_identifiers(
            &self,
            _request: RelatedIdentifiersRequest,
        ) -> Result<RelatedIdentifiersResponse> {
            unimplemented!("not used by translation tests")
        }

        async fn cursor_info(&self, _request: CursorInfoRequest) -> Result<CursorInfoResponse> {
            unimplemented!("not used by translation tests")
        }
    }

    fn swift_snapshot(text: &str) -> Arc<Snapshot> {
        Arc::new(Snapshot::new(
            Url::parse("file:///test/a.swift").unwrap(),
            Language::Swift,
            text.to_string(),
        ))
    }

    fn objc_snapshot(text: &str) -> Arc<Snapshot> {
        Arc::new(Snapshot::new(
            Url::parse("file:///test/a.m").unwrap(),
            Language::ObjectiveC,
            text.to_string(),
        ))
    }

    fn swift_defined(name: &str, snapshot: Arc<Snapshot>) -> TranslatableName {
        TranslatableName::new(
            name.to_string(),
            Language::Swift,
            false,
            snapshot,
            Position::new(0, 5),
            Vec::new(),
        )
    }

    fn objc_defined(name: &str, is_selector: bool, snapshot: Arc<Snapshot>) -> TranslatableName {
        TranslatableName::new(
            name.to_string(),
            Language::ObjectiveC,
            is_selector,
            snapshot,
            Position::new(0, 8),
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn test_clang_name_of_clang_definition_is_verbatim() {
        let backend = MockBackend::new(NameTranslationResponse::default());
        let name = objc_defined(
            "performAction:with:",
            true,
            objc_snapshot("-(void)performAction:(int)a with:(int)b;\n"),
        );
        assert_eq!(name.clang_name(&backend).await.unwrap(), "performAction:with:");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_clang_name_of_swift_definition_is_translated_once() {
        let backend = MockBackend::new(NameTranslationResponse {
            is_zero_arg_selector: Some(false),
            selector_pieces: Some(vec!["performAction".to_string(), "with".to_string()]),
            ..Default::default()
        });
        let name = swift_defined(
            "perform(action:with:)",
            swift_snapshot("func perform(action: Int, with: Int) {}\n"),
        );

        let (first, second) = tokio::join!(name.clang_name(&backend), name.clang_name(&backend));
        assert_eq!(first.unwrap(), "performAction:with:");
        assert_eq!(second.unwrap(), "performAction:with:");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_arg_selector_has_no_colon() {
        let backend = MockBackend::new(NameTranslationResponse {
            is_zero_arg_selector: Some(true),
            selector_pieces: Some(vec!["fire".to_string()]),
            ..Default::default()
        });
        let name = swift_defined("fire()", swift_snapshot("func fire() {}\n"));
        assert_eq!(name.clang_name(&backend).await.unwrap(), "fire");
    }

    #[tokio::test]
    async fn test_swift_name_of_swift_definition_is_verbatim() {
        let backend = MockBackend::new(NameTranslationResponse::default());
        let snapshot = swift_snapshot("func foo(a: Int) {}\n");
        let name = swift_defined("foo(a:)", snapshot.clone());
        let spelled = name
            .swift_name(Position::new(0, 5), &snapshot, &backend)
            .await
            .unwrap();
        assert_eq!(spelled, "foo(a:)");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_swift_name_of_objc_selector() {
        let backend = MockBackend::new(NameTranslationResponse {
            base_name: Some("perform".to_string()),
            arg_names: Some(vec!["action".to_string(), "with".to_string()]),
            ..Default::default()
        });
        let call_site = swift_snapshot("obj.perform(action: 1, with: 2)\n");
        let name = objc_defined(
            "performAction:with:",
            true,
            objc_snapshot("-(void)performAction:(int)a with:(int)b;\n"),
        );
        let spelled = name
            .swift_name(Position::new(0, 4), &call_site, &backend)
            .await
            .unwrap();
        assert_eq!(spelled, "perform(action:with:)");
    }

    #[tokio::test]
    async fn test_swift_name_renders_unnamed_arguments() {
        let backend = MockBackend::new(NameTranslationResponse {
            base_name: Some("move".to_string()),
            arg_names: Some(vec!["".to_string(), "to".to_string()]),
            ..Default::default()
        });
        let call_site = swift_snapshot("obj.move(1, to: 2)\n");
        let name = objc_defined(
            "move:to:",
            true,
            objc_snapshot("-(void)move:(int)a to:(int)b;\n"),
        );
        let spelled = name
            .swift_name(Position::new(0, 4), &call_site, &backend)
            .await
            .unwrap();
        assert_eq!(spelled, "move(_:to:)");
    }

    #[tokio::test]
    async fn test_malformed_translation_response() {
        let backend = MockBackend::new(NameTranslationResponse::default());
        let name = swift_defined("foo(a:)", swift_snapshot("func foo(a: Int) {}\n"));
        let error = name.clang_name(&backend).await.unwrap_err();
        assert!(matches!(
            error,
            RenameError::MalformedTranslationResponse {
                direction: TranslationDirection::SwiftToClang,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_cannot_compute_offset() {
        let backend = MockBackend::new(NameTranslationResponse::default());
        let name = TranslatableName::new(
            "foo(a:)".to_string(),
            Language::Swift,
            false,
            swift_snapshot("x\n"),
            Position::new(40, 0),
            Vec::new(),
        );
        let error = name.clang_name(&backend).await.unwrap_err();
        assert!(matches!(error, RenameError::CannotComputeOffset(_)));
    }

    #[tokio::test]
    async fn test_new_name_clone_has_fresh_caches() {
        let backend = MockBackend::new(NameTranslationResponse {
            is_zero_arg_selector: Some(false),
            selector_pieces: Some(vec!["doTask".to_string(), "along".to_string()]),
            ..Default::default()
        });
        let old = swift_defined(
            "perform(action:with:)",
            swift_snapshot("func perform(action: Int, with: Int) {}\n"),
        );
        let new = old.with_definition_name("do(task:along:)".to_string());
        assert_eq!(new.definition_name(), "do(task:along:)");
        assert_eq!(new.definition_language(), Language::Swift);
        assert_eq!(new.clang_name(&backend).await.unwrap(), "doTask:along:");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
