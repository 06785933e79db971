use crosskit_syntax::piece::{CategorizedName, NameContext, Piece, PieceKind};
use crosskit_syntax::snapshot::Snapshot;
use lsp_types::Range;

use crate::error::{RenameError, Result};
use crate::index::RenameLocation;
use crate::swift::{
    SwiftBackend, SyntacticRenameRangesRequest, WirePieceRange, WireRenameLocation,
};

/// Map a backend range-kind identifier into the closed piece taxonomy.
pub fn classify_kind(kind: &str) -> Option<PieceKind> {
    match kind {
        "basename" => Some(PieceKind::BaseName),
        "keyword-basename" => Some(PieceKind::KeywordBaseName),
        "parameter-and-whitespace" => Some(PieceKind::ParameterName),
        "noncollapsible-parameter" => Some(PieceKind::NonCollapsibleParameterName),
        "decl-argument-label" => Some(PieceKind::DeclArgumentLabel),
        "call-argument-label" => Some(PieceKind::CallArgumentLabel),
        "call-argument-colon" => Some(PieceKind::CallArgumentColon),
        "call-argument-combined" => Some(PieceKind::CallArgumentCombined),
        "selector-argument-label" => Some(PieceKind::SelectorArgumentLabel),
        _ => None,
    }
}

/// Map a backend context identifier into the name-context taxonomy.
pub fn classify_context(category: &str) -> Option<NameContext> {
    match category {
        "unmatched" => Some(NameContext::Unmatched),
        "mismatch" => Some(NameContext::Mismatch),
        "activecode" => Some(NameContext::ActiveCode),
        "inactivecode" => Some(NameContext::InactiveCode),
        "string" => Some(NameContext::StringLiteral),
        "selector" => Some(NameContext::Selector),
        "comment" => Some(NameContext::Comment),
        _ => None,
    }
}

/// Convert one wire piece (1-based UTF-8 coordinates) into a `Piece`.
/// Absent when the coordinates cannot be located in the snapshot or the
/// kind identifier is unknown.
pub fn classify_piece(wire: &WirePieceRange, snapshot: &Snapshot) -> Option<Piece> {
    let kind = classify_kind(&wire.kind)?;
    let start = snapshot.position_of_utf8(wire.line, wire.column)?;
    let end = snapshot.position_of_utf8(wire.end_line, wire.end_column)?;
    Some(Piece {
        range: Range::new(start, end),
        kind,
        parameter_index: wire.arg_index,
    })
}

/// Ask the Swift backend for the categorized piece ranges of every
/// occurrence of `old_name` at `locations` in `snapshot`. The request
/// ships the snapshot text, so the answer reflects exactly this text
/// regardless of what the backend has open.
///
/// Pieces with unlocatable coordinates are dropped; an unrecognized
/// context fails the whole response.
pub async fn syntactic_ranges(
    backend: &dyn SwiftBackend,
    locations: &[RenameLocation],
    old_name: &str,
    snapshot: &Snapshot,
) -> Result<Vec<CategorizedName>> {
    let request = SyntacticRenameRangesRequest {
        source_file: crate::uri_to_source_path(&snapshot.uri),
        source_text: snapshot.text().to_string(),
        name: old_name.to_string(),
        locations: locations
            .iter()
            .map(|location| WireRenameLocation {
                line: location.line,
                column: location.utf8_column,
                name_type: location.usage,
            })
            .collect(),
    };

    let response = backend.find_syntactic_rename_ranges(request).await?;

    let mut categorized = Vec::with_capacity(response.categorized_ranges.len());
    for wire in &response.categorized_ranges {
        let Some(context) = classify_context(&wire.category) else {
            return Err(RenameError::Internal(format!(
                "unknown rename range category `{}`",
                wire.category
            )));
        };
        let pieces = wire
            .ranges
            .iter()
            .filter_map(|range| {
                let piece = classify_piece(range, snapshot);
                if piece.is_none() {
                    tracing::debug!(
                        kind = %range.kind,
                        line = range.line,
                        column = range.column,
                        "dropping unlocatable or unknown rename piece"
                    );
                }
                piece
            })
            .collect();
        categorized.push(CategorizedName { pieces, context });
    }
    Ok(categorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::RenameUsage;
    use crate::swift::{
        CursorInfoRequest, CursorInfoResponse, NameTranslationRequest, NameTranslationResponse,
        RelatedIdentifiersRequest, RelatedIdentifiersResponse, SyntacticRenameRangesResponse,
        WireCategorizedRanges,
    };
    use async_trait::async_trait;
    use crosskit_syntax::snapshot::Language;
    use lsp_types::{Position, Url};

    struct MockBackend {
        response: SyntacticRenameRangesResponse,
    }

    #[async_trait]
    impl SwiftBackend for MockBackend {
        async fn name_translation(
            &self,
            _request: NameTranslationRequest,
        ) -> crate::error::Result<NameTranslationResponse> {
            unimplemented!("not used by range tests")
        }

        async fn find_syntactic_rename_ranges(
            &self,
            request: SyntacticRenameRangesRequest,
        ) -> crate::error::Result<SyntacticRenameRangesResponse> {
            assert!(!request.source_text.is_empty());
            Ok(self.response.clone())
        }

        async fn related_identifiers(
            &self,
            _request: RelatedIdentifiersRequest,
        ) -> crate::error::Result<RelatedIdentifiersResponse> {
            unimplemented!("not used by range tests")
        }

        async fn cursor_info(
            &self,
            _request: CursorInfoRequest,
        ) -> crate::error::Result<CursorInfoResponse> {
            unimplemented!("not used by range tests")
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(
            Url::parse("file:///test/a.swift").unwrap(),
            Language::Swift,
            "func foo(a: Int) {}\nfoo(a: 1)\n".to_string(),
        )
    }

    fn wire(line: u32, column: u32, end_column: u32, kind: &str, index: Option<usize>) -> WirePieceRange {
        WirePieceRange {
            line,
            column,
            end_line: line,
            end_column,
            kind: kind.to_string(),
            arg_index: index,
        }
    }

    fn location(line: u32, column: u32) -> RenameLocation {
        RenameLocation {
            line,
            utf8_column: column,
            usage: RenameUsage::Reference,
        }
    }

    #[tokio::test]
    async fn test_response_parsed_in_order() {
        let backend = MockBackend {
            response: SyntacticRenameRangesResponse {
                categorized_ranges: vec![
                    WireCategorizedRanges {
                        category: "activecode".to_string(),
                        ranges: vec![
                            wire(1, 6, 9, "basename", None),
                            wire(1, 10, 11, "decl-argument-label", Some(0)),
                        ],
                    },
                    WireCategorizedRanges {
                        category: "activecode".to_string(),
                        ranges: vec![wire(2, 1, 4, "basename", None)],
                    },
                ],
            },
        };
        let snap = snapshot();
        let categorized = syntactic_ranges(
            &backend,
            &[location(1, 6), location(2, 1)],
            "foo(a:)",
            &snap,
        )
        .await
        .unwrap();

        assert_eq!(categorized.len(), 2);
        assert_eq!(categorized[0].context, NameContext::ActiveCode);
        assert_eq!(categorized[0].pieces.len(), 2);
        assert_eq!(categorized[0].pieces[0].kind, PieceKind::BaseName);
        assert_eq!(
            categorized[0].pieces[0].range,
            Range::new(Position::new(0, 5), Position::new(0, 8))
        );
        assert_eq!(categorized[0].pieces[1].parameter_index, Some(0));
        assert_eq!(
            categorized[1].pieces[0].range,
            Range::new(Position::new(1, 0), Position::new(1, 3))
        );
    }

    #[tokio::test]
    async fn test_unlocatable_and_unknown_pieces_are_dropped() {
        let backend = MockBackend {
            response: SyntacticRenameRangesResponse {
                categorized_ranges: vec![WireCategorizedRanges {
                    category: "activecode".to_string(),
                    ranges: vec![
                        wire(90, 1, 2, "basename", None),
                        wire(1, 6, 9, "holographic", None),
                        wire(1, 6, 9, "basename", None),
                    ],
                }],
            },
        };
        let snap = snapshot();
        let categorized = syntactic_ranges(&backend, &[location(1, 6)], "foo(a:)", &snap)
            .await
            .unwrap();
        assert_eq!(categorized[0].pieces.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_category_is_an_error() {
        let backend = MockBackend {
            response: SyntacticRenameRangesResponse {
                categorized_ranges: vec![WireCategorizedRanges {
                    category: "weird".to_string(),
                    ranges: vec![],
                }],
            },
        };
        let snap = snapshot();
        let error = syntactic_ranges(&backend, &[location(1, 6)], "foo(a:)", &snap)
            .await
            .unwrap_err();
        assert!(matches!(error, RenameError::Internal(_)));
    }

    #[test]
    fn test_classify_kind_covers_closed_set() {
        for (id, kind) in [
            ("basename", PieceKind::BaseName),
            ("keyword-basename", PieceKind::KeywordBaseName),
            ("parameter-and-whitespace", PieceKind::ParameterName),
            ("noncollapsible-parameter", PieceKind::NonCollapsibleParameterName),
            ("decl-argument-label", PieceKind::DeclArgumentLabel),
            ("call-argument-label", PieceKind::CallArgumentLabel),
            ("call-argument-colon", PieceKind::CallArgumentColon),
            ("call-argument-combined", PieceKind::CallArgumentCombined),
            ("selector-argument-label", PieceKind::SelectorArgumentLabel),
        ] {
            assert_eq!(classify_kind(id), Some(kind));
        }
        assert_eq!(classify_kind("base"), None);
    }
}
