use lsp_types::TextEdit;

use crate::compound::{CompoundName, Parameter};
use crate::piece::{CategorizedName, Piece, PieceKind};
use crate::snapshot::Snapshot;

/// Compute the text edits for one occurrence of a renamed symbol.
///
/// Occurrences in non-renamed contexts (unmatched, mismatch, string
/// literal, comment) produce no edits. Each piece produces at most one
/// edit; pieces whose parameter index falls outside either name's
/// parameter list are skipped, so a new name with fewer labels leaves
/// the extra old labels untouched. Edits whose replacement equals the
/// text already in the range are dropped, which makes a completed
/// rename re-run produce nothing.
pub fn edits_for_occurrence(
    categorized: &CategorizedName,
    old_name: &CompoundName,
    new_name: &CompoundName,
    snapshot: &Snapshot,
) -> Vec<TextEdit> {
    if !categorized.context.is_renamed() {
        return Vec::new();
    }

    let mut edits = Vec::new();
    for piece in &categorized.pieces {
        let Some(new_text) = replacement_for_piece(piece, old_name, new_name, snapshot) else {
            continue;
        };
        if snapshot.text_in(piece.range) == Some(new_text.as_str()) {
            continue;
        }
        edits.push(TextEdit {
            range: piece.range,
            new_text,
        });
    }
    edits
}

fn replacement_for_piece(
    piece: &Piece,
    old_name: &CompoundName,
    new_name: &CompoundName,
    snapshot: &Snapshot,
) -> Option<String> {
    match piece.kind {
        PieceKind::BaseName => Some(new_name.base_name.clone()),
        // Keyword bases (`init`, `subscript`) keep their spelling, and
        // non-collapsible internal names are left alone.
        PieceKind::KeywordBaseName | PieceKind::NonCollapsibleParameterName => None,
        _ => {
            let index = piece.parameter_index?;
            let old_parameter = old_name.parameters.get(index)?;
            let new_parameter = new_name.parameters.get(index)?;
            parameter_replacement(piece, old_parameter, new_parameter, snapshot)
        }
    }
}

fn parameter_replacement(
    piece: &Piece,
    old_parameter: &Parameter,
    new_parameter: &Parameter,
    snapshot: &Snapshot,
) -> Option<String> {
    let range_is_empty = piece.range.start == piece.range.end;
    match piece.kind {
        PieceKind::ParameterName => {
            match (old_parameter, new_parameter) {
                // The external label is going away; the declaration
                // needs an explicit internal name so the old label is
                // promoted, e.g. `foo(a:)` → `foo(_:)` rewrites
                // `a: Int` to `_ a: Int`.
                (Parameter::Named(old_label), Parameter::Wildcard) if range_is_empty => {
                    Some(format!(" {old_label}"))
                }
                // An internal name that matches the new external label
                // is redundant and collapses, e.g. `foo(_ a:)` renamed
                // to `foo(a:)` becomes `foo(a:)`, not `foo(a a:)`.
                (_, Parameter::Named(new_label)) => {
                    let original = snapshot.text_in(piece.range)?;
                    (original.trim() == new_label.trim()).then(String::new)
                }
                _ => None,
            }
        }
        PieceKind::DeclArgumentLabel => {
            if range_is_empty {
                // Adding an external label in front of a sole internal
                // name needs a separating space.
                Some(format!("{} ", new_parameter.label_or_underscore()))
            } else {
                Some(new_parameter.label_or_underscore().to_string())
            }
        }
        PieceKind::CallArgumentLabel => Some(new_parameter.label_or_empty().to_string()),
        PieceKind::CallArgumentColon => match new_parameter {
            Parameter::Wildcard => Some(String::new()),
            Parameter::Named(_) => None,
        },
        PieceKind::CallArgumentCombined => match new_parameter {
            Parameter::Named(label) => Some(format!("{label}: ")),
            Parameter::Wildcard => None,
        },
        PieceKind::SelectorArgumentLabel => {
            Some(new_parameter.label_or_underscore().to_string())
        }
        PieceKind::BaseName
        | PieceKind::KeywordBaseName
        | PieceKind::NonCollapsibleParameterName => None,
    }
}
