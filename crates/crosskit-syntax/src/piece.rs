use lsp_types::Range;

/// The role of one contiguous range within a renamed occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    /// The base name of the symbol.
    BaseName,
    /// A base name that is a language keyword (`init`, `subscript`) and
    /// cannot itself be renamed.
    KeywordBaseName,
    /// An internal parameter name at a declaration.
    ParameterName,
    /// An internal parameter name that must not collapse with the
    /// external label even when the two are identical.
    NonCollapsibleParameterName,
    /// An external argument label at a declaration.
    DeclArgumentLabel,
    /// An external argument label at a call site.
    CallArgumentLabel,
    /// The `:` and following space after a call-site label.
    CallArgumentColon,
    /// An empty range at an unnamed call argument, anchoring the
    /// insertion of a new label.
    CallArgumentCombined,
    /// A label inside a `#selector`-style compound reference.
    SelectorArgumentLabel,
}

/// The surrounding context of a matched occurrence. Only some contexts
/// participate in renaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameContext {
    Unmatched,
    Mismatch,
    ActiveCode,
    InactiveCode,
    StringLiteral,
    Selector,
    Comment,
}

impl NameContext {
    /// Whether occurrences in this context receive edits.
    pub fn is_renamed(self) -> bool {
        matches!(
            self,
            NameContext::ActiveCode | NameContext::InactiveCode | NameContext::Selector
        )
    }
}

/// One classified range of an occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub range: Range,
    pub kind: PieceKind,
    /// Zero-based position within the parameter list; absent for base
    /// name pieces.
    pub parameter_index: Option<usize>,
}

/// All pieces of one occurrence together with its context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorizedName {
    pub pieces: Vec<Piece>,
    pub context: NameContext,
}
