use lsp_types::{Position, Url};
use thiserror::Error;

/// Which way a name translation was going when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationDirection {
    SwiftToClang,
    ClangToSwift,
}

impl std::fmt::Display for TranslationDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationDirection::SwiftToClang => write!(f, "Swift-to-Clang"),
            TranslationDirection::ClangToSwift => write!(f, "Clang-to-Swift"),
        }
    }
}

/// Failure modes of the rename engine. The primary file's rename
/// surfaces these to the client; per-file fan-out failures are logged
/// and the file is skipped instead.
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("no workspace is open for `{0}`")]
    WorkspaceNotOpen(Url),

    #[error("the symbol is defined in a language that does not support rename")]
    UnsupportedLanguage,

    #[error("cannot compute offset of {}:{} in snapshot", .0.line, .0.character)]
    CannotComputeOffset(Position),

    #[error("malformed {direction} translation response: {payload}")]
    MalformedTranslationResponse {
        direction: TranslationDirection,
        payload: String,
    },

    #[error("{0}")]
    Internal(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("backend transport: {0}")]
    Transport(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RenameError>;
