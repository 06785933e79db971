use std::path::{Path, PathBuf};

use bitflags::bitflags;
use crosskit_syntax::snapshot::Language;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Roles a symbol occurrence can carry in the index.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SymbolRole: u32 {
        const DECLARATION = 1 << 0;
        const DEFINITION = 1 << 1;
        const REFERENCE = 1 << 2;
        const CALL = 1 << 3;
        const READ = 1 << 4;
        const WRITE = 1 << 5;
    }
}

/// Source language the index recorded for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexLanguage {
    C,
    Cpp,
    ObjC,
    Swift,
}

impl IndexLanguage {
    pub fn to_language(self) -> Language {
        match self {
            IndexLanguage::C => Language::C,
            IndexLanguage::Cpp => Language::Cpp,
            IndexLanguage::ObjC => Language::ObjectiveC,
            IndexLanguage::Swift => Language::Swift,
        }
    }
}

/// Symbol kinds the rename engine distinguishes. Only the method kinds
/// affect behavior (they mark Objective-C selectors); the rest exist so
/// index payloads round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexSymbolKind {
    InstanceMethod,
    ClassMethod,
    Function,
    Variable,
    Property,
    Class,
    Protocol,
    Enum,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSymbol {
    pub usr: String,
    pub name: String,
    pub language: IndexLanguage,
    pub kind: IndexSymbolKind,
}

/// Index coordinates are 1-based lines and 1-based UTF-8 columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolLocation {
    pub path: PathBuf,
    pub line: u32,
    pub utf8_column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolOccurrence {
    pub symbol: IndexSymbol,
    pub location: SymbolLocation,
    pub roles: SymbolRole,
}

/// Which language backend indexed a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolProviderKind {
    Clang,
    Swift,
}

/// The workspace symbol index. Implementations are externally
/// thread-safe; the engine only reads.
pub trait SymbolIndex: Send + Sync {
    /// All occurrences of a USR whose roles intersect `roles`.
    fn occurrences(&self, usr: &str, roles: SymbolRole) -> Vec<SymbolOccurrence>;

    /// Which backend indexed the file at `path`, if any.
    fn symbol_provider(&self, path: &Path) -> Option<SymbolProviderKind>;
}

/// How an occurrence uses the symbol, for the syntactic-range request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameUsage {
    Definition,
    Call,
    Reference,
}

/// One occurrence to rename within a single file: 1-based line, 1-based
/// UTF-8 column, and how the occurrence uses the symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameLocation {
    pub line: u32,
    pub utf8_column: u32,
    pub usage: RenameUsage,
}

impl RenameLocation {
    /// Derive a rename location from an index occurrence.
    pub fn from_occurrence(occurrence: &SymbolOccurrence) -> RenameLocation {
        let usage = if occurrence
            .roles
            .intersects(SymbolRole::DEFINITION | SymbolRole::DECLARATION)
        {
            RenameUsage::Definition
        } else if occurrence.roles.contains(SymbolRole::CALL) {
            RenameUsage::Call
        } else {
            RenameUsage::Reference
        };
        RenameLocation {
            line: occurrence.location.line,
            utf8_column: occurrence.location.utf8_column,
            usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occurrence(roles: SymbolRole) -> SymbolOccurrence {
        SymbolOccurrence {
            symbol: IndexSymbol {
                usr: "c:objc(cs)Foo(im)bar".to_string(),
                name: "bar".to_string(),
                language: IndexLanguage::ObjC,
                kind: IndexSymbolKind::InstanceMethod,
            },
            location: SymbolLocation {
                path: PathBuf::from("/test/a.m"),
                line: 3,
                utf8_column: 9,
            },
            roles,
        }
    }

    #[test]
    fn test_usage_from_roles() {
        let definition = RenameLocation::from_occurrence(&occurrence(SymbolRole::DEFINITION));
        assert_eq!(definition.usage, RenameUsage::Definition);
        assert_eq!((definition.line, definition.utf8_column), (3, 9));

        let declaration = RenameLocation::from_occurrence(&occurrence(
            SymbolRole::DECLARATION | SymbolRole::CALL,
        ));
        assert_eq!(declaration.usage, RenameUsage::Definition);

        let call =
            RenameLocation::from_occurrence(&occurrence(SymbolRole::REFERENCE | SymbolRole::CALL));
        assert_eq!(call.usage, RenameUsage::Call);

        let reference = RenameLocation::from_occurrence(&occurrence(SymbolRole::REFERENCE));
        assert_eq!(reference.usage, RenameUsage::Reference);
    }
}
