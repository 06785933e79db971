//! On-disk symbol index.
//!
//! An external indexer records every occurrence it saw, plus which
//! backend owns each file, in a single JSON document. The server loads
//! that document once at startup and answers `SymbolIndex` queries from
//! memory; incremental index updates happen by restarting the indexer
//! and reloading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RenameError, Result};
use crate::index::{
    IndexSymbol, SymbolIndex, SymbolLocation, SymbolOccurrence, SymbolProviderKind, SymbolRole,
};

/// Roles in the store file, spelled out instead of bit-packed so the
/// indexer side stays trivial to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StoredRole {
    Declaration,
    Definition,
    Reference,
    Call,
    Read,
    Write,
}

impl StoredRole {
    fn to_role(self) -> SymbolRole {
        match self {
            StoredRole::Declaration => SymbolRole::DECLARATION,
            StoredRole::Definition => SymbolRole::DEFINITION,
            StoredRole::Reference => SymbolRole::REFERENCE,
            StoredRole::Call => SymbolRole::CALL,
            StoredRole::Read => SymbolRole::READ,
            StoredRole::Write => SymbolRole::WRITE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StoredProvider {
    Clang,
    Swift,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredOccurrence {
    symbol: IndexSymbol,
    location: SymbolLocation,
    roles: Vec<StoredRole>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreFile {
    #[serde(default)]
    providers: HashMap<PathBuf, StoredProvider>,
    #[serde(default)]
    occurrences: Vec<StoredOccurrence>,
}

/// A `SymbolIndex` backed by a store file, grouped by USR at load time.
#[derive(Debug)]
pub struct IndexStore {
    by_usr: HashMap<String, Vec<SymbolOccurrence>>,
    providers: HashMap<PathBuf, SymbolProviderKind>,
}

impl IndexStore {
    /// Read and decode a store file.
    pub fn load(path: &Path) -> Result<IndexStore> {
        let text = std::fs::read_to_string(path)?;
        let file: StoreFile = serde_json::from_str(&text).map_err(|error| {
            RenameError::Internal(format!(
                "malformed index store `{}`: {error}",
                path.display()
            ))
        })?;

        let mut by_usr: HashMap<String, Vec<SymbolOccurrence>> = HashMap::new();
        for stored in file.occurrences {
            let roles = stored
                .roles
                .iter()
                .fold(SymbolRole::empty(), |roles, role| roles | role.to_role());
            by_usr
                .entry(stored.symbol.usr.clone())
                .or_default()
                .push(SymbolOccurrence {
                    symbol: stored.symbol,
                    location: stored.location,
                    roles,
                });
        }

        let providers = file
            .providers
            .into_iter()
            .map(|(path, provider)| {
                let provider = match provider {
                    StoredProvider::Clang => SymbolProviderKind::Clang,
                    StoredProvider::Swift => SymbolProviderKind::Swift,
                };
                (path, provider)
            })
            .collect();

        Ok(IndexStore { by_usr, providers })
    }

    pub fn symbol_count(&self) -> usize {
        self.by_usr.len()
    }
}

impl SymbolIndex for IndexStore {
    fn occurrences(&self, usr: &str, roles: SymbolRole) -> Vec<SymbolOccurrence> {
        self.by_usr
            .get(usr)
            .map(|occurrences| {
                occurrences
                    .iter()
                    .filter(|occurrence| occurrence.roles.intersects(roles))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn symbol_provider(&self, path: &Path) -> Option<SymbolProviderKind> {
        self.providers.get(path).copied()
    }
}
