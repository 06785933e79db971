mod backend;
mod config;
mod convert;
mod handlers;
mod services;
mod state;

use std::sync::Arc;

use crosskit_bridge::clang::ClangBackend;
use crosskit_bridge::index::SymbolIndex;
use crosskit_bridge::process::{ClangdClient, DisconnectedClang, DisconnectedSwift, SourceKitClient};
use crosskit_bridge::store::IndexStore;
use crosskit_bridge::swift::SwiftBackend;
use tower_lsp::{LspService, Server};

use backend::CrosskitBackend;
use config::Config;
use state::WorldState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = Config::from_env();

    let swift: Arc<dyn SwiftBackend> = match &config.swift_server {
        Some(program) => match SourceKitClient::spawn(program, &config.swift_server_args) {
            Ok(client) => Arc::new(client),
            Err(error) => {
                tracing::warn!(%program, %error, "failed to spawn swift backend");
                Arc::new(DisconnectedSwift)
            }
        },
        None => {
            tracing::warn!("CROSSKIT_SWIFT_SERVER is not set; swift features are disabled");
            Arc::new(DisconnectedSwift)
        }
    };

    let clang: Arc<dyn ClangBackend> = match &config.clang_server {
        Some(program) => match ClangdClient::spawn(program, &config.clang_server_args) {
            Ok(client) => Arc::new(client),
            Err(error) => {
                tracing::warn!(%program, %error, "failed to spawn clang backend");
                Arc::new(DisconnectedClang)
            }
        },
        None => {
            tracing::warn!("CROSSKIT_CLANG_SERVER is not set; clang features are disabled");
            Arc::new(DisconnectedClang)
        }
    };

    let index: Option<Arc<dyn SymbolIndex>> = match &config.index_store {
        Some(path) => match IndexStore::load(path) {
            Ok(store) => {
                tracing::info!(
                    path = %path.display(),
                    symbols = store.symbol_count(),
                    "loaded index store"
                );
                Some(Arc::new(store))
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to load index store; rename is local-only");
                None
            }
        },
        None => {
            tracing::info!("CROSSKIT_INDEX_STORE is not set; rename is local-only");
            None
        }
    };

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(move |client| CrosskitBackend {
        client,
        state: WorldState::new(swift, clang, index, config.compiler_args),
    });

    Server::new(stdin, stdout, socket).serve(service).await;
}
