use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use lsp_types::{Position, Url, WorkspaceEdit};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{oneshot, Mutex};

use crate::clang::{ClangBackend, IndexedRenameRequest, PreparedRename, SymbolDetail};
use crate::error::{RenameError, Result};
use crate::swift::{
    CursorInfoRequest, CursorInfoResponse, NameTranslationRequest, NameTranslationResponse,
    RelatedIdentifiersRequest, RelatedIdentifiersResponse, SwiftBackend,
    SyntacticRenameRangesRequest, SyntacticRenameRangesResponse,
};

type Pending = Arc<DashMap<u64, oneshot::Sender<Value>>>;

/// A line-delimited JSON request/response client over a child process's
/// stdio. Requests carry `{id, method, params}`; responses carry
/// `{id, result}` or `{id, error}` and may arrive out of order.
pub struct ProcessClient {
    stdin: Mutex<ChildStdin>,
    pending: Pending,
    next_id: AtomicU64,
    _child: Child,
}

impl ProcessClient {
    pub fn spawn(program: &str, args: &[String]) -> std::io::Result<ProcessClient> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;
        let stdin = child.stdin.take().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "child stdin unavailable")
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "child stdout unavailable")
        })?;

        let pending: Pending = Arc::new(DashMap::new());
        tokio::spawn(read_loop(stdout, Arc::clone(&pending)));

        Ok(ProcessClient {
            stdin: Mutex::new(stdin),
            pending,
            next_id: AtomicU64::new(1),
            _child: child,
        })
    }

    pub async fn request<R: DeserializeOwned>(
        &self,
        method: &str,
        params: impl Serialize,
    ) -> Result<R> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        self.pending.insert(id, sender);

        let envelope = json!({ "id": id, "method": method, "params": params });
        let mut line = serde_json::to_string(&envelope)
            .map_err(|error| RenameError::Transport(error.to_string()))?;
        line.push('\n');

        let write = async {
            let mut stdin = self.stdin.lock().await;
            stdin.write_all(line.as_bytes()).await?;
            stdin.flush().await
        };
        if let Err(error) = write.await {
            self.pending.remove(&id);
            return Err(RenameError::Transport(error.to_string()));
        }

        let response = receiver
            .await
            .map_err(|_| RenameError::Transport("backend closed the connection".to_string()))?;

        if let Some(error) = response.get("error") {
            return Err(RenameError::Transport(error.to_string()));
        }
        let result = response.get("result").cloned().unwrap_or(Value::Null);
        serde_json::from_value(result).map_err(|error| {
            RenameError::Internal(format!("backend `{method}` response missing fields: {error}"))
        })
    }
}

async fn read_loop(stdout: ChildStdout, pending: Pending) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let value: Value = match serde_json::from_str(&line) {
                    Ok(value) => value,
                    Err(error) => {
                        tracing::warn!(%error, "discarding undecodable backend line");
                        continue;
                    }
                };
                let Some(id) = value.get("id").and_then(Value::as_u64) else {
                    tracing::warn!("discarding backend response without id");
                    continue;
                };
                if let Some((_, sender)) = pending.remove(&id) {
                    let _ = sender.send(value);
                }
            }
            Ok(None) | Err(_) => break,
        }
    }
    // Dropping the pending senders wakes every waiter with an error.
    pending.clear();
}

/// Swift backend speaking the process protocol.
pub struct SourceKitClient {
    client: ProcessClient,
}

impl SourceKitClient {
    pub fn spawn(program: &str, args: &[String]) -> std::io::Result<SourceKitClient> {
        Ok(SourceKitClient {
            client: ProcessClient::spawn(program, args)?,
        })
    }
}

#[async_trait]
impl SwiftBackend for SourceKitClient {
    async fn name_translation(
        &self,
        request: NameTranslationRequest,
    ) -> Result<NameTranslationResponse> {
        self.client.request("nameTranslation", request).await
    }

    async fn find_syntactic_rename_ranges(
        &self,
        request: SyntacticRenameRangesRequest,
    ) -> Result<SyntacticRenameRangesResponse> {
        self.client.request("findSyntacticRenameRanges", request).await
    }

    async fn related_identifiers(
        &self,
        request: RelatedIdentifiersRequest,
    ) -> Result<RelatedIdentifiersResponse> {
        self.client.request("relatedIdentifiers", request).await
    }

    async fn cursor_info(&self, request: CursorInfoRequest) -> Result<CursorInfoResponse> {
        self.client.request("cursorInfo", request).await
    }
}

/// Clang backend speaking the process protocol.
pub struct ClangdClient {
    client: ProcessClient,
}

impl ClangdClient {
    pub fn spawn(program: &str, args: &[String]) -> std::io::Result<ClangdClient> {
        Ok(ClangdClient {
            client: ProcessClient::spawn(program, args)?,
        })
    }
}

#[async_trait]
impl ClangBackend for ClangdClient {
    async fn indexed_rename(
        &self,
        request: IndexedRenameRequest,
    ) -> Result<Option<WorkspaceEdit>> {
        self.client.request("indexedRename", request).await
    }

    async fn rename(
        &self,
        uri: Url,
        position: Position,
        new_name: String,
    ) -> Result<Option<WorkspaceEdit>> {
        self.client
            .request(
                "rename",
                json!({ "uri": uri, "position": position, "newName": new_name }),
            )
            .await
    }

    async fn prepare_rename(
        &self,
        uri: Url,
        position: Position,
    ) -> Result<Option<PreparedRename>> {
        self.client
            .request("prepareRename", json!({ "uri": uri, "position": position }))
            .await
    }

    async fn symbol_info(&self, uri: Url, position: Position) -> Result<Vec<SymbolDetail>> {
        self.client
            .request("symbolInfo", json!({ "uri": uri, "position": position }))
            .await
    }
}

/// Stand-ins used when a backend process could not be spawned. Every
/// request fails, so the features needing that backend degrade while
/// the server keeps running.
pub struct DisconnectedSwift;

#[async_trait]
impl SwiftBackend for DisconnectedSwift {
    async fn name_translation(
        &self,
        _request: NameTranslationRequest,
    ) -> Result<NameTranslationResponse> {
        Err(disconnected("swift"))
    }

    async fn find_syntactic_rename_ranges(
        &self,
        _request: SyntacticRenameRangesRequest,
    ) -> Result<SyntacticRenameRangesResponse> {
        Err(disconnected("swift"))
    }

    async fn related_identifiers(
        &self,
        _request: RelatedIdentifiersRequest,
    ) -> Result<RelatedIdentifiersResponse> {
        Err(disconnected("swift"))
    }

    async fn cursor_info(&self, _request: CursorInfoRequest) -> Result<CursorInfoResponse> {
        Err(disconnected("swift"))
    }
}

pub struct DisconnectedClang;

#[async_trait]
impl ClangBackend for DisconnectedClang {
    async fn indexed_rename(
        &self,
        _request: IndexedRenameRequest,
    ) -> Result<Option<WorkspaceEdit>> {
        Err(disconnected("clang"))
    }

    async fn rename(
        &self,
        _uri: Url,
        _position: Position,
        _new_name: String,
    ) -> Result<Option<WorkspaceEdit>> {
        Err(disconnected("clang"))
    }

    async fn prepare_rename(
        &self,
        _uri: Url,
        _position: Position,
    ) -> Result<Option<PreparedRename>> {
        Err(disconnected("clang"))
    }

    async fn symbol_info(&self, _uri: Url, _position: Position) -> Result<Vec<SymbolDetail>> {
        Err(disconnected("clang"))
    }
}

fn disconnected(which: &str) -> RenameError {
    RenameError::Transport(format!("{which} backend is not connected"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // `cat` echoes the request line back; the envelope has our id but
    // no `result`, which decodes as JSON null. Exercises id correlation
    // and the write/read loop end to end.
    #[tokio::test]
    async fn test_round_trip_through_cat() {
        let client = ProcessClient::spawn("cat", &[]).unwrap();
        let first: Value = client.request("echo", json!({"n": 1})).await.unwrap();
        let second: Value = client.request("echo", json!({"n": 2})).await.unwrap();
        assert_eq!(first, Value::Null);
        assert_eq!(second, Value::Null);
    }

    #[tokio::test]
    async fn test_disconnected_backend_errors() {
        let backend = DisconnectedSwift;
        let error = backend
            .cursor_info(CursorInfoRequest {
                source_file: "/test/a.swift".to_string(),
                compiler_args: Vec::new(),
                offset: 0,
            })
            .await
            .unwrap_err();
        assert!(matches!(error, RenameError::Transport(_)));
    }
}
