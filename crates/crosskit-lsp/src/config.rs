use std::path::PathBuf;

/// Server configuration from environment variables. Workspace-level
/// build-setting resolution lives outside this server; the compiler
/// arguments here are forwarded verbatim to the Swift backend, and the
/// index store is the JSON file an external indexer maintains.
pub struct Config {
    pub swift_server: Option<String>,
    pub swift_server_args: Vec<String>,
    pub clang_server: Option<String>,
    pub clang_server_args: Vec<String>,
    pub compiler_args: Vec<String>,
    pub index_store: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            swift_server: std::env::var("CROSSKIT_SWIFT_SERVER").ok(),
            swift_server_args: split_args(std::env::var("CROSSKIT_SWIFT_SERVER_ARGS").ok()),
            clang_server: std::env::var("CROSSKIT_CLANG_SERVER").ok(),
            clang_server_args: split_args(std::env::var("CROSSKIT_CLANG_SERVER_ARGS").ok()),
            compiler_args: split_args(std::env::var("CROSSKIT_COMPILER_ARGS").ok()),
            index_store: std::env::var("CROSSKIT_INDEX_STORE").ok().map(PathBuf::from),
        }
    }
}

fn split_args(value: Option<String>) -> Vec<String> {
    value
        .map(|args| args.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}
