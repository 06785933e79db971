pub mod clang;
pub mod error;
pub mod index;
pub mod process;
pub mod store;
pub mod swift;
pub mod syntactic;
pub mod translate;

use lsp_types::Url;

/// Filesystem path of a document URI, as the backends expect it in
/// their `source_file` fields.
pub fn uri_to_source_path(uri: &Url) -> String {
    uri.to_file_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| uri.path().to_string())
}
