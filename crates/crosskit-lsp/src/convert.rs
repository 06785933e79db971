use std::path::Path;

use lsp_types::Url;

/// Convert an index file path to a document URI.
pub fn path_to_uri(path: &Path) -> Option<Url> {
    Url::from_file_path(path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_to_uri() {
        let uri = path_to_uri(Path::new("/test/a.swift")).unwrap();
        assert_eq!(uri.as_str(), "file:///test/a.swift");
        assert!(path_to_uri(Path::new("relative/a.swift")).is_none());
    }
}
