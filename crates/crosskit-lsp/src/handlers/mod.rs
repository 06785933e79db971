pub mod document_sync;
pub mod rename;
