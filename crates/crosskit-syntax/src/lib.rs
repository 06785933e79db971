pub mod compound;
pub mod document;
pub mod edit;
pub mod piece;
pub mod snapshot;
