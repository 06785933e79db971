use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::RenameUsage;

/// Which naming scheme the payload of a name-translation request is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameKind {
    Swift,
    ObjC,
}

/// Translate a name between its Swift and Objective-C spellings. The
/// offset locates the symbol in the source file; the payload carries
/// either a Swift compound name (`base_name` + `arg_names`) or an
/// Objective-C name (`selector_pieces`, or `base_name` for symbols that
/// are not selectors).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameTranslationRequest {
    pub source_file: String,
    pub compiler_args: Vec<String>,
    pub offset: usize,
    pub name_kind: NameKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg_names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector_pieces: Option<Vec<String>>,
}

impl NameTranslationRequest {
    pub fn swift_name(
        source_file: String,
        compiler_args: Vec<String>,
        offset: usize,
        base_name: String,
        arg_names: Vec<String>,
    ) -> NameTranslationRequest {
        NameTranslationRequest {
            source_file,
            compiler_args,
            offset,
            name_kind: NameKind::Swift,
            base_name: Some(base_name),
            arg_names: Some(arg_names),
            selector_pieces: None,
        }
    }

    pub fn objc_selector(
        source_file: String,
        compiler_args: Vec<String>,
        offset: usize,
        selector_pieces: Vec<String>,
    ) -> NameTranslationRequest {
        NameTranslationRequest {
            source_file,
            compiler_args,
            offset,
            name_kind: NameKind::ObjC,
            base_name: None,
            arg_names: None,
            selector_pieces: Some(selector_pieces),
        }
    }

    pub fn objc_base_name(
        source_file: String,
        compiler_args: Vec<String>,
        offset: usize,
        base_name: String,
    ) -> NameTranslationRequest {
        NameTranslationRequest {
            source_file,
            compiler_args,
            offset,
            name_kind: NameKind::ObjC,
            base_name: Some(base_name),
            arg_names: None,
            selector_pieces: None,
        }
    }
}

/// Response of a name translation. Swift→ObjC fills
/// `is_zero_arg_selector` + `selector_pieces`; ObjC→Swift fills
/// `base_name` + `arg_names` (empty argument names mean unnamed slots).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameTranslationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_zero_arg_selector: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector_pieces: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg_names: Option<Vec<String>>,
}

/// One requested rename location on the wire: 1-based line and UTF-8
/// column, tagged with how the occurrence uses the name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRenameLocation {
    pub line: u32,
    pub column: u32,
    pub name_type: RenameUsage,
}

/// Find the categorized piece ranges for every occurrence of `name` at
/// the given locations. This is a purely syntactic request: the source
/// text travels inline and the backend does not consult its own copy of
/// the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntacticRenameRangesRequest {
    pub source_file: String,
    pub source_text: String,
    pub name: String,
    pub locations: Vec<WireRenameLocation>,
}

/// A single piece range on the wire. Coordinates are 1-based UTF-8.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePieceRange {
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg_index: Option<usize>,
}

/// The pieces of one occurrence plus its context category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCategorizedRanges {
    pub category: String,
    pub ranges: Vec<WirePieceRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntacticRenameRangesResponse {
    pub categorized_ranges: Vec<WireCategorizedRanges>,
}

/// All identifiers related to the symbol under the cursor within one
/// file, as byte offset + length pairs, plus the symbol's compound
/// name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedIdentifiersRequest {
    pub source_file: String,
    pub compiler_args: Vec<String>,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedIdentifier {
    pub offset: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedIdentifiersResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub related_identifiers: Vec<RelatedIdentifier>,
}

/// Symbol details at one offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorInfoRequest {
    pub source_file: String,
    pub compiler_args: Vec<String>,
    pub offset: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorInfoResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// The Swift-family backend, an out-of-process semantic service.
#[async_trait]
pub trait SwiftBackend: Send + Sync {
    async fn name_translation(
        &self,
        request: NameTranslationRequest,
    ) -> Result<NameTranslationResponse>;

    async fn find_syntactic_rename_ranges(
        &self,
        request: SyntacticRenameRangesRequest,
    ) -> Result<SyntacticRenameRangesResponse>;

    async fn related_identifiers(
        &self,
        request: RelatedIdentifiersRequest,
    ) -> Result<RelatedIdentifiersResponse>;

    async fn cursor_info(&self, request: CursorInfoRequest) -> Result<CursorInfoResponse>;
}
