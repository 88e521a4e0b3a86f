use std::fmt;

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize,
};

use crate::types::{NoteId, OwnerKey, ParagraphId, ParagraphRef};

/// Incremental output chunk for one result slot of a paragraph
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputAppend {
    pub note_id: NoteId,
    pub paragraph_id: ParagraphId,
    #[serde(deserialize_with = "index_from_number_or_string")]
    pub index: usize,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
}

/// Full replacement of one result slot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputUpdate {
    pub note_id: NoteId,
    pub paragraph_id: ParagraphId,
    #[serde(deserialize_with = "index_from_number_or_string")]
    pub index: usize,
    #[serde(rename = "type")]
    pub output_type: String,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMessage {
    #[serde(rename = "type")]
    pub output_type: String,
    pub data: String,
}

/// Full replacement of every result slot of a paragraph.
/// A missing `messages` list leaves the current output untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputUpdateAll {
    pub note_id: NoteId,
    pub paragraph_id: ParagraphId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<OutputMessage>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStatusUpdate {
    pub note_id: NoteId,
    pub paragraph_id: ParagraphId,
    pub app_id: String,
    pub status: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControllerResourceType {
    ParagraphRunners,
    #[serde(other)]
    Unsupported,
}

/// A worker asking the controller a question whose answer arrives later,
/// correlated by `owner_key`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerResourceRequest {
    pub owner_key: OwnerKey,
    pub resource_type: ControllerResourceType,
    pub data: ParagraphRef,
}

/// The delayed answer to a [`ControllerResourceRequest`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerResourceResponse {
    pub owner_key: OwnerKey,
    pub resource_type: ControllerResourceType,
    pub data: Vec<ParagraphRef>,
}

// Workers have sent `index` both as a JSON number and as a string.
fn index_from_number_or_string<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    struct IndexVisitor;

    impl<'de> Visitor<'de> for IndexVisitor {
        type Value = usize;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative integer or a string holding one")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<usize, E> {
            usize::try_from(value).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<usize, E> {
            usize::try_from(value).map_err(E::custom)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<usize, E> {
            value.trim().parse::<usize>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(IndexVisitor)
}
