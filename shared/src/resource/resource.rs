use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::{error::ResourceError, resource_id::ResourceId};

/// A value held in a resource pool, in its serialized form.
///
/// Values written through [`Resource::from_value`] are JSON encoded and can be
/// read back with [`Resource::value_as`]. Values written through
/// [`Resource::from_bytes`] are opaque and only ever handed around as bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(rename = "resourceId")]
    pub id: ResourceId,
    pub value: Vec<u8>,
    pub serializable: bool,
}

impl Resource {
    pub fn from_bytes(id: ResourceId, value: Vec<u8>) -> Self {
        Self {
            id,
            value,
            serializable: false,
        }
    }

    pub fn from_value<T: Serialize>(id: ResourceId, value: &T) -> Result<Self, ResourceError> {
        let bytes = serde_json::to_vec(value).map_err(|err| ResourceError::SerializeFailed {
            name: id.name.clone(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            id,
            value: bytes,
            serializable: true,
        })
    }

    pub fn value_as<T: DeserializeOwned>(&self) -> Result<T, ResourceError> {
        if !self.serializable {
            return Err(ResourceError::NotSerializable {
                name: self.id.name.clone(),
            });
        }
        decode_value(&self.id.name, &self.value)
    }
}

/// Decodes bytes produced by [`Resource::from_value`].
pub fn decode_value<T: DeserializeOwned>(name: &str, bytes: &[u8]) -> Result<T, ResourceError> {
    serde_json::from_slice(bytes).map_err(|err| ResourceError::DeserializeFailed {
        name: name.to_string(),
        size: bytes.len(),
        reason: err.to_string(),
    })
}
