use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use serde_json::value::RawValue;

use crate::shared::structs::discord::command::ApplicationCommand;

pub const INTERACTION_TYPE_PING: i32 = 1;
pub const INTERACTION_TYPE_APPLICATION_COMMAND: i32 = 2;

/// The outer interaction envelope.
///
/// Only the discriminator and the pass-through fields are decoded here. The type-specific
/// `data` payload is kept as raw JSON until [`Interaction::application_command`] is called,
/// because its shape depends on `type`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Interaction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub application_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub r#type: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Box<RawValue>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub guild_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_permissions: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_locale: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Ping,
    ApplicationCommand,
    Unsupported(i32),
}

impl From<i32> for InteractionKind {
    fn from(value: i32) -> Self {
        match value {
            INTERACTION_TYPE_PING => InteractionKind::Ping,
            INTERACTION_TYPE_APPLICATION_COMMAND => InteractionKind::ApplicationCommand,
            other => InteractionKind::Unsupported(other),
        }
    }
}

impl Interaction {
    pub fn from_slice(raw: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(raw)
    }

    pub fn kind(&self) -> InteractionKind {
        InteractionKind::from(self.r#type)
    }

    /// Second decode pass over the deferred `data` payload.
    ///
    /// Returns `None` when the envelope carried no `data` at all. Anything other than a JSON
    /// object is an error, including arrays that serde would otherwise read positionally.
    pub fn application_command(&self) -> Option<serde_json::Result<ApplicationCommand>> {
        self.data.as_deref().map(|raw| {
            if !raw.get().trim_start().starts_with('{') {
                return Err(serde::de::Error::custom(
                    "application command data must be a JSON object",
                ));
            }
            serde_json::from_str::<ApplicationCommand>(raw.get())
        })
    }
}

/// Treats an explicit JSON `null` the same as a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
