use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RESPONSE_TYPE_PONG: i32 = 1;
pub const RESPONSE_TYPE_CHANNEL_MESSAGE_WITH_SOURCE: i32 = 4;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct InteractionResponse {
    pub r#type: i32,
    #[serde(default)]
    pub data: InteractionResponseData,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        InteractionResponse {
            r#type: RESPONSE_TYPE_PONG,
            data: InteractionResponseData::default(),
        }
    }

    pub fn message(content: impl Into<String>) -> Self {
        InteractionResponse {
            r#type: RESPONSE_TYPE_CHANNEL_MESSAGE_WITH_SOURCE,
            data: InteractionResponseData::new().content(content),
        }
    }

    pub fn with_data(r#type: i32, data: InteractionResponseData) -> Self {
        InteractionResponse { r#type, data }
    }
}

/// Message payload of an interaction response. Everything besides `tts` is omitted from the
/// wire when empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct InteractionResponseData {
    #[serde(default)]
    pub tts: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub flags: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Value>>,
}

impl InteractionResponseData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn tts(mut self, tts: bool) -> Self {
        self.tts = tts;
        self
    }

    pub fn embed(mut self, embed: Value) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn allowed_mentions(mut self, allowed_mentions: AllowedMentions) -> Self {
        self.allowed_mentions = Some(allowed_mentions);
        self
    }

    pub fn flags(mut self, flags: u64) -> Self {
        self.flags = flags;
        self
    }
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionType {
    Roles,
    Users,
    Everyone,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AllowedMentions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parse: Vec<MentionType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub replied_user: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pong_serializes_with_empty_data() {
        let encoded = serde_json::to_value(InteractionResponse::pong()).unwrap();
        assert_eq!(encoded, json!({"type": 1, "data": {"tts": false}}));
    }

    #[test]
    fn message_serializes_content_and_tts() {
        let encoded = serde_json::to_value(InteractionResponse::message("Hello, world!")).unwrap();
        assert_eq!(
            encoded,
            json!({"type": 4, "data": {"tts": false, "content": "Hello, world!"}})
        );
    }

    #[test]
    fn optional_fields_are_emitted_when_set() {
        let data = InteractionResponseData::new()
            .content("hi")
            .flags(64)
            .embed(json!({"title": "t"}))
            .allowed_mentions(AllowedMentions {
                parse: vec![MentionType::Users, MentionType::Everyone],
                ..Default::default()
            });
        let encoded = serde_json::to_value(InteractionResponse::with_data(4, data)).unwrap();

        assert_eq!(encoded["data"]["flags"], json!(64));
        assert_eq!(encoded["data"]["embeds"], json!([{"title": "t"}]));
        assert_eq!(
            encoded["data"]["allowed_mentions"],
            json!({"parse": ["users", "everyone"]})
        );
    }

    #[test]
    fn decodes_response_without_data() {
        let decoded: InteractionResponse = serde_json::from_str(r#"{"type":1}"#).unwrap();
        assert_eq!(decoded, InteractionResponse::pong());
    }
}
