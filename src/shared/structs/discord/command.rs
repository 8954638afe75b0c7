use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::shared::structs::discord::interaction::null_as_default;

pub const COMMAND_TYPE_CHAT_INPUT: i32 = 1;
pub const COMMAND_TYPE_USER: i32 = 2;
pub const COMMAND_TYPE_MESSAGE: i32 = 3;

/// The `data` payload of an application command interaction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ApplicationCommand {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub r#type: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<Value>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub options: Vec<CommandDataOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
}

impl ApplicationCommand {
    pub fn option(&self, name: &str) -> Option<&CommandDataOption> {
        self.options.iter().find(|option| option.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CommandOptionType {
    SubCommand,
    SubCommandGroup,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
}

impl From<CommandOptionType> for u8 {
    fn from(value: CommandOptionType) -> Self {
        match value {
            CommandOptionType::SubCommand => 1,
            CommandOptionType::SubCommandGroup => 2,
            CommandOptionType::String => 3,
            CommandOptionType::Integer => 4,
            CommandOptionType::Boolean => 5,
            CommandOptionType::User => 6,
            CommandOptionType::Channel => 7,
            CommandOptionType::Role => 8,
            CommandOptionType::Mentionable => 9,
            CommandOptionType::Number => 10,
            CommandOptionType::Attachment => 11,
        }
    }
}

impl TryFrom<u8> for CommandOptionType {
    type Error = OptionDecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => CommandOptionType::SubCommand,
            2 => CommandOptionType::SubCommandGroup,
            3 => CommandOptionType::String,
            4 => CommandOptionType::Integer,
            5 => CommandOptionType::Boolean,
            6 => CommandOptionType::User,
            7 => CommandOptionType::Channel,
            8 => CommandOptionType::Role,
            9 => CommandOptionType::Mentionable,
            10 => CommandOptionType::Number,
            11 => CommandOptionType::Attachment,
            other => return Err(OptionDecodeError::UnknownType(other)),
        })
    }
}

#[derive(Debug, Error)]
pub enum OptionDecodeError {
    #[error("unknown command option type {0}")]
    UnknownType(u8),
    #[error("option `{name}` of type {kind:?} carried an incompatible value: {value}")]
    MismatchedValue {
        name: String,
        kind: CommandOptionType,
        value: Value,
    },
    #[error("option `{name}` carried an unsupported value: {value}")]
    UnsupportedValue { name: String, value: Value },
}

/// A decoded option value.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Entity { kind: CommandOptionType, id: String },
    SubCommand(Vec<CommandDataOption>),
    SubCommandGroup(Vec<CommandDataOption>),
    Absent,
}

impl CommandOptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CommandOptionValue::String(s) => Some(s),
            CommandOptionValue::Entity { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CommandOptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CommandOptionValue::Number(n) => Some(*n),
            CommandOptionValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CommandOptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(
            self,
            CommandOptionValue::SubCommand(_)
                | CommandOptionValue::SubCommandGroup(_)
                | CommandOptionValue::Absent
        )
    }

    fn to_json(&self) -> Option<Value> {
        match self {
            CommandOptionValue::String(s) => Some(Value::String(s.clone())),
            CommandOptionValue::Entity { id, .. } => Some(Value::String(id.clone())),
            CommandOptionValue::Integer(i) => Some(Value::from(*i)),
            CommandOptionValue::Number(n) => serde_json::Number::from_f64(*n).map(Value::Number),
            CommandOptionValue::Boolean(b) => Some(Value::Bool(*b)),
            _ => None,
        }
    }
}

impl Display for CommandOptionValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandOptionValue::String(s) => f.write_str(s),
            CommandOptionValue::Integer(i) => write!(f, "{i}"),
            CommandOptionValue::Number(n) => write!(f, "{n}"),
            CommandOptionValue::Boolean(b) => write!(f, "{b}"),
            CommandOptionValue::Entity { id, .. } => f.write_str(id),
            CommandOptionValue::SubCommand(_)
            | CommandOptionValue::SubCommandGroup(_)
            | CommandOptionValue::Absent => Ok(()),
        }
    }
}

/// A single `name`/`value` pair passed to an application command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawCommandDataOption",
    into = "RawCommandDataOption"
)]
pub struct CommandDataOption {
    pub name: String,
    pub kind: Option<CommandOptionType>,
    pub value: CommandOptionValue,
    pub focused: bool,
}

/// Wire shape of an option, before the value is checked against its declared type.
#[derive(Serialize, Deserialize)]
struct RawCommandDataOption {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<CommandOptionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<CommandDataOption>>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "std::ops::Not::not"
    )]
    focused: bool,
}

impl From<CommandDataOption> for RawCommandDataOption {
    fn from(option: CommandDataOption) -> Self {
        let value = option.value.to_json();
        let options = match option.value {
            CommandOptionValue::SubCommand(nested)
            | CommandOptionValue::SubCommandGroup(nested) => Some(nested),
            _ => None,
        };

        RawCommandDataOption {
            name: option.name,
            kind: option.kind,
            value,
            options,
            focused: option.focused,
        }
    }
}

impl TryFrom<RawCommandDataOption> for CommandDataOption {
    type Error = OptionDecodeError;

    fn try_from(raw: RawCommandDataOption) -> Result<Self, Self::Error> {
        let RawCommandDataOption {
            name,
            kind,
            value,
            options,
            focused,
        } = raw;

        let value = match (kind, value) {
            (Some(CommandOptionType::SubCommand), _) => {
                CommandOptionValue::SubCommand(options.unwrap_or_default())
            }
            (Some(CommandOptionType::SubCommandGroup), _) => {
                CommandOptionValue::SubCommandGroup(options.unwrap_or_default())
            }
            (_, None) | (_, Some(Value::Null)) => match options {
                Some(nested) => CommandOptionValue::SubCommand(nested),
                None => CommandOptionValue::Absent,
            },
            (Some(kind), Some(value)) => decode_typed(&name, kind, value)?,
            (None, Some(value)) => decode_inferred(&name, value)?,
        };

        Ok(CommandDataOption {
            name,
            kind,
            value,
            focused,
        })
    }
}

fn decode_typed(
    name: &str,
    kind: CommandOptionType,
    value: Value,
) -> Result<CommandOptionValue, OptionDecodeError> {
    let decoded = match (kind, &value) {
        (CommandOptionType::String, Value::String(s)) => Some(CommandOptionValue::String(s.clone())),
        (CommandOptionType::Integer, Value::Number(n)) => n.as_i64().map(CommandOptionValue::Integer),
        (CommandOptionType::Number, Value::Number(n)) => n.as_f64().map(CommandOptionValue::Number),
        (CommandOptionType::Boolean, Value::Bool(b)) => Some(CommandOptionValue::Boolean(*b)),
        (
            CommandOptionType::User
            | CommandOptionType::Channel
            | CommandOptionType::Role
            | CommandOptionType::Mentionable
            | CommandOptionType::Attachment,
            Value::String(id),
        ) => Some(CommandOptionValue::Entity {
            kind,
            id: id.clone(),
        }),
        _ => None,
    };

    decoded.ok_or_else(|| OptionDecodeError::MismatchedValue {
        name: name.to_string(),
        kind,
        value,
    })
}

fn decode_inferred(name: &str, value: Value) -> Result<CommandOptionValue, OptionDecodeError> {
    match value {
        Value::String(s) => Ok(CommandOptionValue::String(s)),
        Value::Bool(b) => Ok(CommandOptionValue::Boolean(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(CommandOptionValue::Integer(i)),
            None => n
                .as_f64()
                .map(CommandOptionValue::Number)
                .ok_or_else(|| OptionDecodeError::UnsupportedValue {
                    name: name.to_string(),
                    value: Value::Number(n),
                }),
        },
        other => Err(OptionDecodeError::UnsupportedValue {
            name: name.to_string(),
            value: other,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> serde_json::Result<ApplicationCommand> {
        serde_json::from_str(raw)
    }

    #[test]
    fn decodes_options_without_explicit_types() {
        let command =
            decode(r#"{"id":"123456789","name":"poke","options":[{"name":"poke","value":"test"}]}"#)
                .unwrap();

        let option = command.option("poke").unwrap();
        assert_eq!(option.kind, None);
        assert_eq!(option.value, CommandOptionValue::String("test".into()));
    }

    #[test]
    fn decodes_typed_scalar_options() {
        let command = decode(
            r#"{"id":"1","name":"create","type":1,"options":[
                {"name":"map","type":3,"value":"italy"},
                {"name":"max_players","type":4,"value":8},
                {"name":"modded","type":5,"value":true},
                {"name":"ratio","type":10,"value":0.5},
                {"name":"owner","type":6,"value":"80351110224678912"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(command.r#type, COMMAND_TYPE_CHAT_INPUT);
        assert_eq!(command.option("map").unwrap().value.as_str(), Some("italy"));
        assert_eq!(command.option("max_players").unwrap().value.as_i64(), Some(8));
        assert_eq!(command.option("modded").unwrap().value.as_bool(), Some(true));
        assert_eq!(command.option("ratio").unwrap().value.as_f64(), Some(0.5));
        assert_eq!(
            command.option("owner").unwrap().value,
            CommandOptionValue::Entity {
                kind: CommandOptionType::User,
                id: "80351110224678912".into()
            }
        );
    }

    #[test]
    fn typed_option_with_wrong_value_kind_fails() {
        assert!(decode(r#"{"name":"create","options":[{"name":"max_players","type":4,"value":"8"}]}"#).is_err());
        assert!(decode(r#"{"name":"create","options":[{"name":"modded","type":5,"value":1}]}"#).is_err());
        assert!(decode(r#"{"name":"create","options":[{"name":"map","type":3,"value":3}]}"#).is_err());
    }

    #[test]
    fn unknown_option_type_fails() {
        assert!(decode(r#"{"name":"x","options":[{"name":"y","type":42,"value":"z"}]}"#).is_err());
    }

    #[test]
    fn structured_values_without_type_fail() {
        assert!(decode(r#"{"name":"x","options":[{"name":"y","value":{"a":1}}]}"#).is_err());
        assert!(decode(r#"{"name":"x","options":[{"name":"y","value":[1]}]}"#).is_err());
    }

    #[test]
    fn decodes_nested_subcommands() {
        let command = decode(
            r#"{"name":"server","options":[{"name":"start","type":1,"options":[{"name":"map","type":3,"value":"utah"}]}]}"#,
        )
        .unwrap();

        match &command.option("start").unwrap().value {
            CommandOptionValue::SubCommand(nested) => {
                assert_eq!(nested.len(), 1);
                assert_eq!(nested[0].value.as_str(), Some("utah"));
            }
            other => panic!("expected a subcommand, got {other:?}"),
        }
    }

    #[test]
    fn options_may_be_absent_or_null() {
        assert!(decode(r#"{"name":"destroy"}"#).unwrap().options.is_empty());
        assert!(decode(r#"{"name":"destroy","options":null}"#).unwrap().options.is_empty());
    }

    #[test]
    fn option_without_value_is_absent() {
        let command = decode(r#"{"name":"x","options":[{"name":"empty"}]}"#).unwrap();
        assert_eq!(command.option("empty").unwrap().value, CommandOptionValue::Absent);
    }

    #[test]
    fn wrong_top_level_kinds_fail() {
        assert!(decode(r#"{"name":5}"#).is_err());
        assert!(decode(r#"{"name":"x","options":"nope"}"#).is_err());
        assert!(decode(r#"{"name":"x","type":"1"}"#).is_err());
    }

    #[test]
    fn serializes_scalar_values_inline() {
        let command = decode(r#"{"id":"1","name":"x","options":[{"name":"n","type":4,"value":3}]}"#)
            .unwrap();
        let encoded = serde_json::to_value(&command).unwrap();

        assert_eq!(
            encoded,
            serde_json::json!({"id":"1","name":"x","type":0,"options":[{"name":"n","type":4,"value":3}]})
        );
    }

    #[test]
    fn displays_values_as_plain_text() {
        assert_eq!(CommandOptionValue::Integer(5).to_string(), "5");
        assert_eq!(CommandOptionValue::Boolean(false).to_string(), "false");
        assert_eq!(CommandOptionValue::String("gridmap_v2".into()).to_string(), "gridmap_v2");
    }
}
