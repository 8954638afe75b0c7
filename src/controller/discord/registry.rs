use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::shared::structs::discord::command::ApplicationCommand;
use crate::shared::structs::discord::interaction::Interaction;
use crate::shared::structs::discord::response::InteractionResponse;

pub const UNREGISTERED_COMMAND_CONTENT: &str = "Unregistered command";

/// Per-request information handed to every command handler alongside the command itself.
#[derive(Debug, Clone, Default)]
pub struct InteractionContext {
    pub request_id: Uuid,
    pub interaction_id: String,
    pub application_id: String,
    pub token: String,
    pub guild_id: String,
    pub channel_id: String,
    pub locale: String,
}

impl InteractionContext {
    pub fn new(request_id: Uuid, interaction: &Interaction) -> Self {
        InteractionContext {
            request_id,
            interaction_id: interaction.id.clone(),
            application_id: interaction.application_id.clone(),
            token: interaction.token.clone(),
            guild_id: interaction.guild_id.clone(),
            channel_id: interaction.channel_id.clone(),
            locale: interaction.locale.clone(),
        }
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: InteractionContext,
        command: ApplicationCommand,
    ) -> anyhow::Result<InteractionResponse>;
}

#[async_trait]
impl<F, Fut> CommandHandler for F
where
    F: Fn(InteractionContext, ApplicationCommand) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<InteractionResponse>> + Send + 'static,
{
    async fn handle(
        &self,
        ctx: InteractionContext,
        command: ApplicationCommand,
    ) -> anyhow::Result<InteractionResponse> {
        self(ctx, command).await
    }
}

/// Exact-name lookup from command name to handler.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `handler` to `name`, replacing any handler previously bound to it.
    pub fn register(&mut self, name: impl Into<String>, handler: impl CommandHandler + 'static) {
        let name = name.into();
        if self.handlers.insert(name.clone(), Arc::new(handler)).is_some() {
            tracing::warn!(command = %name, "Replaced an existing command handler");
        }
    }

    pub fn with(mut self, name: impl Into<String>, handler: impl CommandHandler + 'static) -> Self {
        self.register(name, handler);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs the handler registered under `command.name`, or answers with the
    /// "Unregistered command" message when there is none. Handler results are returned as-is.
    pub async fn dispatch(
        &self,
        ctx: InteractionContext,
        command: ApplicationCommand,
    ) -> anyhow::Result<InteractionResponse> {
        match self.handlers.get(command.name.as_str()) {
            Some(handler) => {
                tracing::info!(
                    request_id = %ctx.request_id,
                    command = %command.name,
                    "Dispatching application command"
                );
                handler.handle(ctx, command).await
            }
            None => {
                tracing::warn!(
                    request_id = %ctx.request_id,
                    command = %command.name,
                    "Received an unregistered command"
                );
                Ok(InteractionResponse::message(UNREGISTERED_COMMAND_CONTENT))
            }
        }
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("CommandRegistry")
            .field("commands", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::shared::structs::discord::response::{
        InteractionResponseData, RESPONSE_TYPE_CHANNEL_MESSAGE_WITH_SOURCE,
    };

    fn command(name: &str) -> ApplicationCommand {
        ApplicationCommand {
            id: "1234567890".into(),
            name: name.into(),
            r#type: 2,
            ..Default::default()
        }
    }

    async fn hello(
        _ctx: InteractionContext,
        _command: ApplicationCommand,
    ) -> anyhow::Result<InteractionResponse> {
        Ok(InteractionResponse::message("Hello, world!"))
    }

    #[tokio::test]
    async fn falls_back_when_no_command_is_registered() {
        let registry = CommandRegistry::new();

        let response = registry
            .dispatch(InteractionContext::default(), command("poke"))
            .await
            .unwrap();

        assert_eq!(response.r#type, RESPONSE_TYPE_CHANNEL_MESSAGE_WITH_SOURCE);
        assert_eq!(response.data.content.as_deref(), Some(UNREGISTERED_COMMAND_CONTENT));
        assert!(!response.data.tts);
    }

    #[tokio::test]
    async fn falls_back_for_names_that_only_differ_in_case() {
        let registry = CommandRegistry::new().with("poke", hello);

        let response = registry
            .dispatch(InteractionContext::default(), command("Poke"))
            .await
            .unwrap();

        assert_eq!(response.data.content.as_deref(), Some(UNREGISTERED_COMMAND_CONTENT));
    }

    #[tokio::test]
    async fn returns_the_handler_result_unmodified() {
        let expected = InteractionResponse::with_data(
            RESPONSE_TYPE_CHANNEL_MESSAGE_WITH_SOURCE,
            InteractionResponseData::new().content("custom").tts(true).flags(64),
        );
        let returned = expected.clone();
        let registry = CommandRegistry::new().with(
            "poke",
            move |_ctx: InteractionContext, _command: ApplicationCommand| {
                let returned = returned.clone();
                async move { Ok::<_, anyhow::Error>(returned) }
            },
        );

        let response = registry
            .dispatch(InteractionContext::default(), command("poke"))
            .await
            .unwrap();

        assert_eq!(response, expected);
    }

    #[tokio::test]
    async fn invokes_only_the_matching_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let poke_calls = calls.clone();
        let registry = CommandRegistry::new()
            .with(
                "poke",
                move |_ctx: InteractionContext, command: ApplicationCommand| {
                    let poke_calls = poke_calls.clone();
                    async move {
                        poke_calls.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, anyhow::Error>(InteractionResponse::message(command.name))
                    }
                },
            )
            .with("other", |_ctx: InteractionContext, _command: ApplicationCommand| async {
                Err::<InteractionResponse, _>(anyhow::anyhow!("the wrong handler ran"))
            });

        let response = registry
            .dispatch(InteractionContext::default(), command("poke"))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.data.content.as_deref(), Some("poke"));
    }

    #[tokio::test]
    async fn propagates_handler_errors() {
        let registry = CommandRegistry::new().with(
            "broken",
            |_ctx: InteractionContext, _command: ApplicationCommand| async {
                Err::<InteractionResponse, _>(anyhow::anyhow!("workflow dispatch failed"))
            },
        );

        let error = registry
            .dispatch(InteractionContext::default(), command("broken"))
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "workflow dispatch failed");
    }

    #[tokio::test]
    async fn async_fn_items_are_handlers() {
        let mut registry = CommandRegistry::new();
        registry.register("hello", hello);

        assert!(registry.contains("hello"));
        assert_eq!(registry.len(), 1);

        let response = registry
            .dispatch(InteractionContext::default(), command("hello"))
            .await
            .unwrap();
        assert_eq!(response.data.content.as_deref(), Some("Hello, world!"));
    }

    #[test]
    fn context_copies_envelope_fields() {
        let interaction = Interaction {
            id: "i".into(),
            application_id: "a".into(),
            token: "t".into(),
            guild_id: "g".into(),
            channel_id: "c".into(),
            locale: "en-US".into(),
            ..Default::default()
        };
        let request_id = Uuid::now_v7();

        let ctx = InteractionContext::new(request_id, &interaction);

        assert_eq!(ctx.request_id, request_id);
        assert_eq!(ctx.interaction_id, "i");
        assert_eq!(ctx.application_id, "a");
        assert_eq!(ctx.token, "t");
        assert_eq!(ctx.guild_id, "g");
        assert_eq!(ctx.channel_id, "c");
        assert_eq!(ctx.locale, "en-US");
    }
}
