use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use serenity::all::CreateEmbed;

use crate::controller::discord::registry::{CommandHandler, CommandRegistry, InteractionContext};
use crate::shared::structs::config::GitHubWorkflowConfig;
use crate::shared::structs::discord::command::ApplicationCommand;
use crate::shared::structs::discord::response::{
    InteractionResponse, InteractionResponseData, RESPONSE_TYPE_CHANNEL_MESSAGE_WITH_SOURCE,
};
use crate::shared::{
    EMBED_COLOR, GITHUB_ACCEPT_HEADER, GITHUB_WORKFLOW_DISPATCH_ENDPOINT, USER_AGENT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Apply,
    Destroy,
}

impl WorkflowAction {
    fn as_input(&self) -> &'static str {
        match self {
            WorkflowAction::Apply => "apply",
            WorkflowAction::Destroy => "destroy",
        }
    }

    fn reply(&self) -> &'static str {
        match self {
            WorkflowAction::Apply => "Server Creation Initiated!",
            WorkflowAction::Destroy => "Server Destruction Initiated!",
        }
    }
}

/// Game server settings read from the `create` command's options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub map: String,
    pub modded: String,
    pub max_players: String,
    pub max_cars: String,
    pub private: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            map: "gridmap_v2".into(),
            modded: "false".into(),
            max_players: "5".into(),
            max_cars: "1".into(),
            private: "true".into(),
        }
    }
}

impl ServerSettings {
    pub fn from_command(ctx: &InteractionContext, command: &ApplicationCommand) -> Self {
        let mut settings = ServerSettings::default();

        if command.options.is_empty() {
            tracing::info!(request_id = %ctx.request_id, "Application command received without options");
        }

        for option in &command.options {
            if !option.value.is_scalar() {
                tracing::error!(
                    request_id = %ctx.request_id,
                    option = %option.name,
                    "Command option received without value"
                );
                continue;
            }

            let value = option.value.to_string();
            match option.name.as_str() {
                "map" => settings.map = value,
                "modded" => settings.modded = value,
                "max_players" => settings.max_players = value,
                "max_cars" => settings.max_cars = value,
                "private" => settings.private = value,
                other => tracing::warn!(
                    request_id = %ctx.request_id,
                    option = %other,
                    "Unrecognised command option received"
                ),
            }
        }

        settings
    }

    fn embed(&self) -> CreateEmbed {
        CreateEmbed::new()
            .title("Server settings")
            .colour(EMBED_COLOR)
            .field("Map", &self.map, true)
            .field("Modded", &self.modded, true)
            .field("Max players", &self.max_players, true)
            .field("Max cars", &self.max_cars, true)
            .field("Private", &self.private, true)
    }
}

/// Triggers a GitHub Actions `workflow_dispatch` run.
#[derive(Debug, Clone)]
pub struct WorkflowDispatch {
    http_client: reqwest::Client,
    endpoint: String,
    git_ref: String,
    token: String,
    action: WorkflowAction,
}

impl WorkflowDispatch {
    pub fn new(
        http_client: reqwest::Client,
        config: &GitHubWorkflowConfig,
        token: impl Into<String>,
        action: WorkflowAction,
    ) -> Self {
        let path = GITHUB_WORKFLOW_DISPATCH_ENDPOINT
            .replace("$REPOSITORY", &config.repository)
            .replace("$WORKFLOW_ID", &config.workflow_id);

        WorkflowDispatch {
            http_client,
            endpoint: format!("{}{}", config.api_base_url.trim_end_matches('/'), path),
            git_ref: config.git_ref.clone(),
            token: token.into(),
            action,
        }
    }

    pub fn payload(&self, settings: Option<&ServerSettings>) -> Value {
        let inputs = match settings {
            Some(settings) => json!({
                "action": self.action.as_input(),
                "map": settings.map,
                "modded": settings.modded,
                "max_players": settings.max_players,
                "max_cars": settings.max_cars,
                "private": settings.private,
            }),
            None => json!({ "action": self.action.as_input() }),
        };

        json!({ "ref": self.git_ref, "inputs": inputs })
    }

    async fn dispatch(&self, payload: &Value) -> anyhow::Result<()> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT_HEADER)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Unexpected response status code from GitHub: {status}, body: {body}");
        }

        Ok(())
    }
}

#[async_trait]
impl CommandHandler for WorkflowDispatch {
    async fn handle(
        &self,
        ctx: InteractionContext,
        command: ApplicationCommand,
    ) -> anyhow::Result<InteractionResponse> {
        let settings = match self.action {
            WorkflowAction::Apply => Some(ServerSettings::from_command(&ctx, &command)),
            WorkflowAction::Destroy => None,
        };

        let payload = self.payload(settings.as_ref());
        if let Err(e) = self.dispatch(&payload).await {
            tracing::error!(request_id = %ctx.request_id, "Unable to make POST request to GitHub: {e:?}");
            return Err(e);
        }

        let mut data = InteractionResponseData::new().content(self.action.reply());
        if let Some(settings) = settings {
            data = data.embed(serde_json::to_value(settings.embed())?);
        }

        Ok(InteractionResponse::with_data(
            RESPONSE_TYPE_CHANNEL_MESSAGE_WITH_SOURCE,
            data,
        ))
    }
}

/// Registers `create` and `destroy` against the configured workflow.
pub fn register_server_commands(
    registry: &mut CommandRegistry,
    http_client: reqwest::Client,
    config: &GitHubWorkflowConfig,
    token: &str,
) {
    registry.register(
        "create",
        WorkflowDispatch::new(http_client.clone(), config, token, WorkflowAction::Apply),
    );
    registry.register(
        "destroy",
        WorkflowDispatch::new(http_client, config, token, WorkflowAction::Destroy),
    );
}
