use discord_interaction_bot::controller::build_router;
use discord_interaction_bot::controller::discord::pipeline::{BotConfig, InteractionPipeline};
use discord_interaction_bot::controller::discord::poke::register_poke;
use discord_interaction_bot::controller::discord::registry::CommandRegistry;
use discord_interaction_bot::controller::discord::server::register_server_commands;
use discord_interaction_bot::shared::structs::AppState;
use discord_interaction_bot::shared::structs::config::{Configuration, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = Configuration::load()?;
    initialize_tracing(&configuration);

    let public_key = std::env::var("APPLICATION_PUBLIC_KEY")
        .map_err(|e| anyhow::anyhow!("Unable to retrieve APPLICATION_PUBLIC_KEY: {e}"))?;

    let mut registry = CommandRegistry::new();
    register_poke(&mut registry);

    if let Some(workflow) = &configuration.github_workflow {
        let token = std::env::var("GITHUB_TOKEN")
            .map_err(|e| anyhow::anyhow!("Unable to retrieve GITHUB_TOKEN: {e}"))?;
        register_server_commands(&mut registry, reqwest::Client::new(), workflow, &token);
    }

    tracing::info!(?registry, "Registered application commands");

    let bot_config = BotConfig::new(public_key, registry)?;
    let mut pipeline = InteractionPipeline::new(bot_config);
    if let Some(max_age) = configuration.max_timestamp_age() {
        pipeline = pipeline.with_max_timestamp_age(max_age);
    }

    let app = build_router(AppState::new(pipeline));

    let server_bind_point = configuration.bind_address();
    let listener = tokio::net::TcpListener::bind(&server_bind_point).await?;
    tracing::info!("Listening on {}", &server_bind_point);
    axum::serve(listener, app).await?;

    Ok(())
}

fn initialize_tracing(configuration: &Configuration) {
    let builder =
        tracing_subscriber::FmtSubscriber::builder().with_max_level(configuration.tracing_level());

    let result = match configuration.log_format {
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };

    if let Err(e) = result {
        eprintln!(
            "Initialization of tracing subscriber failed with error: {}",
            e
        );
    }
}
