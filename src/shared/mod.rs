use serenity::all::Colour;

pub mod middleware;
pub mod structs;
pub mod utility;

pub const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/discord-interaction-bot, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

pub const INTERACTION_ENDPOINT: &str = "/api/discord/interaction";

pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

pub const GITHUB_API_ROOT_ENDPOINT: &str = "https://api.github.com";
pub const GITHUB_WORKFLOW_DISPATCH_ENDPOINT: &str =
    "/repos/$REPOSITORY/actions/workflows/$WORKFLOW_ID/dispatches";
pub const GITHUB_ACCEPT_HEADER: &str = "application/vnd.github.v3+json";

pub const EMBED_COLOR: Colour = Colour::from_rgb(147, 156, 149);
