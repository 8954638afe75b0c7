use command_macros::command_handler;

use crate::controller::discord::registry::InteractionContext;
use crate::shared::structs::discord::command::ApplicationCommand;
use crate::shared::structs::discord::response::InteractionResponse;

#[command_handler]
pub async fn poke(
    ctx: InteractionContext,
    _command: ApplicationCommand,
) -> anyhow::Result<InteractionResponse> {
    tracing::debug!(request_id = %ctx.request_id, "Responding to poke");
    Ok(InteractionResponse::message("Hello, world!"))
}
