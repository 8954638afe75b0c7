// Lets `#[command_handler]` expansions name this crate by its absolute path from inside it too.
extern crate self as discord_interaction_bot;

pub mod controller;
pub mod shared;
