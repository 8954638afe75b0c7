pub mod interaction;
pub mod pipeline;
pub mod poke;
pub mod registry;
pub mod server;
