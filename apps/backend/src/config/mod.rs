pub mod game;
pub mod server;

pub use game::GameOptions;
pub use server::ServerConfig;
