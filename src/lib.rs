pub mod classifier;
pub mod cli;
pub mod config;
pub mod events;
pub mod mover;
pub mod organizer;
pub mod stability;
pub mod watcher;

pub use classifier::*;
pub use cli::*;
pub use config::*;
pub use events::*;
pub use mover::*;
pub use organizer::*;
pub use stability::*;
pub use watcher::*;
