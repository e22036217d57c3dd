pub mod assets;
pub mod config;
pub mod console;
pub mod errors;
pub mod handlers;
pub mod illustration;
pub mod livekit;
pub mod routes;
pub mod session;
pub mod state;
pub mod tools;
pub mod worker;

// Re-export commonly used items for convenience
pub use config::AgentConfig;
pub use errors::{AppError, AppResult};
pub use session::AgentSession;
pub use state::AppState;
pub use tools::Assistant;
