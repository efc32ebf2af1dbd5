pub mod auth;
pub mod email;
pub mod reminders;
pub mod state;
pub mod types;

pub use state::AppState;

pub use taskboard_atoms::users;
