pub mod model;
pub mod service;

pub use model::{CreateUserPayload, Member, UpdateUserPayload, User};
pub use service::*;
