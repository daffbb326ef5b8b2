pub mod team;
pub mod user;

pub use team::Team;
pub use user::{User, UserProfile};
