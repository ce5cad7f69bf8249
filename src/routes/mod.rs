pub mod auth;
pub mod events;
pub mod health;
pub mod members;
pub mod schedules;
pub mod settings;
