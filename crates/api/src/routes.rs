pub mod auth;
pub mod developer;
pub mod employees;
pub mod health;
pub mod portal;
pub mod public;
pub mod requests;
pub mod roster;
pub mod settings;
