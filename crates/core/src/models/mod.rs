pub mod credentials;
pub mod modification;
pub mod request;
pub mod roster;
pub mod settings;
pub mod tenant;
