pub mod actions;
pub mod binds;
pub mod error;
pub mod factory;
