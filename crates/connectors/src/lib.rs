pub mod catalog;
pub mod error;
pub mod rest;
pub mod store;
pub mod warehouse;
