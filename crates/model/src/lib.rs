pub mod command;
pub mod dq;
pub mod error;
pub mod meta;
pub mod report;
pub mod sql;
pub mod table;
