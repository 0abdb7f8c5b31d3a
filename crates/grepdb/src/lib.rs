//! grepdb: search the text fields of database records for a regular
//! expression and show where each match sits in its value.

pub mod admin;
pub mod cli;
pub mod config;
pub mod highlight;
pub mod identifier;
