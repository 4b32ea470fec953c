//! Command-line front end for the attachment client: argument parsing,
//! confirmation prompts and the list/download/add/remove commands.

pub mod commands;
pub mod config;
pub mod prompt;
