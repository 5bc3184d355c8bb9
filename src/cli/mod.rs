pub mod commands;
pub mod response;
