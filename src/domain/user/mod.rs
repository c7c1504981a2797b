pub mod commands;
pub mod entity;
