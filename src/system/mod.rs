//! Core system components for robot operation
pub mod drive_command;
pub mod resources;
