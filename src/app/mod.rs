pub mod dto;
pub mod engine;
pub mod report;
pub mod settings;
