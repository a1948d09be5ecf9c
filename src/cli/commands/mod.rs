pub mod config;
pub mod fairytale;
pub mod image;
pub mod translate;
