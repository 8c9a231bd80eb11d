pub mod config;
pub mod entries;
pub mod extract;
pub mod generate;
