pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod download;
pub mod global;
pub mod media;
pub mod pexels;
pub mod themes;
