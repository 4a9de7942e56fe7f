pub mod app;
pub mod config;
pub mod gesture;
pub mod input;
pub mod lyrics;
pub mod player;
pub mod presentation;
pub mod queue;
pub mod storage;
pub mod tui;
