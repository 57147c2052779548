pub mod commands;
pub mod config;
pub mod diff;
pub mod extractor;
pub mod messages;
pub mod model;
pub mod notifier;
pub mod store;
pub mod watcher;
