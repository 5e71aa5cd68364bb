pub mod classifier;
pub mod formatter;
pub mod rules;
pub mod settings;
pub mod web;
