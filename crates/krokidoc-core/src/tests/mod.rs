mod config;
mod options;
mod style;
