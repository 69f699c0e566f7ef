mod config;
mod node;
