//! Main module for md2aditor library functionality

pub mod assets;
pub mod ast;
pub mod config;
pub mod lexing;
pub mod loader;
pub mod parsing;
pub mod settings;
pub mod token;
