//! MCP (Model Context Protocol) server for the maat restaurant finder
//!
//! Exposes the restaurant search pipeline to AI assistants over stdio.
//!
//! # Architecture
//!
//! - `server`: the `rmcp` handler wiring everything below
//! - `tools`: find_restaurants, find_random_restaurant
//! - `resources`: restaurants://nearby, restaurants://keywords
//! - `prompts`: restaurant_recommendation
//! - `error`: error type and RFC 9457-style problem bodies
//!
//! # Transport
//!
//! JSON-RPC 2.0 over stdio. All logging goes to stderr so stdout carries
//! only protocol messages.

pub mod error;
pub mod prompts;
pub mod resources;
pub mod server;
pub mod tools;
pub mod types;

pub use error::{Error, Result};
pub use server::RestaurantServer;
