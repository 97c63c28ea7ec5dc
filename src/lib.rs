//! ShopSmart - AI shopping assistant and research toolkit
//!
//! Two applications share this library:
//!
//! - The shopping assistant: an axum-served chat UI that turns natural
//!   language into cart mutations via a Gemini-backed agent.
//! - The research assistant: a terminal agent with a tool-calling loop
//!   for web search and saving findings to files.

pub mod config;
pub mod conversation;
pub mod core;
pub mod providers;
pub mod research;
pub mod routes;
