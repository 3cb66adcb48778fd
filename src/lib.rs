//! REST API over a MongoDB collection of songs.
//!
//! - [`routers`] maps HTTP routes onto handlers and builds the [`axum::Router`]
//! - [`controllers`] holds the song operations and their error responses
//! - [`db`] is the document store port with its MongoDB and in-memory adapters
//! - [`models`] covers song ids, payload parsing and JSON rendering
//! - [`secrets`] reads configuration from the environment

pub mod controllers;
pub mod db;
pub mod models;
pub mod routers;
pub mod secrets;

pub use routers::{app, AppState};
