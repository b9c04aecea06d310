//! Wall Game server: authoritative two-player wall-building matches over a
//! websocket protocol, with clocks, Glicko-2 ratings and optional Postgres
//! persistence.
//!
//! The binary in `main.rs` only wires configuration, the store and the
//! background clock into the router built here.

pub mod config;
pub mod db;
pub mod game;
pub mod protocol;
pub mod routes;
pub mod services;
pub mod state;
