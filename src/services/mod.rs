//! Domain services used by the websocket route.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business logic and persistence concerns so route
//! handlers can stay focused on protocol translation. `game` is the entry
//! point for every session command; the rest are its collaborators.

pub mod clock;
pub mod directory;
pub mod finalize;
pub mod game;
pub mod lobby;
pub mod rating;
pub mod store;
