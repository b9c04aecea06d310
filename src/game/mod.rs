//! Game rules: board graph, move legality, selection state machines, and the
//! per-match session.

pub mod board;
pub mod ghost;
pub mod legality;
pub mod session;
