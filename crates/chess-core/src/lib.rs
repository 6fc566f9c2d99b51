//! Rules-engine adapter shared by the tactics crates.
//!
//! Everything here works from FEN strings and SAN/UCI text: positions are
//! rebuilt per call, moves are decoded against the position they were played
//! in, and illegal input decodes to `None` instead of an error.

pub mod error;
pub mod gambits;
pub mod notation;
pub mod side;

pub use error::CoreError;
pub use side::Side;
