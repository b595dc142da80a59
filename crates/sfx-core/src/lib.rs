//! sfx-core: Shared types for the sound trigger scheduler
//!
//! Value types used by the descriptor model and the host boundary:
//! errors, closed parameter ranges, positions and spatial/routing fields.

mod error;
mod position;
mod range;
mod spatial;

pub use error::*;
pub use position::*;
pub use range::*;
pub use spatial::*;
