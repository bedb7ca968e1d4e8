//! Edges of the crate: the scenario CSV format and the response surface.

pub mod csv;
pub mod response;
