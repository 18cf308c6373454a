//! Services layer (ports + adapters).
//!
//! - `ports`: wire contracts and collaborator traits.
//! - `adapters`: runtime implementations (tasks, subprocesses, files).

pub mod adapters;
pub mod ports;
