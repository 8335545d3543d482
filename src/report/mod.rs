//! Report serialization.
//!
//! This module renders the accumulated query results into the flat text
//! report and writes it to disk.

pub mod generator;
