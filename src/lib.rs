//! # gedchart: GEDCOM descendant charts
//!
//! Reads a GEDCOM file and prints an indented text chart of a person's or
//! family's descendants, optionally pruned to the records related to that
//! root.
//!
//! ## Architecture
//!
//! - **[`gedcom`]**: GEDCOM line reader producing record events
//! - **[`graph`]**: Person/family graph, event ingestion, subgraph selection
//! - **[`chart`]**: Name labels and the descendant chart renderer
//! - **[`config`]**: Chart options (JSON file + CLI overrides) and validation

pub mod chart;
pub mod config;
pub mod gedcom;
pub mod graph;
