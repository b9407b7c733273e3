//! Racebar - rolling popularity tables for racing bar charts
//!
//! This library turns a flat export of timestamped records (one per deck,
//! keyed by investigator) into dense time-by-entity count matrices and
//! rolling-window sums, ready for an animated bar chart renderer.
//!
//! Stages: [`loader`] -> [`dedup`] -> [`bucket`] -> [`matrix`] (aggregate,
//! gap-fill, rolling) -> [`render`]. [`pipeline`] wires them together.

pub mod bucket;
pub mod cli;
pub mod csv_output;
pub mod dedup;
pub mod event;
pub mod filter;
pub mod json_output;
pub mod loader;
pub mod matrix;
pub mod pipeline;
pub mod render;
pub mod stats;
