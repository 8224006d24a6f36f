//! portvis: stock portfolio visualizer and risk estimator.
//!
//! Hexagonal architecture: analytics and simulation in [`domain`], port traits
//! in [`ports`], concrete implementations in [`adapters`], and the command line
//! front end in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
