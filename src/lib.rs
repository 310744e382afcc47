//! Command line front end for the PCSO lotto data pipeline.

pub mod bench;
pub mod cli;
