//! Class-file assembler, jar writer, repository fixtures and in-memory ports
//! shared by the integration suites.
#![allow(dead_code)]

pub mod fixtures;
pub mod mock;
