//! dependency-linkage library: static linkage checks over JVM class archives
//! and Maven-style dependency graphs.

pub mod adapters;
pub mod app;
pub mod classfile;
pub mod cli;
pub mod domain;
pub mod server;
