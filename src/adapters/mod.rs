//! Infrastructure implementations of the domain ports.

pub mod archive;
pub mod maven;
