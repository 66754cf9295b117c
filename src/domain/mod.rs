pub mod artifact;
pub mod class_dumper;
pub mod classpath;
pub mod collector;
pub mod dependency_graph;
pub mod dependency_tree;
pub mod error;
pub mod graph_builder;
pub mod linkage;
pub mod ports;
pub mod signature;
