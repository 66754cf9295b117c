//! Maven local repository adapter: POM model building and artifact lookup.

mod local_repository;
pub mod pom;

pub use local_repository::LocalRepository;
