//! Store access for the catalog. Each repository owns a pooled connection
//! handle and runs every write in its own transaction.

mod directors;
mod genres;
mod movies;

pub use directors::DirectorRepository;
pub use genres::GenreRepository;
pub use movies::MovieRepository;
