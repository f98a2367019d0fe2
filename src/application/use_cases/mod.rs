mod index_file;
mod index_project;

pub use index_file::*;
pub use index_project::*;
