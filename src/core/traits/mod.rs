pub mod repository;

pub use repository::{collect_pages, Page};
