mod comic_query;

pub use comic_query::*;
