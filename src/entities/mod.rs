mod comic;
mod cover_date;
mod username;

pub use comic::*;
pub use cover_date::*;
pub use username::*;
