pub mod catalog;
pub mod listing;

pub use catalog::*;
pub use listing::*;
