pub mod entries;
pub mod record;

pub use entries::*;
pub use record::*;
