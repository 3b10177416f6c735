pub mod record;
pub mod upload;

pub use record::*;
pub use upload::*;
