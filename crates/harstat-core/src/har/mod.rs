mod reader;
mod types;

pub use reader::HarReader;
pub use types::*;
