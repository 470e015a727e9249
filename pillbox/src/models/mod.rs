mod pill;
mod search;

pub use pill::*;
pub use search::*;
