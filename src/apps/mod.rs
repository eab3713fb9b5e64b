mod concat;
mod player;

pub use concat::*;
pub use player::*;
