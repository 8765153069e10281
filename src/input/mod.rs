pub mod parser;

pub use parser::{TileInput, load_tile, parse_tile};
