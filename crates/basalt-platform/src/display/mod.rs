pub mod swww;

pub use swww::{parse_query, SwwwDisplayAdapter};
