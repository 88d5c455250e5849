pub mod snapshot;
pub mod tree_map;

pub use snapshot::{load_snapshot, save_snapshot};
pub use tree_map::{render_tree_map, save_tree_map};
