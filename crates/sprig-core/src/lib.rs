pub mod config;
pub mod error;
pub mod id;
pub mod layout;
pub mod model;
pub mod outline;

pub use config::TreeConfig;
pub use error::{EditError, EditResult};
pub use id::NodeId;
pub use layout::{Extent, Link, PositionedNode, PositionedTree, resolve_layout};
pub use model::{Tree, TreeNode, normalize_name};
pub use outline::{NodeSpec, demo_outline};
