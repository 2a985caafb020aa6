pub mod display;
pub mod hit;
pub mod link;
pub mod view;

pub use display::{DisplayItem, Theme, build_display_list};
pub use hit::{hit_test, node_rect};
pub use link::{link_path, path_for};
pub use view::ViewTransform;
