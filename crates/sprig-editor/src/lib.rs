pub mod commands;
pub mod dialog;
pub mod drag;
pub mod input;
pub mod session;

pub use commands::{Command, CommandState};
pub use dialog::{Dialog, DialogIntent};
pub use drag::{DragGesture, DragOutcome, DragPhase, classify, nearest_parent};
pub use input::InputEvent;
pub use session::{EditSession, TreeMutation};
