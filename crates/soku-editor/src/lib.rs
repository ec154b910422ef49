pub mod board;
pub mod commands;
pub mod drag;
pub mod input;
pub mod interaction;
pub mod session;
pub mod shortcuts;

pub use board::{BlockMutation, Board};
pub use commands::CommandStack;
pub use drag::{DragPayload, GrabOffset};
pub use input::{Hit, InputEvent, Modifiers};
pub use interaction::{EditMode, Interaction};
pub use session::{KeyAction, KeyResult, Session, SessionConfig};
