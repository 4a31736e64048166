//! Canvas state machine and the context it owns.

mod context;
mod event;
mod machine;
mod state;

pub use context::CanvasContext;
pub use event::CanvasEvent;
pub use machine::CanvasStateMachine;
pub use state::{CanvasState, CanvasStatus};
