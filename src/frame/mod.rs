//! Frame lifecycle of a render node

pub mod animation;
pub mod driver;
pub mod redraw;
pub mod status;

pub use animation::{FOLLOW_LATEST, FrameStep, FrameWindow, advance_frame};
pub use driver::{DrawStats, FrameDriver};
pub use redraw::{RedrawNotifier, RedrawReason, RedrawRequest, RedrawScheduler, redraw_channel};
pub use status::{FrameStatus, INVALID_FRAME};
