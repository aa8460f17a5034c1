//! Sort-last image compositing

pub mod compositor;
pub mod fragment;
pub mod framebuffer;
pub mod grab;
pub mod order;

pub use compositor::{CompositeStats, Compositor};
pub use fragment::{Fragment, FragmentSource, PixelBuffer};
pub use framebuffer::{Framebuffer, blend_over};
pub use grab::{dump_file_name, dump_frame, save_png};
pub use order::{OrderResolver, view_normal};
