//! TUI widget modules

pub mod breakdown;
pub mod header;
pub mod inputs;
pub mod popup;
pub mod progress_bars;
pub mod shortcuts;
pub mod tabs;
pub mod tariffs;

pub use breakdown::*;
pub use header::*;
pub use inputs::*;
pub use popup::*;
pub use progress_bars::*;
pub use shortcuts::*;
pub use tabs::*;
pub use tariffs::*;
