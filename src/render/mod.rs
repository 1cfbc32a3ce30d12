//! SVG rasterization.
//!
//! | Piece | Where |
//! |---|---|
//! | **Backend seam** | [`RenderBackend`] trait, [`Clip`] geometry |
//! | **Production engine** | [`ChromeBackend`]: headless Chrome over CDP |
//! | **Output check** | [`check_png`]: PNG header decode + size check (`image`) |

pub mod backend;
pub mod chrome;

pub use backend::{Clip, RenderBackend, RenderError, check_png};
pub use chrome::ChromeBackend;
