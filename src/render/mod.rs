pub mod figure;
pub mod style;

use anyhow::Result;
use crate::data::types::Frame;

/// Consumes one frame per tick. Presentation only; never feeds back into the
/// series.
pub trait Renderer {
    fn name(&self) -> &str;

    fn render(&mut self, frame: &Frame) -> Result<()>;
}
