pub mod markup;
pub mod renderer;
pub mod report;

pub use markup::build_markup;
pub use renderer::{MockRenderer, RenderError, Renderer, TypstRenderer};
pub use report::{Branding, GroupReport};
