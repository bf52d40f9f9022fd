pub mod backend;
pub mod font;
pub mod gradient;
pub mod layout;
pub mod renderer;
pub mod surface;
