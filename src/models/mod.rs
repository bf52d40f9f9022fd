pub mod animation;
pub mod battery;
