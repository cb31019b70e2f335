pub mod relay;
pub mod room;
