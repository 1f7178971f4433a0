pub mod details;
pub mod entity;
pub mod kind;
pub mod temporary;

pub use details::*;
pub use entity::*;
pub use kind::*;
pub use temporary::*;
