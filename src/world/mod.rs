//! Pure gameplay state. Nothing in this tree touches browser types, so every
//! rule can be exercised headless in plain unit tests.

pub mod actor;
pub mod background;
pub mod obstacles;
pub mod session;

pub use session::{Phase, Session};
