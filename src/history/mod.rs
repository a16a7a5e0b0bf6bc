pub mod change;
pub mod replay;

pub use change::{Change, ChangeHistory, Record};
pub use replay::{Direction, replay};
