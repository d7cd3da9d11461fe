mod pool;
mod var;

pub use pool::*;
pub use var::*;
