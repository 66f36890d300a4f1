mod cycle;
mod interface;
mod system;

pub use cycle::*;
pub use interface::*;
pub use system::*;
