mod codec;
mod file;
mod interface;
mod memory;

pub use codec::*;
pub use file::*;
pub use interface::*;
pub use memory::*;
