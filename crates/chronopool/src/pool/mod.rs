mod ids;
mod shuffle;

pub use ids::*;
pub use shuffle::*;
