mod bus;
mod simulated;
mod types;

pub use bus::{BlockSource, BlockSubscription};
pub use simulated::SimulatedBlockSource;
pub use types::{Chain, SynthMessage};
