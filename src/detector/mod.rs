pub mod roster;
pub mod threshold;

pub use roster::RosterSet;
pub use threshold::meets_thresholds;
