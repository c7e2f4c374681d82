pub mod alert_history;

pub use alert_history::{AlertHistory, AlertKey};
