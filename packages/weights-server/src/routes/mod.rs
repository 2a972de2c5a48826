// HTTP routes
pub mod health;
pub mod weights;

pub use health::*;
pub use weights::*;
