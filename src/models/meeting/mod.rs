pub mod types;
pub mod queries;
pub mod availability;

pub use types::*;
pub use queries::*;
pub use availability::*;
