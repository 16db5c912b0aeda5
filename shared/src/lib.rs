pub mod error;
pub mod models;
pub mod tally;
pub mod validation;

pub use error::{ErrorCode, ErrorResponse};
pub use models::*;
pub use tally::{tally, Counters};
pub use validation::*;

#[cfg(test)]
mod tests;
