pub mod command;
pub mod error;
pub mod generate;
pub mod loader;
pub mod model;
pub mod report;
pub mod session;
pub mod timing;

pub use error::{BenchError, Result};
pub use model::Model;
