pub mod portfolio;
pub mod series;

pub use portfolio::*;
pub use series::*;
