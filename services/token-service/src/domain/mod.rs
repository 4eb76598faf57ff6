//! 领域层

pub mod entities;
pub mod keys;
pub mod repositories;
pub mod unit_of_work;

pub use entities::*;
pub use keys::*;
pub use repositories::*;
pub use unit_of_work::*;
