// Domain layer: aggregates, repository contracts and the shared kernel.

pub mod city;
pub mod lookup;
pub mod paging;
pub mod person;
pub mod relation;
pub mod shared_kernel;
pub mod unit_of_work;

pub use shared_kernel::{DomainError, Gender, Result};
