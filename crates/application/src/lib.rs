// Application layer: request validation, the command pipeline and one use
// case per command/query.

pub mod cities;
pub mod files;
pub mod persons;
pub mod phone_numbers;
pub mod photos;
pub mod pipeline;
pub mod relations;
pub mod validation;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
