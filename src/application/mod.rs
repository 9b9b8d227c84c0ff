//! Application services coordinating domain logic and the model port.

pub mod assessment;

pub use assessment::AssessmentService;
