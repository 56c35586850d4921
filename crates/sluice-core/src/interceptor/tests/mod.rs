pub mod support;
pub mod lifecycle_tests;
pub mod builtin_tests;
