pub mod local_tests;
pub mod blob_tests;
