pub mod attribute_tests;
pub mod namespace_tests;
pub mod normalizer_tests;
