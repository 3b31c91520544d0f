pub mod markup_tests;
pub mod value_tests;
