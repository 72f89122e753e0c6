pub mod support;

mod session_tests;
mod wizard_tests;
mod search_tests;
