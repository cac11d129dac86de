mod error_handling_tests;
mod reconnect_tests;
