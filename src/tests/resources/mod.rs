mod aggregation_tests;
mod operation_tests;
mod session_tests;
