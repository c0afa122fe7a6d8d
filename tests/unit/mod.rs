mod common;
mod concurrency_tests;
mod delivery_tests;
mod scenario_tests;
