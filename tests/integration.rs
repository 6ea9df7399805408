//! Integration test harness. Cargo only picks up top-level files in
//! tests/, so the suite modules are declared here.

mod integration {
    pub mod api_tests;
}
