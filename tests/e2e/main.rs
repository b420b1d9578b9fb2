mod feedback_tests;
mod offline_tests;
mod sync_tests;
