pub mod test_support;
