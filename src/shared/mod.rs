pub mod constants;
pub mod slugs;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_helpers;
