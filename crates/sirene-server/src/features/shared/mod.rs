//! Building blocks shared by feature slices
pub mod pagination;

#[cfg(test)]
pub mod test_helpers;
