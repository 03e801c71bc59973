//! Encoding for categorical columns.

mod one_hot;

pub use one_hot::{FittedOneHotEncoder, OneHotEncoder};
