pub mod logging;
pub mod string_utils;

pub use string_utils::{mask_value, truncate_safe, truncate_with_ellipsis};
