mod get_attesting_indices;

pub use get_attesting_indices::get_attesting_indices;
