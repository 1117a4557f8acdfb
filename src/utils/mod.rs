pub mod lower_key_map;
pub mod naming;

pub use lower_key_map::LowerKeyMap;
pub use naming::{camelize, decamelize, decamelize_with};
