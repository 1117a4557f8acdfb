/// Mapper configuration
///
/// Settings a [`MapperContext`](super::MapperContext) hands to every processor
/// it builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperConfig {
    /// Separator between the segments of a nested column path
    pub path_delimiter: char,

    /// Separator inserted by decamelization (`userId` -> `user_id`)
    pub name_separator: char,
}

impl MapperConfig {
    pub fn new() -> Self {
        Self {
            path_delimiter: '$',
            name_separator: '_',
        }
    }

    /// Set the nested path delimiter
    pub fn path_delimiter(mut self, delimiter: char) -> Self {
        self.path_delimiter = delimiter;
        self
    }

    /// Set the decamelization separator
    pub fn name_separator(mut self, separator: char) -> Self {
        self.name_separator = separator;
        self
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self::new()
    }
}
