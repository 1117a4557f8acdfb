//! Property-name to column-name conversion used by convention-mode matching.

/// Inserts `_` before every upper-case character except a leading one and
/// lower-cases the result: `userId` becomes `user_id`.
pub fn decamelize(identifier: &str) -> String {
    decamelize_with(identifier, '_')
}

pub fn decamelize_with(identifier: &str, separator: char) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    for (i, c) in identifier.chars().enumerate() {
        if i != 0 && c.is_uppercase() {
            out.push(separator);
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// lowerCamelCase form of a snake_case identifier: `user_id` becomes `userId`.
/// A leading `r#` is dropped.
pub fn camelize(identifier: &str) -> String {
    let identifier = identifier.trim_start_matches("r#");
    let mut out = String::with_capacity(identifier.len());
    let mut upper_next = false;
    for c in identifier.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
