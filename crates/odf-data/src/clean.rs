//! Value cleanup applied while collecting records.
//!
//! Extracted ODF text often keeps the quotes from the source file
//! (`unitName = "Tank"` becomes `"\"Tank\""`), and numbers may arrive as
//! strings. Both fixes are optional and driven by [`CollectOptions`].

use odf_core::{Descriptor, PropertyMap, PropertyValue};
use regex::Regex;
use std::sync::LazyLock;

use crate::loader::CollectOptions;

/// Clean every property of `descriptor` in place, nested mappings included.
pub fn clean_descriptor(descriptor: &mut Descriptor, options: &CollectOptions) {
    if !options.strip_quotes && !options.coerce_numbers {
        return;
    }
    for section in descriptor.sections.values_mut() {
        clean_map(section, options);
    }
}

fn clean_map(map: &mut PropertyMap, options: &CollectOptions) {
    for value in map.values_mut() {
        clean_value(value, options);
    }
}

fn clean_value(value: &mut PropertyValue, options: &CollectOptions) {
    match value {
        PropertyValue::Map(inner) => clean_map(inner, options),
        PropertyValue::String(s) => {
            if options.strip_quotes {
                if let Some(inner) = strip_quotes(s) {
                    *s = inner.to_string();
                }
            }
            if options.coerce_numbers {
                if let Some(number) = parse_number(s) {
                    *value = number;
                }
            }
        }
        PropertyValue::Integer(_) | PropertyValue::Float(_) => {}
    }
}

/// The text between one pair of wrapping double quotes, if there is one.
pub fn strip_quotes(s: &str) -> Option<&str> {
    s.strip_prefix('"')?.strip_suffix('"')
}

/// Plain decimal text: optional minus, digits, optional dot and digits.
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+\.?\d*$").expect("number pattern is valid"));

/// Parse text matching [`NUMBER`] as a number.
///
/// Text without a dot becomes an integer; text with one becomes a float.
/// Integers too wide for `i64` fall back to a float. Anything else
/// (exponents, leading dots, whitespace) is left alone.
pub fn parse_number(s: &str) -> Option<PropertyValue> {
    if !NUMBER.is_match(s) {
        return None;
    }
    if s.contains('.') {
        return s.trim_end_matches('.').parse::<f64>().ok().map(PropertyValue::Float);
    }
    s.parse::<i64>()
        .map(PropertyValue::Integer)
        .or_else(|_| s.parse::<f64>().map(PropertyValue::Float))
        .ok()
}
