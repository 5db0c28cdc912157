//! Identifier normalization
//!
//! Turns human-authored strings (path templates, operation ids, enum labels,
//! definition and property names) into identifiers that are legal in proto3.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref AMPERSAND: Regex = Regex::new(r"\s*&\s*").unwrap();
    static ref DISALLOWED: Regex = Regex::new(r"\s*[^A-Z0-9_\s]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Derive an RPC name from a path template and HTTP verb
///
/// A non-empty `operation_id` takes precedence over the path.
///
/// # Examples
/// ```
/// use swagger2proto_parser::naming::path_method_to_name;
///
/// assert_eq!(
///     path_method_to_name("/queue/{id}/enqueue_player", "get", ""),
///     "GetQueueIdEnqueuePlayer"
/// );
/// assert_eq!(path_method_to_name("/", "post", ""), "Post");
/// assert_eq!(path_method_to_name("/pets", "get", "listPets"), "ListPets");
/// ```
pub fn path_method_to_name(path: &str, method: &str, operation_id: &str) -> String {
    let verb = to_pascal_case(method);

    let from_id = to_pascal_case(operation_id);
    if !from_id.is_empty() {
        return if starts_with_digit(&from_id) {
            format!("{}{}", verb, from_id)
        } else {
            from_id
        };
    }

    let path = [".json", ".yaml", ".yml"]
        .iter()
        .find_map(|ext| path.strip_suffix(ext))
        .unwrap_or(path);

    let name = format!("{}{}", verb, to_pascal_case(path));
    if name.is_empty() {
        "Rpc".to_string()
    } else {
        name
    }
}

/// Derive an enum value identifier from a label
///
/// `enum_name` is used as a prefix for labels that would start with a digit
/// and as the replacement for labels that normalize to nothing. Characters
/// outside `[A-Z0-9_]` each become one `_`, so punctuation-dense labels
/// produce runs of underscores.
///
/// # Examples
/// ```
/// use swagger2proto_parser::naming::to_enum_value;
///
/// assert_eq!(to_enum_value("Test", "foo & bar", 1), "FOO_AND_BAR");
/// assert_eq!(to_enum_value("Test", "foo&bar", 1), "FOO_AND_BAR");
/// assert_eq!(to_enum_value("Size", "10kg", 1), "SIZE_10KG");
/// ```
pub fn to_enum_value(enum_name: &str, label: &str, index: usize) -> String {
    let upper = label.trim().to_uppercase();
    let value = AMPERSAND.replace_all(&upper, "_AND_");
    let value = DISALLOWED.replace_all(&value, "_");
    let value = WHITESPACE.replace_all(&value, "_").into_owned();

    let prefix = to_screaming_snake_case(enum_name);
    if value.is_empty() {
        format!("{}_{}", prefix, index)
    } else if starts_with_digit(&value) {
        format!("{}_{}", prefix, value)
    } else {
        value
    }
}

/// Hands out unique value names within one enum
///
/// The first name is always the zero sentinel `<ENUM>_UNSPECIFIED`.
/// Names are only unique per enum. protoc scopes enum values in the
/// enclosing message or package, so two sibling enums that share a label
/// (`A { RED }`, `B { RED }`) produce a file protoc rejects.
#[derive(Debug)]
pub struct EnumValueNamer {
    enum_name: String,
    seen: HashSet<String>,
}

impl EnumValueNamer {
    pub fn new(enum_name: &str) -> Self {
        Self {
            enum_name: enum_name.to_string(),
            seen: HashSet::new(),
        }
    }

    /// Name of the zero value
    pub fn sentinel(&mut self) -> String {
        let name = format!("{}_UNSPECIFIED", to_screaming_snake_case(&self.enum_name));
        self.claim(name, 0)
    }

    /// Name for the label at `index` (1-based, equal to its number)
    pub fn value(&mut self, label: &str, index: usize) -> String {
        let name = to_enum_value(&self.enum_name, label, index);
        self.claim(name, index)
    }

    fn claim(&mut self, name: String, index: usize) -> String {
        let mut candidate = name;
        while self.seen.contains(&candidate) {
            candidate = format!("{}_{}", candidate, index);
        }
        self.seen.insert(candidate.clone());
        candidate
    }
}

/// Message or enum name for a definition or property name
pub fn message_name(name: &str) -> String {
    let pascal = to_pascal_case(name);
    if pascal.is_empty() {
        "Unnamed".to_string()
    } else if starts_with_digit(&pascal) {
        format!("_{}", pascal)
    } else {
        pascal
    }
}

/// Field name for a property or parameter name
pub fn field_name(name: &str) -> String {
    let mut field: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if field.is_empty() || starts_with_digit(&field) {
        field.insert(0, '_');
    }
    field
}

/// Package name derived from the document title
///
/// ```
/// use swagger2proto_parser::naming::package_name;
///
/// assert_eq!(package_name("Swagger Petstore"), "swagger_petstore");
/// assert_eq!(package_name(""), "");
/// ```
pub fn package_name(title: &str) -> String {
    let package = title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_");

    if starts_with_digit(&package) {
        format!("_{}", package)
    } else {
        package
    }
}

/// Service name for a package
pub fn service_name(package: &str) -> String {
    let base = to_pascal_case(package);
    if base.is_empty() || starts_with_digit(&base) {
        format!("Api{}Service", base)
    } else {
        format!("{}Service", base)
    }
}

/// Title-case every alphanumeric token and concatenate them
///
/// Only the first letter of each token is changed, `userID` stays
/// `UserID`.
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(capitalize)
        .collect()
}

/// Upper-case the first character
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `PetStatus` -> `PET_STATUS`
pub fn to_screaming_snake_case(s: &str) -> String {
    to_snake_case(s)
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Convert PascalCase or camelCase to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            // HTTPServer -> http_server
            let should_add_underscore = i > 0
                && (chars[i - 1].is_lowercase()
                    || chars[i - 1].is_ascii_digit()
                    || (i + 1 < chars.len() && chars[i + 1].is_lowercase()));

            if should_add_underscore && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else if ch == '-' || ch == ' ' {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
        } else {
            result.push(ch);
        }
    }

    while result.contains("__") {
        result = result.replace("__", "_");
    }

    result.trim_matches('_').to_string()
}

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}
