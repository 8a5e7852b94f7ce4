//! Identifier and string helpers for TypeScript output.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Words that cannot be used as TypeScript identifiers.
pub static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
        "let",
        "static",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "await",
        "async",
    ]
    .into_iter()
    .collect()
});

/// True if the name cannot be written as a bare property key.
pub fn needs_quoting(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    !(first.is_ascii_alphabetic() || first == '_' || first == '$')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape backslashes and double quotes for a double-quoted literal.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape text placed inside a template literal.
pub fn escape_template(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
}

pub fn quote_if_needed(name: &str) -> String {
    if needs_quoting(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// Lower-case the leading run of capitals: `Id` → `id`, `URLPath` → `urlPath`.
pub fn camel_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let upper_run = chars.iter().take_while(|c| c.is_ascii_uppercase()).count();
    let lower = match upper_run {
        0 => return name.to_string(),
        n if n == chars.len() || n == 1 => n,
        // Keep the capital that starts the next word.
        n => n - 1,
    };
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < lower { c.to_ascii_lowercase() } else { *c })
        .collect()
}

/// camelCase identifier safe to use as a parameter or local name.
pub fn sanitize_identifier(name: &str) -> String {
    let cleaned: String = name
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(i, part)| {
            if i == 0 {
                part.to_string()
            } else {
                crate::naming::title_case(part)
            }
        })
        .collect();
    if cleaned.is_empty() {
        return "_empty".to_string();
    }
    let mut result = camel_case(&cleaned);
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    if TS_RESERVED_WORDS.contains(result.as_str()) {
        result.insert(0, '_');
    }
    result
}
