//! Route template parsing.
//!
//! Accepts `{name}`, `{name:constraint}`, `{name?}`, `{name=default}` and
//! `{*name}` placeholders plus `[controller]` / `[action]` tokens. Doubled
//! braces (`{{`, `}}`) are literal braces, also inside constraints.

use std::iter::Peekable;
use std::str::CharIndices;

/// One piece of a parsed route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePart {
    Literal(String),
    Placeholder {
        name: String,
        optional: bool,
        catch_all: bool,
    },
}

/// Parse a route into literal and placeholder parts.
///
/// The result always starts with `/`. Adjacent literals are merged.
pub fn parse(route: &str, controller: &str, action: &str) -> Vec<RoutePart> {
    let route = route
        .trim_start_matches('~')
        .replace("[controller]", controller)
        .replace("[action]", action);

    let mut parts = Vec::new();
    let mut literal = String::new();
    if !route.starts_with('/') {
        literal.push('/');
    }

    let mut chars = route.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            '{' | '}' if chars.next_if(|&(_, next)| next == c).is_some() => literal.push(c),
            '{' => {
                let Some(body) = placeholder_body(&mut chars) else {
                    // Unterminated placeholder; keep the remainder verbatim.
                    literal.push_str(&route[start..]);
                    break;
                };
                if !literal.is_empty() {
                    parts.push(RoutePart::Literal(std::mem::take(&mut literal)));
                }
                parts.push(placeholder(&body));
            }
            _ => literal.push(c),
        }
    }
    if !literal.is_empty() {
        parts.push(RoutePart::Literal(literal));
    }
    parts
}

/// Text up to the closing `}`, with `{{` and `}}` unescaped. `None` when the
/// route ends first.
fn placeholder_body(chars: &mut Peekable<CharIndices<'_>>) -> Option<String> {
    let mut body = String::new();
    while let Some((_, c)) = chars.next() {
        match c {
            '{' | '}' if chars.next_if(|&(_, next)| next == c).is_some() => body.push(c),
            '}' => return Some(body),
            _ => body.push(c),
        }
    }
    None
}

fn placeholder(body: &str) -> RoutePart {
    let (body, catch_all) = match body.strip_prefix("**").or_else(|| body.strip_prefix('*')) {
        Some(stripped) => (stripped, true),
        None => (body, false),
    };
    let (body, marked) = match body.strip_suffix('?') {
        Some(stripped) => (stripped, true),
        None => (body, false),
    };
    let (body, defaulted) = match body.split_once('=') {
        Some((head, _)) => (head, true),
        None => (body, false),
    };
    let name = body.split_once(':').map_or(body, |(head, _)| head);
    RoutePart::Placeholder {
        name: name.trim().to_string(),
        optional: marked || defaulted,
        catch_all,
    }
}
