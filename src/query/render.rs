//! Query-string rendering.
//!
//! Renders a compiled [`SearchQuery`] to the search service's textual filter
//! syntax.
//!
//! # Filter Syntax Generated
//!
//! ```text
//! @field:value              - equality
//! @field:[5 5]              - numeric equality
//! @field:[(5 +inf]          - greater than
//! @field:[5 +inf]           - greater than or equal
//! @field:*value*            - contains
//! @field:value*             - prefix match
//! (a b)                     - AND
//! (a | b)                   - OR
//! ```

use crate::filter::{FilterValue, LookupOp};

use super::expr::{SearchExpr, SearchQuery};

/// Renders compiled queries to the backend's query-string syntax.
pub struct QueryStringRenderer;

impl QueryStringRenderer {
    /// Render the query's filter expression; an unfiltered query matches
    /// everything.
    pub fn render(query: &SearchQuery) -> String {
        match query.expression() {
            Some(expr) => Self::render_expr(expr),
            None => "*".to_string(),
        }
    }

    fn render_expr(expr: &SearchExpr) -> String {
        match expr {
            SearchExpr::Comparison { field, op, value } => {
                Self::render_comparison(field, op, value)
            }
            SearchExpr::And(nodes) => {
                let parts: Vec<String> = nodes.iter().map(Self::render_expr).collect();
                if parts.len() == 1 {
                    parts[0].clone()
                } else {
                    format!("({})", parts.join(" "))
                }
            }
            SearchExpr::Or(nodes) => {
                let parts: Vec<String> = nodes.iter().map(Self::render_expr).collect();
                if parts.len() == 1 {
                    parts[0].clone()
                } else {
                    format!("({})", parts.join(" | "))
                }
            }
        }
    }

    fn render_comparison(field: &str, op: &LookupOp, value: &FilterValue) -> String {
        let field = Self::escape_field_name(field);

        match (op, value) {
            (LookupOp::Exact, FilterValue::Text(text)) => {
                let escaped = Self::escape_special_chars(text);
                if text.contains(' ') {
                    format!("@{}:({})", field, escaped)
                } else {
                    format!("@{}:{}", field, escaped)
                }
            }
            (LookupOp::Exact, FilterValue::Integer(n)) => format!("@{}:[{} {}]", field, n, n),
            (LookupOp::Exact, FilterValue::Float(x)) => format!("@{}:[{} {}]", field, x, x),
            (LookupOp::Exact, FilterValue::Bool(b)) => {
                format!("@{}:{}", field, if *b { "true" } else { "false" })
            }
            (LookupOp::Gt, value) if Self::numeral(value).is_some() => {
                format!("@{}:[({} +inf]", field, Self::numeral(value).unwrap_or_default())
            }
            (LookupOp::Gte, value) if Self::numeral(value).is_some() => {
                format!("@{}:[{} +inf]", field, Self::numeral(value).unwrap_or_default())
            }
            (LookupOp::Lt, value) if Self::numeral(value).is_some() => {
                format!("@{}:[-inf ({}]", field, Self::numeral(value).unwrap_or_default())
            }
            (LookupOp::Lte, value) if Self::numeral(value).is_some() => {
                format!("@{}:[-inf {}]", field, Self::numeral(value).unwrap_or_default())
            }
            (LookupOp::Contains, FilterValue::Text(text)) => {
                format!("@{}:*{}*", field, Self::escape_value(text))
            }
            (LookupOp::StartsWith, FilterValue::Text(text)) => {
                format!("@{}:{}*", field, Self::escape_value(text))
            }
            (LookupOp::In, FilterValue::List(candidates)) => {
                // Lowering normally rewrites membership before compilation;
                // directly built expressions still render as a tag set.
                let tags: Vec<String> = candidates.iter().map(Self::render_bare_value).collect();
                format!("@{}:{{{}}}", field, tags.join("|"))
            }
            _ => {
                // Fallback for combinations the backend has no syntax for
                format!("@{}:{}", field, Self::render_bare_value(value))
            }
        }
    }

    fn numeral(value: &FilterValue) -> Option<String> {
        match value {
            FilterValue::Integer(n) => Some(n.to_string()),
            FilterValue::Float(x) => Some(x.to_string()),
            _ => None,
        }
    }

    fn render_bare_value(value: &FilterValue) -> String {
        match value {
            FilterValue::Null => "null".to_string(),
            FilterValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            FilterValue::Integer(n) => n.to_string(),
            FilterValue::Float(x) => x.to_string(),
            FilterValue::Text(text) => Self::escape_value(text),
            FilterValue::List(values) => values
                .iter()
                .map(Self::render_bare_value)
                .collect::<Vec<_>>()
                .join("|"),
        }
    }

    fn escape_field_name(field: &str) -> String {
        // Field names with special chars need backtick escaping
        if field.contains(|c: char| !c.is_alphanumeric() && c != '_') {
            format!("`{}`", field)
        } else {
            field.to_string()
        }
    }

    /// Escape special query characters but preserve spaces (for phrases).
    fn escape_special_chars(value: &str) -> String {
        let mut escaped = String::new();
        for c in value.chars() {
            match c {
                '@' | ':' | '|' | '(' | ')' | '[' | ']' | '{' | '}' | '*' | '%' | '-' | '+' => {
                    escaped.push('\\');
                    escaped.push(c);
                }
                _ => escaped.push(c),
            }
        }
        escaped
    }

    /// Escape all special chars including spaces (for single-term matching).
    fn escape_value(value: &str) -> String {
        let mut escaped = String::new();
        for c in value.chars() {
            match c {
                '@' | ':' | '|' | '(' | ')' | '[' | ']' | '{' | '}' | '*' | '%' | '-' | '+'
                | ' ' => {
                    escaped.push('\\');
                    escaped.push(c);
                }
                _ => escaped.push(c),
            }
        }
        escaped
    }
}
