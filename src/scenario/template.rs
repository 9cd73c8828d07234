// src/scenario/template.rs

//! `{name}` placeholder rendering for step names, binaries, args and env.
//!
//! `{{` and `}}` produce literal braces. A `{` that does not open a valid
//! `{identifier}` is an error, so typos surface before anything launches.

use crate::errors::{HarnessError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Brace(char),
    Var(&'a str),
}

fn parse(template: &str) -> Result<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let bytes = template.as_bytes();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                segments.push(Segment::Literal(&template[literal_start..i]));
                segments.push(Segment::Brace('{'));
                i += 2;
                literal_start = i;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                segments.push(Segment::Literal(&template[literal_start..i]));
                segments.push(Segment::Brace('}'));
                i += 2;
                literal_start = i;
            }
            b'{' => {
                let rest = &template[i + 1..];
                let end = rest.find('}').ok_or_else(|| {
                    HarnessError::Template(format!("unclosed '{{' in template {template:?}"))
                })?;
                let name = &rest[..end];
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    return Err(HarnessError::Template(format!(
                        "invalid placeholder '{{{name}}}' in template {template:?} (use '{{{{' for a literal brace)"
                    )));
                }
                segments.push(Segment::Literal(&template[literal_start..i]));
                segments.push(Segment::Var(name));
                i += end + 2;
                literal_start = i;
            }
            _ => i += 1,
        }
    }
    segments.push(Segment::Literal(&template[literal_start..]));
    segments.retain(|s| !matches!(s, Segment::Literal("")));

    Ok(segments)
}

/// Names referenced by `template`, in order of appearance.
pub fn placeholders(template: &str) -> Result<Vec<String>> {
    Ok(parse(template)?
        .into_iter()
        .filter_map(|s| match s {
            Segment::Var(name) => Some(name.to_string()),
            _ => None,
        })
        .collect())
}

/// Substitute every placeholder via `lookup`.
pub fn render<'v, F>(template: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<&'v str>,
{
    let mut out = String::with_capacity(template.len());
    for segment in parse(template)? {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Brace(c) => out.push(c),
            Segment::Var(name) => {
                let value = lookup(name).ok_or_else(|| {
                    HarnessError::Template(format!(
                        "unknown variable '{name}' in template {template:?}"
                    ))
                })?;
                out.push_str(value);
            }
        }
    }
    Ok(out)
}
