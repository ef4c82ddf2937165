// File: feedhush-common/src/models/selector.rs
//
// Compound selectors only: `tag`, `*`, `#id`, `.class`, `[attr]`, `[attr=value]`
// and `[attr="value"]`, in any combination. Combinators are rejected.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The parts of an element a selector is matched against.
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    pub tag: &'a str,
    pub attributes: &'a BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Id(String),
    Class(String),
    HasAttribute(String),
    AttributeEquals(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    tag: Option<String>,
    conditions: Vec<Condition>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, Error> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(Error::Selector("empty selector".to_string()));
        }

        let chars: Vec<char> = trimmed.chars().collect();
        let mut pos = 0;
        let mut tag = None;
        let mut conditions = Vec::new();

        if chars[0] == '*' {
            pos = 1;
        } else if is_ident_char(chars[0]) {
            let name = read_ident(&chars, &mut pos);
            tag = Some(name.to_ascii_lowercase());
        }

        while pos < chars.len() {
            match chars[pos] {
                '#' => {
                    pos += 1;
                    let id = read_ident(&chars, &mut pos);
                    if id.is_empty() {
                        return Err(Error::Selector(format!("missing id in '{trimmed}'")));
                    }
                    conditions.push(Condition::Id(id));
                }
                '.' => {
                    pos += 1;
                    let class = read_ident(&chars, &mut pos);
                    if class.is_empty() {
                        return Err(Error::Selector(format!("missing class in '{trimmed}'")));
                    }
                    conditions.push(Condition::Class(class));
                }
                '[' => {
                    pos += 1;
                    conditions.push(read_attribute(&chars, &mut pos, trimmed)?);
                }
                other => {
                    return Err(Error::Selector(format!(
                        "unsupported character '{other}' in '{trimmed}'"
                    )));
                }
            }
        }

        Ok(Self {
            source: trimmed.to_string(),
            tag,
            conditions,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        self.conditions.iter().all(|condition| match condition {
            Condition::Id(id) => element.attributes.get("id") == Some(id),
            Condition::Class(class) => element
                .attributes
                .get("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
            Condition::HasAttribute(name) => element.attributes.contains_key(name),
            Condition::AttributeEquals(name, value) => element.attributes.get(name) == Some(value),
        })
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn read_attribute(chars: &[char], pos: &mut usize, source: &str) -> Result<Condition, Error> {
    let name = read_ident(chars, pos);
    if name.is_empty() {
        return Err(Error::Selector(format!("missing attribute name in '{source}'")));
    }

    match chars.get(*pos) {
        Some(']') => {
            *pos += 1;
            Ok(Condition::HasAttribute(name))
        }
        Some('=') => {
            *pos += 1;
            let value = match chars.get(*pos) {
                Some(&quote) if quote == '"' || quote == '\'' => {
                    *pos += 1;
                    let start = *pos;
                    while *pos < chars.len() && chars[*pos] != quote {
                        *pos += 1;
                    }
                    if *pos >= chars.len() {
                        return Err(Error::Selector(format!("unterminated string in '{source}'")));
                    }
                    let value: String = chars[start..*pos].iter().collect();
                    *pos += 1;
                    value
                }
                _ => read_ident(chars, pos),
            };
            if chars.get(*pos) != Some(&']') {
                return Err(Error::Selector(format!("expected ']' in '{source}'")));
            }
            *pos += 1;
            Ok(Condition::AttributeEquals(name, value))
        }
        _ => Err(Error::Selector(format!("malformed attribute condition in '{source}'"))),
    }
}
