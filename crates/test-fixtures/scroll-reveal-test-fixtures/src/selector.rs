//! Minimal selector engine: compound selectors (`tag`, `#id`, `.class`) joined
//! by the descendant combinator. Anything else is rejected.

use scroll_reveal_core::HostError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

/// Parsed selector, compounds in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    pub parts: Vec<Compound>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(src: &str, text: &str) -> Result<Compound, HostError> {
    let err = |message: &str| HostError::Selector {
        selector: src.to_string(),
        message: message.to_string(),
    };
    let mut out = Compound::default();
    let mut rest = text;
    while !rest.is_empty() {
        let (sigil, body) = match rest.chars().next() {
            Some(c @ ('#' | '.')) => (Some(c), &rest[1..]),
            _ => (None, rest),
        };
        let len = body.find(|c: char| !is_ident_char(c)).unwrap_or(body.len());
        if len == 0 {
            return Err(err("unsupported syntax"));
        }
        let name = body[..len].to_string();
        match sigil {
            Some('#') => out.id = Some(name),
            Some(_) => out.classes.push(name),
            None if out.tag.is_none() && out.id.is_none() && out.classes.is_empty() => {
                out.tag = Some(name.to_ascii_lowercase())
            }
            None => return Err(err("type selector must come first")),
        }
        rest = &body[len..];
    }
    Ok(out)
}

impl Selector {
    pub fn parse(src: &str) -> Result<Self, HostError> {
        let parts = src
            .split_whitespace()
            .map(|t| parse_compound(src, t))
            .collect::<Result<Vec<_>, _>>()?;
        if parts.is_empty() {
            return Err(HostError::Selector {
                selector: src.to_string(),
                message: "empty selector".into(),
            });
        }
        Ok(Self { parts })
    }
}

impl Compound {
    pub fn matches(&self, tag: &str, id: Option<&str>, classes: &[String]) -> bool {
        if let Some(t) = &self.tag {
            if t != tag {
                return false;
            }
        }
        if let Some(want) = &self.id {
            if id != Some(want.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| classes.contains(c))
    }
}
