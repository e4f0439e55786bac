//! Inline `style` attribute declarations.

use serde::{Deserialize, Serialize};

/// Ordered list of CSS declarations from a `style` attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `prop: value; prop: value`. Semicolons inside parentheses or
    /// quotes (e.g. `url(data:...;base64,...)`) do not split declarations.
    pub fn parse(source: &str) -> Self {
        let mut declarations = Vec::new();

        for chunk in split_declarations(source) {
            let Some((property, value)) = chunk.split_once(':') else {
                continue;
            };
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim();
            if property.is_empty() || value.is_empty() {
                continue;
            }
            upsert(&mut declarations, property, value.to_string());
        }

        Self { declarations }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        let property = property.to_ascii_lowercase();
        self.declarations
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property, keeping its original position if already present
    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        upsert(
            &mut self.declarations,
            property.trim().to_ascii_lowercase(),
            value.into(),
        );
    }

    /// Remove a property, returning its previous value
    pub fn remove(&mut self, property: &str) -> Option<String> {
        let property = property.to_ascii_lowercase();
        let pos = self.declarations.iter().position(|(p, _)| *p == property)?;
        Some(self.declarations.remove(pos).1)
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(p, v)| (p.as_str(), v.as_str()))
    }

    /// Canonical `prop: value; prop: value` form
    pub fn to_css(&self) -> String {
        self.declarations
            .iter()
            .map(|(p, v)| format!("{}: {}", p, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn upsert(declarations: &mut Vec<(String, String)>, property: String, value: String) {
    if let Some(existing) = declarations.iter_mut().find(|(p, _)| *p == property) {
        existing.1 = value;
    } else {
        declarations.push((property, value));
    }
}

fn split_declarations(source: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                chunks.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    chunks.push(&source[start..]);
    chunks
}
