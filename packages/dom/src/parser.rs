//! # Markup Parser
//!
//! Builds a [`Document`] from markup with the forgiving recovery rules an
//! editor needs for user-authored pages:
//!
//! - void elements never take children
//! - a start tag closes an open `p`/`li`/`option`/table cell where HTML would
//! - an end tag closes everything up to its matching open element; stray end
//!   tags are ignored
//! - `script`, `style`, `textarea` and `title` hold raw text
//!
//! After tokens are consumed the tree is normalized so that the document
//! always has exactly one `html` with one `head` and one `body`.

use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;
use crate::node::{is_void_element, Document, NodeId, NodeKind};
use logos::{Lexer, Logos};

/// Maximum open-element depth
pub const MAX_DEPTH: usize = 512;

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

const HEAD_ELEMENTS: &[&str] = &["title", "meta", "link", "style", "base"];

/// Start tags that implicitly close an open `<p>`
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "figure", "footer",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre",
    "section", "table", "ul",
];

/// Parse a complete document (or a bare fragment, which is wrapped)
pub fn parse_document(markup: &str) -> ParseResult<Document> {
    let mut doc = Document::bare();
    let mut builder = TreeBuilder::new(&mut doc);
    builder.run(markup)?;
    let html_seen = builder.html_seen;
    normalize(&mut doc, html_seen);
    Ok(doc)
}

/// Parse markup and append the resulting nodes to `parent`.
/// Returns the new top-level nodes.
pub fn parse_fragment_into(
    doc: &mut Document,
    parent: NodeId,
    markup: &str,
) -> ParseResult<Vec<NodeId>> {
    let before = doc.children(parent).len();
    let mut builder = TreeBuilder::with_context(doc, parent);
    builder.fragment = true;
    builder.run(markup)?;
    Ok(doc.children(parent)[before..].to_vec())
}

struct TreeBuilder<'a> {
    doc: &'a mut Document,
    /// Open elements; index 0 is the insertion context
    stack: Vec<NodeId>,
    html_seen: bool,
    fragment: bool,
}

impl<'a> TreeBuilder<'a> {
    fn new(doc: &'a mut Document) -> Self {
        let root = doc.root();
        Self::with_context(doc, root)
    }

    fn with_context(doc: &'a mut Document, context: NodeId) -> Self {
        Self {
            doc,
            stack: vec![context],
            html_seen: false,
            fragment: false,
        }
    }

    fn current(&self) -> NodeId {
        // The context node is never popped
        self.stack[self.stack.len() - 1]
    }

    fn current_tag(&self) -> Option<&str> {
        if self.stack.len() <= 1 {
            return None;
        }
        self.doc.tag(self.current())
    }

    fn run(&mut self, markup: &str) -> ParseResult<()> {
        let mut lex = Token::lexer(markup);

        while let Some(token) = lex.next() {
            let offset = lex.span().start;
            match token {
                Ok(Token::Text(text)) | Ok(Token::Lt(text)) => self.text(text),
                Ok(Token::Comment(raw)) => {
                    let body = raw.strip_prefix("<!--").unwrap_or(raw);
                    let body = body.strip_suffix("-->").unwrap_or(body);
                    let node = self.doc.create_comment(body);
                    let parent = self.current();
                    self.doc.append_child(parent, node);
                }
                Ok(Token::Doctype(raw)) => {
                    if !self.fragment && self.doc.doctype.is_none() && !self.html_seen {
                        self.doc.doctype = Some(raw.to_string());
                    }
                }
                Ok(Token::StartTag(raw)) => self.start_tag(raw, offset, &mut lex)?,
                Ok(Token::EndTag(raw)) => self.end_tag(raw),
                Err(()) => {
                    return Err(ParseError::UnexpectedEof {
                        offset,
                        expected: "`>` to close tag".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    fn text(&mut self, text: &str) {
        let parent = self.current();
        // Merge adjacent text so `a < b` stays one node
        if let Some(&last) = self.doc.children(parent).last() {
            if self.doc.push_raw_text(last, text) {
                return;
            }
        }
        let node = self.doc.create_raw_text(text);
        self.doc.append_child(parent, node);
    }

    fn start_tag<'s>(
        &mut self,
        raw: &str,
        offset: usize,
        lex: &mut Lexer<'s, Token<'s>>,
    ) -> ParseResult<()> {
        let (name, attributes, self_closing) = split_start_tag(raw);

        // Only one html/head/body per document
        if !self.fragment {
            if name == "html" {
                if self.html_seen {
                    return Ok(());
                }
                self.html_seen = true;
            } else if (name == "head" || name == "body") && self.has_open_or_existing(&name) {
                return Ok(());
            }
        }

        self.close_implied(&name);

        let node = self.doc.create_element(&name);
        for (attr_name, value) in attributes {
            self.doc.push_raw_attribute(node, attr_name, value);
        }
        let parent = self.current();
        self.doc.append_child(parent, node);

        if is_void_element(&name) || self_closing {
            return Ok(());
        }

        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let rest = lex.remainder();
            let end = find_raw_text_end(rest, &name);
            if end > 0 {
                let text = self.doc.create_raw_text(&rest[..end]);
                self.doc.append_child(node, text);
            }
            lex.bump(end);
            // The matching end tag (if any) is consumed as a normal token
            self.stack.push(node);
            return Ok(());
        }

        if self.stack.len() > MAX_DEPTH {
            return Err(ParseError::NestingTooDeep {
                offset,
                limit: MAX_DEPTH,
            });
        }
        self.stack.push(node);
        Ok(())
    }

    fn has_open_or_existing(&self, tag: &str) -> bool {
        self.doc
            .descendants(self.doc.root())
            .into_iter()
            .any(|n| self.doc.tag(n) == Some(tag))
    }

    fn close_implied(&mut self, name: &str) {
        let Some(current) = self.current_tag() else {
            return;
        };
        let close = match current {
            "p" => CLOSES_P.contains(&name),
            "li" => name == "li",
            "option" => name == "option",
            "dt" | "dd" => name == "dt" || name == "dd",
            "td" | "th" => matches!(name, "td" | "th" | "tr"),
            "tr" => name == "tr",
            _ => false,
        };
        if close {
            self.stack.pop();
        }
    }

    fn end_tag(&mut self, raw: &str) {
        let name = raw
            .trim_start_matches("</")
            .trim_end_matches('>')
            .trim()
            .to_ascii_lowercase();

        // Never pop the insertion context at index 0
        let found = self
            .stack
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|&(_, &n)| self.doc.tag(n) == Some(name.as_str()))
            .map(|(i, _)| i);

        if let Some(index) = found {
            self.stack.truncate(index);
        }
    }
}

/// Split `<tag a="1" b>` into lowercase name, raw attributes, and whether
/// the tag ends with `/>`.
fn split_start_tag(raw: &str) -> (String, Vec<(String, String)>, bool) {
    let inner = raw.trim_start_matches('<').trim_end_matches('>');
    let self_closing = inner.ends_with('/');
    let inner = inner.strip_suffix('/').unwrap_or(inner);

    let name_end = inner
        .find(|c: char| c.is_ascii_whitespace() || c == '/')
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_ascii_lowercase();
    let attributes = parse_attributes(&inner[name_end..]);

    (name, attributes, self_closing)
}

fn parse_attributes(source: &str) -> Vec<(String, String)> {
    let bytes = source.as_bytes();
    let mut attrs = Vec::new();
    let mut i = 0;

    let is_space = |b: u8| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c');

    while i < bytes.len() {
        while i < bytes.len() && (is_space(bytes[i]) || bytes[i] == b'/') {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let name_start = i;
        while i < bytes.len() && !is_space(bytes[i]) && !matches!(bytes[i], b'=' | b'/') {
            i += 1;
        }
        let name = source[name_start..i].to_ascii_lowercase();

        while i < bytes.len() && is_space(bytes[i]) {
            i += 1;
        }

        let mut value = String::new();
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && is_space(bytes[i]) {
                i += 1;
            }
            if i < bytes.len() && matches!(bytes[i], b'"' | b'\'') {
                let quote = bytes[i];
                i += 1;
                let value_start = i;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                value = source[value_start..i].to_string();
                i = (i + 1).min(bytes.len());
            } else {
                let value_start = i;
                while i < bytes.len() && !is_space(bytes[i]) {
                    i += 1;
                }
                value = source[value_start..i].to_string();
            }
        }

        if !name.is_empty() {
            // Stored values are always emitted double-quoted
            attrs.push((name, value.replace('"', "&quot;")));
        }
    }

    attrs
}

fn find_raw_text_end(rest: &str, tag: &str) -> usize {
    let needle = format!("</{}", tag);
    let lower = rest.to_ascii_lowercase();
    lower.find(&needle).unwrap_or(rest.len())
}

/// Give the parsed tree exactly one `html` holding `head` and `body`
fn normalize(doc: &mut Document, html_seen: bool) {
    let root = doc.root();
    let top: Vec<NodeId> = doc.children(root).to_vec();

    let html = top
        .iter()
        .copied()
        .find(|&n| doc.tag(n) == Some("html"))
        .unwrap_or_else(|| doc.create_element("html"));

    for &node in &top {
        doc.detach(node);
    }
    doc.append_child(root, html);

    let find_child = |doc: &Document, tag: &str| {
        doc.children(html)
            .iter()
            .copied()
            .find(|&n| doc.tag(n) == Some(tag))
    };

    let head = match find_child(doc, "head") {
        Some(h) => h,
        None => {
            let h = doc.create_element("head");
            doc.insert_child_at(html, 0, h);
            h
        }
    };
    let body = match find_child(doc, "body") {
        Some(b) => b,
        None => {
            let b = doc.create_element("body");
            doc.append_child(html, b);
            b
        }
    };

    // Content placed directly inside <html> belongs to the body
    for child in doc.children(html).to_vec() {
        if child == head || child == body || is_ignorable(doc, child) {
            continue;
        }
        doc.append_child(body, child);
    }

    // Nodes outside <html>: head-only elements before any body content go
    // to the head, everything else to the body
    for node in top.into_iter().filter(|&n| n != html) {
        if is_ignorable(doc, node) {
            if !html_seen && !doc.children(body).is_empty() {
                doc.append_child(body, node);
            }
            continue;
        }
        let head_only = doc
            .tag(node)
            .map(|t| HEAD_ELEMENTS.contains(&t))
            .unwrap_or(false);
        if head_only && doc.children(body).is_empty() {
            doc.append_child(head, node);
        } else {
            doc.append_child(body, node);
        }
    }

    doc.html = html;
    doc.head = head;
    doc.body = body;
}

/// Whitespace-only text and comments
fn is_ignorable(doc: &Document, node: NodeId) -> bool {
    match doc.kind(node) {
        Some(NodeKind::Text(raw)) => raw.trim().is_empty(),
        Some(NodeKind::Comment(_)) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let doc = parse_document(
            "<!DOCTYPE html><html><head><title>T</title></head><body><p>Hi</p></body></html>",
        )
        .unwrap();
        assert_eq!(doc.doctype(), Some("<!DOCTYPE html>"));
        let body_children = doc.children(doc.body());
        assert_eq!(body_children.len(), 1);
        assert_eq!(doc.tag(body_children[0]), Some("p"));
        assert_eq!(doc.text_content(body_children[0]), "Hi");
    }

    #[test]
    fn test_bare_fragment_is_wrapped() {
        let doc = parse_document("<title>x</title><h1>Hello</h1>").unwrap();
        assert_eq!(doc.tag(doc.children(doc.head())[0]), Some("title"));
        assert_eq!(doc.tag(doc.children(doc.body())[0]), Some("h1"));
    }

    #[test]
    fn test_void_elements_take_no_children() {
        let doc = parse_document("<body><img src=a.png><p>after</p></body>").unwrap();
        let children = doc.children(doc.body());
        assert_eq!(children.len(), 2);
        assert!(doc.children(children[0]).is_empty());
    }

    #[test]
    fn test_implied_p_close() {
        let doc = parse_document("<body><p>one<div>two</div></body>").unwrap();
        let children = doc.children(doc.body());
        assert_eq!(children.len(), 2);
        assert_eq!(doc.tag(children[1]), Some("div"));
    }

    #[test]
    fn test_stray_end_tag_ignored() {
        let doc = parse_document("<body><span>a</b></span></body>").unwrap();
        let span = doc.children(doc.body())[0];
        assert_eq!(doc.text_content(span), "a");
    }

    #[test]
    fn test_attributes() {
        let doc =
            parse_document("<body><a href=/x.html title='say \"hi\"' hidden>l</a></body>").unwrap();
        let a = doc.children(doc.body())[0];
        assert_eq!(doc.attribute(a, "href").as_deref(), Some("/x.html"));
        assert_eq!(doc.attribute(a, "title").as_deref(), Some("say \"hi\""));
        assert_eq!(doc.attribute(a, "hidden").as_deref(), Some(""));
    }

    #[test]
    fn test_script_is_raw_text() {
        let doc = parse_document("<body><script>if (a < b) { x = '</p>' }</script></body>")
            .unwrap();
        let script = doc.children(doc.body())[0];
        assert_eq!(doc.text_content(script), "if (a < b) { x = '</p>' }");
    }

    #[test]
    fn test_unterminated_tag_is_error() {
        let err = parse_document("<body><div class=\"a\"").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_nesting_limit() {
        let markup = "<div>".repeat(MAX_DEPTH + 10);
        let err = parse_document(&markup).unwrap_err();
        assert!(matches!(err, ParseError::NestingTooDeep { .. }));
    }

    #[test]
    fn test_parse_fragment_into() {
        let mut doc = Document::new();
        let body = doc.body();
        let nodes = parse_fragment_into(&mut doc, body, "<p>a</p><p>b</p>").unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(doc.children(body), nodes.as_slice());
    }
}
