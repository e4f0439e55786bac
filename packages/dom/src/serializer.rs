//! Canonical markup serialization.
//!
//! Output is a fixed point of parse → serialize: attributes are always
//! double-quoted in stored order, void elements have no end tag, and text
//! is written back exactly as stored.

use crate::node::{is_void_element, Document, NodeId, NodeKind};

impl Document {
    /// Whole document including the doctype
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if let Some(doctype) = &self.doctype {
            out.push_str(doctype);
        }
        write_node(self, self.html(), &mut out);
        out
    }

    /// Markup of `id` itself
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        write_node(self, id, &mut out);
        out
    }

    /// Markup of `id`'s children
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            write_node(self, child, &mut out);
        }
        out
    }

    /// Body content only
    pub fn body_html(&self) -> String {
        self.inner_html(self.body())
    }

    /// Markup for this document with the body content swapped for `body`.
    /// Head, `html` and `body` attributes are kept.
    pub fn markup_with_body(&self, body: &str) -> String {
        let mut out = String::new();
        if let Some(doctype) = &self.doctype {
            out.push_str(doctype);
        }
        write_open_tag(self, self.html(), &mut out);
        for &child in self.children(self.html()) {
            if child == self.body() {
                write_open_tag(self, child, &mut out);
                out.push_str(body);
                out.push_str("</body>");
            } else {
                write_node(self, child, &mut out);
            }
        }
        out.push_str("</html>");
        out
    }
}

fn write_open_tag(doc: &Document, id: NodeId, out: &mut String) {
    let Some(el) = doc.element(id) else {
        return;
    };
    out.push('<');
    out.push_str(&el.tag);
    for attr in &el.attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&attr.value);
        out.push('"');
    }
    out.push('>');
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        Some(NodeKind::Element(el)) => {
            write_open_tag(doc, id, out);
            if is_void_element(&el.tag) {
                return;
            }
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
        Some(NodeKind::Text(raw)) => out.push_str(raw),
        Some(NodeKind::Comment(body)) => {
            out.push_str("<!--");
            out.push_str(body);
            out.push_str("-->");
        }
        Some(NodeKind::Root) => {
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
        }
        None => {}
    }
}
