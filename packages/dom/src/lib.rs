//! # Pagecraft DOM
//!
//! Headless HTML document model used by the editor's document surface.
//!
//! ```text
//! markup ──lexer──▶ tokens ──parser──▶ Document (arena) ──serializer──▶ markup
//! ```
//!
//! The serializer is canonical, so a snapshot taken from a document and
//! parsed back serializes to the same bytes. History relies on this.

mod error;
pub mod escape;
mod lexer;
mod node;
mod parser;
mod serializer;
mod style;

pub use error::{ParseError, ParseResult};
pub use lexer::Token;
pub use node::{is_void_element, Attribute, Document, ElementData, NodeId, NodeKind, VOID_ELEMENTS};
pub use parser::{parse_document, parse_fragment_into, MAX_DEPTH};
pub use style::InlineStyle;
