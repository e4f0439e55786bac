//! Markup lexer using logos
//!
//! Tags are matched by their opening bytes; callbacks consume the rest of
//! the tag (attributes, quoted values) so a `>` inside a quoted value does
//! not end the tag.

use logos::{Lexer, Logos};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'src> {
    /// `<!-- ... -->`, unterminated comments run to end of input
    #[token("<!--", comment)]
    Comment(&'src str),

    #[regex(r"<![dD][oO][cC][tT][yY][pP][eE]", declaration)]
    Doctype(&'src str),

    /// Whole start tag including attributes and the closing `>`
    #[regex(r"<[a-zA-Z][a-zA-Z0-9:_-]*", start_tag)]
    StartTag(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9:_-]*", declaration)]
    EndTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),

    /// A `<` that does not open any construct; treated as text
    #[token("<", |lex| lex.slice())]
    Lt(&'src str),
}

fn comment<'s>(lex: &mut Lexer<'s, Token<'s>>) -> &'s str {
    let rest = lex.remainder();
    let len = rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
    lex.bump(len);
    lex.slice()
}

fn declaration<'s>(lex: &mut Lexer<'s, Token<'s>>) -> Option<&'s str> {
    let end = lex.remainder().find('>')?;
    lex.bump(end + 1);
    Some(lex.slice())
}

fn start_tag<'s>(lex: &mut Lexer<'s, Token<'s>>) -> Option<&'s str> {
    let end = find_tag_end(lex.remainder())?;
    lex.bump(end);
    Some(lex.slice())
}

/// Byte length up to and including the `>` that closes a tag. Quotes only
/// open a value right after `=`.
fn find_tag_end(rest: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    let mut after_eq = false;

    for (i, b) in rest.bytes().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' if after_eq => quote = Some(b),
            b'>' => return Some(i + 1),
            b'=' => {
                after_eq = true;
                continue;
            }
            b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' => continue,
            _ => {}
        }
        after_eq = false;
    }
    None
}
