//! Statement lexer using logos

use logos::Logos;
use quiver_core::{Error, Result};

/// Statement tokens
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // Keywords
    #[token("SELECT", ignore(ascii_case))]
    Select,

    #[token("FROM", ignore(ascii_case))]
    From,

    #[token("MATCH", ignore(ascii_case))]
    Match,

    #[token("WHERE", ignore(ascii_case))]
    Where,

    #[token("INSERT", ignore(ascii_case))]
    Insert,

    #[token("INTO", ignore(ascii_case))]
    Into,

    #[token("VALUES", ignore(ascii_case))]
    Values,

    #[token("DELETE", ignore(ascii_case))]
    Delete,

    #[token("CREATE", ignore(ascii_case))]
    Create,

    #[token("NODE", ignore(ascii_case))]
    Node,

    #[token("EDGE", ignore(ascii_case))]
    Edge,

    #[token("VIEW", ignore(ascii_case))]
    View,

    #[token("AS", ignore(ascii_case))]
    As,

    #[token("UNION", ignore(ascii_case))]
    Union,

    #[token("ALL", ignore(ascii_case))]
    All,

    #[token("PATH", ignore(ascii_case))]
    Path,

    #[token("AND", ignore(ascii_case))]
    And,

    #[token("OR", ignore(ascii_case))]
    Or,

    #[token("NOT", ignore(ascii_case))]
    Not,

    #[token("IS", ignore(ascii_case))]
    Is,

    #[token("TRUE", ignore(ascii_case))]
    True,

    #[token("FALSE", ignore(ascii_case))]
    False,

    #[token("NULL", ignore(ascii_case))]
    Null,

    // Symbols
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("..")]
    DotDot,

    #[token(";")]
    Semicolon,

    #[token("*")]
    Star,

    #[token("-")]
    Minus,

    #[token("->")]
    Arrow,

    #[token("=")]
    Equals,

    #[token("!=")]
    NotEquals,

    #[token("<>")]
    NotEquals2,

    #[token("<")]
    LessThan,

    #[token("<=")]
    LessEquals,

    #[token(">")]
    GreaterThan,

    #[token(">=")]
    GreaterEquals,

    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        Some(s[1..s.len()-1].to_string())
    })]
    StringDouble(String),

    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| {
        let s = lex.slice();
        Some(s[1..s.len()-1].to_string())
    })]
    StringSingle(String),

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[regex(r"`[^`]+`", |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    EscapedIdentifier(String),

    // Comments (skip)
    #[regex(r"--[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/", logos::skip)]
    BlockComment,
}

impl Token {
    /// Identifier text, covering both plain and escaped forms
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Token::Identifier(s) | Token::EscapedIdentifier(s) => Some(s),
            _ => None,
        }
    }
}

/// A token together with its byte span in the source
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: std::ops::Range<usize>,
}

/// Convert a byte offset into a 1-based (line, column) pair
pub fn line_col(src: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;
    for (i, ch) in src.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Tokenize statement text, failing on the first unrecognized character
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(token) => tokens.push(SpannedToken { token, span }),
            Err(_) => {
                let (line, column) = line_col(input, span.start);
                return Err(Error::syntax(
                    line,
                    column,
                    format!("unrecognized character {:?}", &input[span.clone()]),
                ));
            }
        }
    }
    Ok(tokens)
}
