//! # Tokenizer
//!
//! Turns a source string into a finite sequence of [`Token`]s. Single
//! left-to-right pass, no lookahead beyond one character. Skips ASCII
//! whitespace and `//` line comments. Reserved words get their own
//! [`TokenKind`] variants; everything else identifier-shaped becomes
//! [`TokenKind::Ident`].

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

use crate::error::LexError;

/// Reserved-word table, keyed by source spelling.
///
/// A `Lazy<HashMap<..>>` rather than a `match` in [`keyword`] because the
/// set is small but checked once per identifier; building the table once
/// keeps the hot path a single hash lookup.
static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("let", TokenKind::Let);
    m.insert("function", TokenKind::Function);
    m.insert("return", TokenKind::Return);
    m.insert("print", TokenKind::Print);
    m.insert("if", TokenKind::If);
    m.insert("else", TokenKind::Else);
    m.insert("while", TokenKind::While);
    m
});

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Num(f64),
    Str(String),
    Ident(String),
    Let,
    Function,
    Return,
    Print,
    If,
    Else,
    While,
    EqEq,
    NotEq,
    Le,
    Ge,
    Lt,
    Gt,
    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Num(n) => write!(f, "number '{}'", n),
            TokenKind::Str(s) => write!(f, "string \"{}\"", s),
            TokenKind::Ident(s) => write!(f, "identifier '{}'", s),
            TokenKind::Let => write!(f, "'let'"),
            TokenKind::Function => write!(f, "'function'"),
            TokenKind::Return => write!(f, "'return'"),
            TokenKind::Print => write!(f, "'print'"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::While => write!(f, "'while'"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Assign => write!(f, "'='"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
}

impl Token {
    fn new(kind: TokenKind) -> Self {
        Token { kind }
    }
}

/// Tokenize an entire source string.
///
/// Returns the token sequence terminated by a single [`TokenKind::Eof`], or
/// the first [`LexError`] encountered.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = source.chars().collect();
    let mut pos = 0usize;
    let mut tokens = Vec::new();

    while pos < chars.len() {
        let c = chars[pos];

        // Whitespace.
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        // `//` line comments.
        if c == '/' && chars.get(pos + 1) == Some(&'/') {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }

        // Decimal integer literals.
        if c.is_ascii_digit() {
            let start = pos;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            let text: String = chars[start..pos].iter().collect();
            let value: f64 = text.parse().expect("digit run must parse as f64");
            tokens.push(Token::new(TokenKind::Num(value)));
            continue;
        }

        // Double-quoted string literals.
        if c == '"' {
            pos += 1;
            let mut s = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(LexError::UnterminatedString);
                }
                let ch = chars[pos];
                if ch == '"' {
                    pos += 1;
                    break;
                }
                if ch == '\\' {
                    pos += 1;
                    if pos >= chars.len() {
                        return Err(LexError::UnterminatedString);
                    }
                    let esc = chars[pos];
                    s.push(match esc {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '\\' => '\\',
                        '"' => '"',
                        other => other,
                    });
                    pos += 1;
                } else {
                    s.push(ch);
                    pos += 1;
                }
            }
            tokens.push(Token::new(TokenKind::Str(s)));
            continue;
        }

        // Identifiers and keywords.
        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            let start = pos;
            while pos < chars.len()
                && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_' || chars[pos] == '$')
            {
                pos += 1;
            }
            let text: String = chars[start..pos].iter().collect();
            let kind = KEYWORDS
                .get(text.as_str())
                .cloned()
                .unwrap_or_else(|| TokenKind::Ident(text));
            tokens.push(Token::new(kind));
            continue;
        }

        // Two-character operators before their one-character prefixes.
        let two: Option<char> = chars.get(pos + 1).copied();
        let kind = match (c, two) {
            ('=', Some('=')) => {
                pos += 2;
                TokenKind::EqEq
            }
            ('!', Some('=')) => {
                pos += 2;
                TokenKind::NotEq
            }
            ('<', Some('=')) => {
                pos += 2;
                TokenKind::Le
            }
            ('>', Some('=')) => {
                pos += 2;
                TokenKind::Ge
            }
            ('(', _) => {
                pos += 1;
                TokenKind::LParen
            }
            (')', _) => {
                pos += 1;
                TokenKind::RParen
            }
            ('+', _) => {
                pos += 1;
                TokenKind::Plus
            }
            ('-', _) => {
                pos += 1;
                TokenKind::Minus
            }
            ('*', _) => {
                pos += 1;
                TokenKind::Star
            }
            ('/', _) => {
                pos += 1;
                TokenKind::Slash
            }
            ('=', _) => {
                pos += 1;
                TokenKind::Assign
            }
            ('{', _) => {
                pos += 1;
                TokenKind::LBrace
            }
            ('}', _) => {
                pos += 1;
                TokenKind::RBrace
            }
            (',', _) => {
                pos += 1;
                TokenKind::Comma
            }
            (';', _) => {
                pos += 1;
                TokenKind::Semicolon
            }
            ('<', _) => {
                pos += 1;
                TokenKind::Lt
            }
            ('>', _) => {
                pos += 1;
                TokenKind::Gt
            }
            _ => return Err(LexError::UnexpectedChar(c)),
        };
        tokens.push(Token::new(kind));
    }

    tokens.push(Token::new(TokenKind::Eof));
    Ok(tokens)
}
