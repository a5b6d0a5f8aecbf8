use std::{fmt, rc::Rc, sync::LazyLock};

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Comment,
    Literal,
    Keyword,
    Register,
    Integer,
    Identifier,
    Memory,
    Text,
    Symbol,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Comment => "comment",
            Self::Literal => "literal",
            Self::Keyword => "keyword",
            Self::Register => "register",
            Self::Integer => "integer",
            Self::Identifier => "identifier",
            Self::Memory => "memory",
            Self::Text => "text",
            Self::Symbol => "symbol",
        };
        write!(f, "{name}")
    }
}

pub const KEYWORDS: [&str; 11] = [
    "namespace",
    "function",
    "return",
    "if",
    "while",
    "repeat",
    "times",
    "goto",
    "call",
    "var",
    "break",
];

pub const REGISTERS: [&str; 24] = [
    "EAX", "EBX", "ECX", "EDX", "ESI", "EDI", "ESP", "EBP", "AX", "BX", "CX", "DX", "SI", "DI",
    "SP", "BP", "AL", "AH", "BL", "BH", "CL", "CH", "DL", "DH",
];

pub fn is_register(s: &str) -> bool {
    REGISTERS.iter().any(|r| r.eq_ignore_ascii_case(s))
}

pub fn is_keyword(s: &str) -> bool {
    KEYWORDS.contains(&s)
}

/// Determines the kind a standalone piece of text would be tokenized as.
pub fn classify(s: &str) -> Option<TokenKind> {
    match tokenize(s) {
        Ok(tokens) if tokens.len() == 1 => Some(tokens[0].get_kind()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    value: Rc<str>,
    column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: &str, column: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            column,
        }
    }

    pub fn get_kind(&self) -> TokenKind {
        self.kind
    }

    pub fn get_value(&self) -> &str {
        &self.value
    }

}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]=\"{}\"", self.column + 1, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenError {
    pub msg: String,
    pub column: usize,
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ column {}", self.msg, self.column + 1)
    }
}

impl std::error::Error for TokenError {}

/// Splits a single dialect line into tokens.
///
/// Comments and literals are only tokens when they start the line. Either one
/// trailing code is dropped along with everything after it.
pub fn tokenize(s: &str) -> Result<Vec<Token>, TokenError> {
    static SPLIT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(concat!(
            r"(?P<literal>//!.*)",
            r"|(?P<comment>//.*)",
            r"|(?P<memory>\[[^\]]*\])",
            r"|(?P<text>'[^']*')",
            r"|(?P<integer>0[xX][0-9A-Fa-f]+|[0-9]+)",
            r"|(?P<word>[A-Za-z_][A-Za-z0-9_]*)",
            r"|(?P<symbol>\+\+|--|<<|>>|<~|~>|\?=|\?&|!=|<=|>=|[=+\-*/&|^<>{}:,])",
        ))
        .unwrap()
    });

    let mut tokens = Vec::new();
    let mut last_end = 0;

    for caps in SPLIT_REGEX.captures_iter(s) {
        let Some(m) = caps.get(0) else {
            continue;
        };

        let gap = &s[last_end..m.start()];
        if !gap.trim().is_empty() {
            return Err(TokenError {
                msg: format!("unexpected text \"{}\" found", gap.trim()),
                column: last_end + (gap.len() - gap.trim_start().len()),
            });
        }
        last_end = m.end();

        let is_comment = caps.name("literal").is_some() || caps.name("comment").is_some();
        if is_comment && !tokens.is_empty() {
            break;
        }

        let (kind, value) = if let Some(c) = caps.name("literal") {
            (TokenKind::Literal, c.as_str()[3..].trim())
        } else if let Some(c) = caps.name("comment") {
            (TokenKind::Comment, c.as_str()[2..].trim())
        } else if caps.name("memory").is_some() {
            (TokenKind::Memory, m.as_str())
        } else if caps.name("text").is_some() {
            (TokenKind::Text, m.as_str())
        } else if caps.name("integer").is_some() {
            (TokenKind::Integer, m.as_str())
        } else if let Some(w) = caps.name("word") {
            let w = w.as_str();
            let kind = if is_keyword(w) {
                TokenKind::Keyword
            } else if is_register(w) {
                TokenKind::Register
            } else {
                TokenKind::Identifier
            };
            (kind, w)
        } else {
            (TokenKind::Symbol, m.as_str())
        };

        tokens.push(Token::new(kind, value, m.start()));
    }

    let rest = &s[last_end..];
    if !rest.trim().is_empty() {
        return Err(TokenError {
            msg: format!("unexpected text \"{}\" found", rest.trim()),
            column: last_end + (rest.len() - rest.trim_start().len()),
        });
    }

    Ok(tokens)
}
