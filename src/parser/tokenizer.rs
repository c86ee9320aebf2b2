use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::ParseError;

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Symbol,
    /// Quoted string or number
    Literal,
    Identifier,
    /// `?` or `:name`
    Parameter,
    Whitespace,
    /// Anything the lexer cannot classify
    Unknown,
    /// Sentinel returned by the cursor past the last token
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Symbol => "symbol",
            TokenKind::Literal => "literal",
            TokenKind::Identifier => "identifier",
            TokenKind::Parameter => "parameter",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Unknown => "unknown",
            TokenKind::End => "end of input",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text; quoted identifiers are stored unquoted
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self { kind, text: text.into(), start, end }
    }

    pub fn end_of_input(offset: usize) -> Self {
        Self::new(TokenKind::End, "", offset, offset)
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(word)
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }
}

pub const KEYWORDS: &[&str] = &[
    "SELECT", "DISTINCT", "FROM", "AS", "JOIN", "INNER", "LEFT", "OUTER", "ON", "WHERE",
    "GROUP", "BY", "HAVING", "ORDER", "ASC", "DESC", "LIMIT", "OFFSET", "UNION", "ALL",
    "INSERT", "INTO", "VALUES", "UPDATE", "SET", "DELETE", "AND", "OR", "NOT", "LIKE",
    "CONTAINS", "IS", "IN", "NULL", "TRUE", "FALSE", "CASE", "WHEN", "THEN", "ELSE", "END",
    "RETURNING",
];

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"(?P<ws>\s+)",
        r#"|(?P<string>'(?:[^']|'')*')"#,
        r#"|(?P<quoted>"(?:[^"]|"")*"|`[^`]*`)"#,
        r"|(?P<number>[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?)",
        r"|(?P<param>\?|:[A-Za-z_][A-Za-z0-9_]*)",
        r"|(?P<path>[A-Za-z_][A-Za-z0-9_]*(?:\.(?:[A-Za-z_][A-Za-z0-9_]*|\*))+)",
        r"|(?P<word>[A-Za-z_][A-Za-z0-9_]*)",
        r"|(?P<symbol><=|>=|<>|!=|\|\||[(),.*+\-/%=<>;])",
        r")"
    ))
    .expect("token regex is valid")
});

pub struct Tokenizer;

impl Tokenizer {
    pub fn is_keyword(word: &str) -> bool {
        KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
    }

    /// Split `text` into tokens, whitespace included.
    pub fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        let mut position = 0;

        while position < text.len() {
            let rest = &text[position..];
            let Some(captures) = TOKEN_REGEX.captures(rest) else {
                let ch = rest.chars().next().unwrap_or_default();
                let token = Token::new(TokenKind::Unknown, ch.to_string(), position, position + ch.len_utf8());
                return ParseError::new("Unrecognized character", &token).err();
            };

            let (kind, matched) = if let Some(m) = captures.name("ws") {
                (TokenKind::Whitespace, m.as_str().to_string())
            } else if let Some(m) = captures.name("string") {
                (TokenKind::Literal, m.as_str().to_string())
            } else if let Some(m) = captures.name("quoted") {
                (TokenKind::Identifier, m.as_str().to_string())
            } else if let Some(m) = captures.name("number") {
                (TokenKind::Literal, m.as_str().to_string())
            } else if let Some(m) = captures.name("param") {
                (TokenKind::Parameter, m.as_str().to_string())
            } else if let Some(m) = captures.name("path") {
                (TokenKind::Identifier, m.as_str().to_string())
            } else if let Some(m) = captures.name("word") {
                let kind = if Self::is_keyword(m.as_str()) { TokenKind::Keyword } else { TokenKind::Identifier };
                (kind, m.as_str().to_string())
            } else if let Some(m) = captures.name("symbol") {
                (TokenKind::Symbol, m.as_str().to_string())
            } else {
                let token = Token::new(TokenKind::Unknown, "", position, position);
                return ParseError::new("Unrecognized token", &token).err();
            };

            let end = position + matched.len();
            let text = if captures.name("quoted").is_some() {
                Self::unquote(&matched)
            } else {
                matched
            };
            tokens.push(Token::new(kind, text, position, end));
            position = end;
        }

        Ok(tokens)
    }

    fn unquote(quoted: &str) -> String {
        let quote = &quoted[..1];
        let inner = &quoted[1..quoted.len() - 1];
        inner.replace(&format!("{quote}{quote}"), quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(TokenKind, String)> {
        Tokenizer::tokenize(text).unwrap()
            .into_iter()
            .filter(|t| t.kind != TokenKind::Whitespace)
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    pub fn test_tokenize_select() {
        let tokens = kinds("SELECT u.name, COUNT(*) FROM user u WHERE u.age >= 18");

        assert_eq!(tokens[0], (TokenKind::Keyword, "SELECT".to_string()));
        assert_eq!(tokens[1], (TokenKind::Identifier, "u.name".to_string()));
        assert_eq!(tokens[2], (TokenKind::Symbol, ",".to_string()));
        assert_eq!(tokens[3], (TokenKind::Identifier, "COUNT".to_string()));
        assert_eq!(tokens[5], (TokenKind::Symbol, "*".to_string()));
        assert_eq!(tokens[11], (TokenKind::Identifier, "u.age".to_string()));
        assert_eq!(tokens[12], (TokenKind::Symbol, ">=".to_string()));
        assert_eq!(tokens[13], (TokenKind::Literal, "18".to_string()));
    }

    #[test]
    pub fn test_tokenize_parameters_and_strings() {
        let tokens = kinds("name = :name AND note = 'it''s' OR id = ?");

        assert_eq!(tokens[2], (TokenKind::Parameter, ":name".to_string()));
        assert_eq!(tokens[6], (TokenKind::Literal, "'it''s'".to_string()));
        assert_eq!(tokens[10], (TokenKind::Parameter, "?".to_string()));
    }

    #[test]
    pub fn test_tokenize_wildcard_path_and_quoted() {
        let tokens = kinds(r#"SELECT u.*, "Order".id FROM "Order""#);

        assert_eq!(tokens[1], (TokenKind::Identifier, "u.*".to_string()));
        assert_eq!(tokens[3], (TokenKind::Identifier, "Order".to_string()));
        assert_eq!(tokens[4], (TokenKind::Symbol, ".".to_string()));
        assert_eq!(tokens[7], (TokenKind::Identifier, "Order".to_string()));
    }

    #[test]
    pub fn test_keywords_are_case_insensitive() {
        let tokens = kinds("select x from t order by x desc");
        assert_eq!(tokens[0].0, TokenKind::Keyword);
        assert_eq!(tokens[4].0, TokenKind::Keyword);
        assert_eq!(tokens[7].0, TokenKind::Keyword);
    }

    #[test]
    pub fn test_offsets() {
        let tokens = Tokenizer::tokenize("a  = 1").unwrap();
        let eq = tokens.iter().find(|t| t.text == "=").unwrap();
        assert_eq!(eq.start, 3);
        assert_eq!(eq.end, 4);
    }

    #[test]
    pub fn test_unknown_character() {
        let err = Tokenizer::tokenize("a = #").unwrap_err();
        assert_eq!(err.kind, TokenKind::Unknown);
        assert_eq!(err.start, 4);
        assert_eq!(err.text, "#");
    }

    #[test]
    pub fn test_unknown_multibyte_character() {
        let err = Tokenizer::tokenize("a = é").unwrap_err();
        assert_eq!((err.start, err.end), (4, 6));
        assert_eq!(err.text, "é");

        let err = Tokenizer::tokenize("a = \u{0663}").unwrap_err();
        assert_eq!(err.kind, TokenKind::Unknown);
        assert_eq!(err.message, "Unrecognized character");
        assert_eq!((err.start, err.end), (4, 6));
    }
}
