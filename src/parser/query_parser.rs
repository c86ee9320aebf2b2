use crate::parser::{ParseError, Token, TokenKind, Tokenizer};

/// Cursor over the non-whitespace tokens of one query text.
#[derive(Debug)]
pub struct QueryParser {
    pub position: usize,
    pub length: usize,
    pub tokens: Vec<Token>,
    pub text: String,
    /// Sentinel handed out by `current()` past the last token
    end: Token,
    /// Next ordinal for a positional `?` marker
    positional: usize,
}

impl QueryParser {
    pub fn new(query: &str) -> Result<Self, ParseError> {
        let tokens: Vec<Token> = Tokenizer::tokenize(query)?
            .into_iter()
            .filter(|token| token.kind != TokenKind::Whitespace)
            .collect();

        Ok(Self {
            position: 0,
            length: tokens.len(),
            tokens,
            text: query.to_string(),
            end: Token::end_of_input(query.len()),
            positional: 0,
        })
    }

    pub fn eof(&self) -> bool {
        self.position >= self.length
    }

    pub fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&self.end)
    }

    pub fn peek(&self, ahead: usize) -> Option<&Token> {
        self.tokens.get(self.position + ahead)
    }

    pub fn next(&mut self) {
        if self.position < self.length {
            self.position += 1;
        }
    }

    pub fn jump(&mut self, ahead: usize) {
        self.position = (self.position + ahead).min(self.length);
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.current().is_symbol(symbol)
    }

    pub fn consume_symbol(&mut self, symbol: &str) -> bool {
        if self.is_symbol(symbol) {
            self.next();
            return true;
        }

        false
    }

    pub fn expect_symbol(&mut self, symbol: &str) -> Result<(), ParseError> {
        if self.consume_symbol(symbol) {
            return Ok(());
        }

        self.error(&format!("Expected '{}'", symbol)).err()
    }

    /// Consume an identifier token and return its text.
    pub fn expect_identifier(&mut self, message: &str) -> Result<String, ParseError> {
        if self.current().kind == TokenKind::Identifier {
            let text = self.current().text.clone();
            self.next();
            return Ok(text);
        }

        self.error(message).err()
    }

    /// Error against the current token (or end of input).
    pub fn error(&self, message: &str) -> ParseError {
        ParseError::new(message, self.current())
    }

    pub fn next_positional(&mut self) -> usize {
        let ordinal = self.positional;
        self.positional += 1;
        ordinal
    }

    /// Fail on the first positional `?`. Text parsed on its own numbers them
    /// from zero, which clashes with the query it is spliced into.
    pub fn reject_positional(&self) -> Result<(), ParseError> {
        match self.tokens.iter().find(|token| token.kind == TokenKind::Parameter && token.text == "?") {
            Some(token) => ParseError::new("Positional parameter not allowed here, use a named parameter", token).err(),
            None => Ok(()),
        }
    }

    /// Skip an optional trailing `;` and require end of input.
    pub fn finish(&mut self) -> Result<(), ParseError> {
        self.consume_symbol(";");
        if !self.eof() {
            return self.error("Unexpected token").err();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{QueryParser, TokenKind};

    #[test]
    pub fn test_cursor_skips_whitespace() {
        let mut parser = QueryParser::new("  a ,\n b").unwrap();

        assert_eq!(parser.length, 3);
        assert_eq!(parser.current().text, "a");
        parser.next();
        assert!(parser.consume_symbol(","));
        assert_eq!(parser.current().text, "b");
        parser.next();
        assert!(parser.eof());
        assert_eq!(parser.current().kind, TokenKind::End);
    }

    #[test]
    pub fn test_expect_symbol_error() {
        let mut parser = QueryParser::new("a b").unwrap();
        parser.next();

        let err = parser.expect_symbol(")").unwrap_err();
        assert_eq!(err.text, "b");
        assert_eq!(err.kind, TokenKind::Identifier);
        assert_eq!(err.start, 2);
    }

    #[test]
    pub fn test_positional_ordinals() {
        let mut parser = QueryParser::new("?").unwrap();
        assert_eq!(parser.next_positional(), 0);
        assert_eq!(parser.next_positional(), 1);
    }

    #[test]
    pub fn test_reject_positional_points_at_marker() {
        let parser = QueryParser::new("a = :a AND b > ?").unwrap();
        let err = parser.reject_positional().unwrap_err();
        assert_eq!((err.start, err.end, err.text.as_str()), (15, 16, "?"));

        assert!(QueryParser::new("a = :a").unwrap().reject_positional().is_ok());
    }
}
