use crate::parser::QueryParser;

/// Matches a (possibly multi-word) keyword against the token stream at the
/// parser's current position, case-insensitively.
#[derive(Debug, Default)]
pub struct WordComparer {
    /// Number of tokens the keyword spans
    pub length: usize,
    pub words: Vec<String>,
}

impl WordComparer {
    pub fn new(word: &str) -> Self {
        let words: Vec<String> = word.split_whitespace().map(|w| w.to_uppercase()).collect();
        Self {
            length: words.len(),
            words,
        }
    }

    pub fn compare(&self, parser: &QueryParser) -> bool {
        self.words.iter().enumerate().all(|(offset, word)| {
            parser.peek(offset).is_some_and(|token| token.is_keyword(word))
        })
    }

    /// Compare and, on a match, move the parser past the keyword.
    pub fn consume(&self, parser: &mut QueryParser) -> bool {
        if self.compare(parser) {
            parser.jump(self.length);
            return true;
        }

        false
    }
}
