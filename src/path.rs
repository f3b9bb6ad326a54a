//! Tokenized pattern and query paths.
//!
//! A `Path` is the unit the graph indexes and searches: the composite key
//! `input <THAT> that <TOPIC> topic` split on single spaces into typed
//! tokens. The same tokenizer serves stored patterns and live queries, so the
//! two sides agree on canonical form by construction.
//!
//! Whitespace normalization is a caller concern; this module only splits on
//! single spaces and drops empty fragments.

use std::fmt;

use crate::{GraphError, MAX_PATH_LENGTH};

/// One pattern or query token.
///
/// Literal words are stored upper-cased, which is what makes matching
/// case-insensitive without a per-comparison fold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Literal word, normalized to upper case.
    Word(String),
    /// `$WORD`: a literal that outranks every wildcard tier.
    Priority(String),
    /// `#`: zero or more words, highest wildcard tier.
    Sharp,
    /// `_`: one or more words.
    Underscore,
    /// `<SET>NAME</SET>`: membership match against a named set.
    Set(String),
    /// `<THAT>` segment separator.
    That,
    /// `<TOPIC>` segment separator.
    Topic,
    /// `^`: zero or more words, low priority.
    Caret,
    /// `*`: one or more words, lowest priority.
    Star,
}

impl Token {
    pub fn parse(word: &str) -> Token {
        match word {
            "#" => return Token::Sharp,
            "_" => return Token::Underscore,
            "^" => return Token::Caret,
            "*" => return Token::Star,
            "<THAT>" => return Token::That,
            "<TOPIC>" => return Token::Topic,
            _ => {}
        }
        if let Some(caps) = regex!(r"(?i)^<SET>(.+)</SET>$").captures(word) {
            return Token::Set(caps[1].to_uppercase());
        }
        if let Some(rest) = word.strip_prefix('$') {
            if !rest.is_empty() {
                return Token::Priority(rest.to_uppercase());
            }
        }
        Token::Word(word.to_uppercase())
    }

    /// True for the `<THAT>`/`<TOPIC>` segment separators, which no wildcard
    /// or set run may consume.
    pub fn is_separator(&self) -> bool {
        matches!(self, Token::That | Token::Topic)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => f.write_str(w),
            Token::Priority(w) => write!(f, "${w}"),
            Token::Sharp => f.write_str("#"),
            Token::Underscore => f.write_str("_"),
            Token::Set(name) => write!(f, "<SET>{name}</SET>"),
            Token::That => f.write_str("<THAT>"),
            Token::Topic => f.write_str("<TOPIC>"),
            Token::Caret => f.write_str("^"),
            Token::Star => f.write_str("*"),
        }
    }
}

/// Render a token run back to sentence form. Inverse of tokenization for any
/// single-space-delimited input.
pub(crate) fn tokens_to_sentence(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&token.to_string());
    }
    out
}

/// An immutable token sequence built from one sentence or composite key.
///
/// Paths are rebuilt per call and never shared or mutated; during search the
/// remaining path is a subslice whose length drives height pruning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    tokens: Vec<Token>,
}

impl Path {
    /// Tokenize a single-space-delimited sentence.
    pub fn from_sentence(sentence: &str) -> Path {
        let tokens =
            sentence.trim().split(' ').filter(|w| !w.is_empty()).map(Token::parse).collect();
        Path { tokens }
    }

    /// The inverse of [`Path::from_sentence`].
    pub fn to_sentence(&self) -> String {
        tokens_to_sentence(&self.tokens)
    }

    /// Join input, that and topic into the composite sentence
    /// `input <THAT> that <TOPIC> topic`.
    pub fn input_that_topic(input: &str, that: &str, topic: &str) -> String {
        format!("{} <THAT> {} <TOPIC> {}", input.trim(), that.trim(), topic.trim())
    }

    /// Build and validate the composite key path for an (input, that, topic)
    /// triple.
    pub fn composite(input: &str, that: &str, topic: &str) -> Result<Path, GraphError> {
        let key = Self::input_that_topic(input, that, topic);
        let path = Path::from_sentence(&key);
        path.validate_composite(&key)?;
        Ok(path)
    }

    /// Check composite structure: exactly one `<THAT>` followed by exactly
    /// one `<TOPIC>`, and an overall length within the token limit.
    pub(crate) fn validate_composite(&self, key: &str) -> Result<(), GraphError> {
        if self.tokens.len() > MAX_PATH_LENGTH {
            return Err(GraphError::PathTooLong {
                length: self.tokens.len(),
                limit: MAX_PATH_LENGTH,
            });
        }

        let mut that_pos = None;
        let mut topic_pos = None;
        for (idx, token) in self.tokens.iter().enumerate() {
            match token {
                Token::That if that_pos.is_some() => {
                    return Err(GraphError::malformed(key, "duplicate <THAT> separator"));
                }
                Token::That => that_pos = Some(idx),
                Token::Topic if topic_pos.is_some() => {
                    return Err(GraphError::malformed(key, "duplicate <TOPIC> separator"));
                }
                Token::Topic => topic_pos = Some(idx),
                _ => {}
            }
        }

        match (that_pos, topic_pos) {
            (None, _) => Err(GraphError::malformed(key, "missing <THAT> separator")),
            (_, None) => Err(GraphError::malformed(key, "missing <TOPIC> separator")),
            (Some(t), Some(p)) if p < t => {
                Err(GraphError::malformed(key, "<TOPIC> separator precedes <THAT>"))
            }
            _ => Ok(()),
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
