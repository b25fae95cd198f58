//! The scanner: source text to a position-tagged token stream.
//!
//! Single-pass, non-backtracking and character-oriented; it never suspends
//! mid-token. What counts as an identifier is decided by the [Dialect],
//! character by character. A lexical anomaly (e.g. `!` not followed by `=`)
//! produces an [TokenKind::Illegal] token carrying its span, and no tokens
//! are emitted past that point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::dialect::Dialect;
use crate::error::{Error, Pos, Reason, Result, Span};
use crate::keywords::KEYWORDS;

/// A scanned token: kind (with its value) plus source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// A word: keyword, bare identifier or delimited identifier. The parser
    /// decides which role it plays.
    Keyword(Word),
    /// An unparsed numeric lexeme; a `.` inside makes it a double later
    Number(String),
    /// An unrecognised character
    Char(char),
    SingleQuotedString(String),
    NationalStringLiteral(String),
    /// Comment contents, without the `--`/`/* */` markers; a line comment
    /// keeps its trailing newline
    Comment(String),
    Whitespace(Whitespace),
    Comma,
    Eq,
    Neq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    LParen,
    RParen,
    Period,
    Colon,
    DoubleColon,
    Semicolon,
    Backslash,
    LBracket,
    RBracket,
    Ampersand,
    LBrace,
    RBrace,
    /// A lexical anomaly; always accompanied by an error
    Illegal(char),
    /// The end-of-input sentinel
    Eof,
}

/// The structured value of a word token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// The original-case text, without enclosing quotes
    pub value: String,
    /// The opening quote character of a delimited identifier, if any
    pub quote_style: Option<char>,
    /// The upper-cased text when it is in the keyword table, empty
    /// otherwise
    pub keyword: String,
}

impl Word {
    /// Classify a scanned word against the keyword set.
    fn classify(value: String, quote_style: Option<char>) -> Word {
        let upper = value.to_uppercase();
        let keyword = if quote_style.is_none() && KEYWORDS.contains(upper.as_str()) {
            upper
        } else {
            String::new()
        };
        Word {
            value,
            quote_style,
            keyword,
        }
    }

    fn closing_quote(ch: char) -> char {
        match ch {
            '[' => ']',
            quote => quote,
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quote_style {
            Some(open) => write!(f, "{open}{}{}", self.value, Word::closing_quote(open)),
            None => f.write_str(&self.value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Whitespace {
    Space,
    /// One line ending; CRLF collapses into a single newline
    Newline,
    Tab,
}

impl fmt::Display for Whitespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Whitespace::Space => f.write_str(" "),
            Whitespace::Newline => f.write_str("\n"),
            Whitespace::Tab => f.write_str("\t"),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        match self {
            Keyword(word) => write!(f, "{word}"),
            Number(n) => f.write_str(n),
            Char(c) => write!(f, "{c}"),
            SingleQuotedString(s) => write!(f, "'{s}'"),
            NationalStringLiteral(s) => write!(f, "N'{s}'"),
            Comment(_) => f.write_str("a comment"),
            Whitespace(ws) => write!(f, "{ws}"),
            Comma => f.write_str(","),
            Eq => f.write_str("="),
            Neq => f.write_str("<>"),
            Lt => f.write_str("<"),
            Gt => f.write_str(">"),
            LtEq => f.write_str("<="),
            GtEq => f.write_str(">="),
            Plus => f.write_str("+"),
            Minus => f.write_str("-"),
            Mult => f.write_str("*"),
            Div => f.write_str("/"),
            Mod => f.write_str("%"),
            LParen => f.write_str("("),
            RParen => f.write_str(")"),
            Period => f.write_str("."),
            Colon => f.write_str(":"),
            DoubleColon => f.write_str("::"),
            Semicolon => f.write_str(";"),
            Backslash => f.write_str("\\"),
            LBracket => f.write_str("["),
            RBracket => f.write_str("]"),
            Ampersand => f.write_str("&"),
            LBrace => f.write_str("{"),
            RBrace => f.write_str("}"),
            Illegal(c) => write!(f, "{c}"),
            Eof => f.write_str("end of input"),
        }
    }
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    dialect: &'a dyn Dialect,
    pos: Pos,
}

impl<'a> Lexer<'a> {
    pub fn new(sql: &'a str, dialect: &'a dyn Dialect) -> Self {
        Lexer {
            chars: sql.chars().peekable(),
            dialect,
            pos: Pos::first(),
        }
    }

    /// Scan the whole input. Fails on the first lexical anomaly, with the
    /// span of the offending characters.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            if let TokenKind::Illegal(ch) = token.kind {
                return Err(Error::new(Reason::Simple(format!(
                    "illegal token starting with {ch:?}"
                )))
                .with_span(Some(token.span)));
            }
            tokens.push(token);
        }
        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.pos, self.pos),
        });
        log::trace!("tokenized {} tokens", tokens.len());
        Ok(tokens)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Consume one character, advancing the position counters. CR and CRLF
    /// are both normalised to a single `\n`.
    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        match ch {
            '\n' => {
                self.pos.line += 1;
                self.pos.column = 0;
                Some('\n')
            }
            '\r' => {
                if self.peek() == Some('\n') {
                    self.chars.next();
                }
                self.pos.line += 1;
                self.pos.column = 0;
                Some('\n')
            }
            '\t' => {
                self.pos.column += 4;
                Some('\t')
            }
            _ => {
                self.pos.column += 1;
                Some(ch)
            }
        }
    }

    fn token(&self, start: Pos, kind: TokenKind) -> Result<Option<Token>, Error> {
        Ok(Some(Token {
            kind,
            span: Span::new(start, self.pos),
        }))
    }

    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        let start = self.pos;
        let Some(ch) = self.peek() else {
            return Ok(None);
        };
        match ch {
            ' ' => {
                self.bump();
                self.token(start, TokenKind::Whitespace(Whitespace::Space))
            }
            '\t' => {
                self.bump();
                self.token(start, TokenKind::Whitespace(Whitespace::Tab))
            }
            '\n' | '\r' => {
                self.bump();
                self.token(start, TokenKind::Whitespace(Whitespace::Newline))
            }
            'N' => {
                self.bump();
                if self.peek() == Some('\'') {
                    let s = self.scan_single_quoted_string(start)?;
                    self.token(start, TokenKind::NationalStringLiteral(s))
                } else {
                    let word = self.scan_word(Some('N'));
                    self.token(start, TokenKind::Keyword(word))
                }
            }
            '\'' => {
                let s = self.scan_single_quoted_string(start)?;
                self.token(start, TokenKind::SingleQuotedString(s))
            }
            ch if self.dialect.is_delimited_identifier_start(ch) => {
                self.bump();
                let closing = Word::closing_quote(ch);
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == closing => break,
                        Some(c) => value.push(c),
                        None => {
                            return Err(Error::simple(format!(
                                "unterminated delimited identifier, expected closing {closing:?}"
                            ))
                            .with_span(Some(Span::new(start, self.pos))));
                        }
                    }
                }
                self.token(start, TokenKind::Keyword(Word::classify(value, Some(ch))))
            }
            ch if self.dialect.is_identifier_start(ch) => {
                let word = self.scan_word(None);
                self.token(start, TokenKind::Keyword(word))
            }
            '0'..='9' => {
                let mut lexeme = String::new();
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        lexeme.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
                self.token(start, TokenKind::Number(lexeme))
            }
            '-' => {
                self.bump();
                if self.peek() == Some('-') {
                    self.bump();
                    let mut text = String::new();
                    while let Some(c) = self.bump() {
                        text.push(c);
                        if c == '\n' {
                            break;
                        }
                    }
                    self.token(start, TokenKind::Comment(text))
                } else {
                    self.token(start, TokenKind::Minus)
                }
            }
            '/' => {
                self.bump();
                if self.peek() == Some('*') {
                    self.bump();
                    let mut text = String::new();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(c) => text.push(c),
                            None => {
                                return Err(Error::simple(
                                    "unterminated multi-line comment, expected */",
                                )
                                .with_span(Some(Span::new(start, self.pos))));
                            }
                        }
                    }
                    self.token(start, TokenKind::Comment(text))
                } else {
                    self.token(start, TokenKind::Div)
                }
            }
            '!' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    self.token(start, TokenKind::Neq)
                } else {
                    self.token(start, TokenKind::Illegal('!'))
                }
            }
            '<' => {
                self.bump();
                match self.peek() {
                    Some('=') => {
                        self.bump();
                        self.token(start, TokenKind::LtEq)
                    }
                    Some('>') => {
                        self.bump();
                        self.token(start, TokenKind::Neq)
                    }
                    _ => self.token(start, TokenKind::Lt),
                }
            }
            '>' => {
                self.bump();
                if self.peek() == Some('=') {
                    self.bump();
                    self.token(start, TokenKind::GtEq)
                } else {
                    self.token(start, TokenKind::Gt)
                }
            }
            ':' => {
                self.bump();
                if self.peek() == Some(':') {
                    self.bump();
                    self.token(start, TokenKind::DoubleColon)
                } else {
                    self.token(start, TokenKind::Colon)
                }
            }
            '=' => {
                self.bump();
                self.token(start, TokenKind::Eq)
            }
            '+' => {
                self.bump();
                self.token(start, TokenKind::Plus)
            }
            '*' => {
                self.bump();
                self.token(start, TokenKind::Mult)
            }
            '%' => {
                self.bump();
                self.token(start, TokenKind::Mod)
            }
            '(' => {
                self.bump();
                self.token(start, TokenKind::LParen)
            }
            ')' => {
                self.bump();
                self.token(start, TokenKind::RParen)
            }
            ',' => {
                self.bump();
                self.token(start, TokenKind::Comma)
            }
            '.' => {
                self.bump();
                self.token(start, TokenKind::Period)
            }
            ';' => {
                self.bump();
                self.token(start, TokenKind::Semicolon)
            }
            '\\' => {
                self.bump();
                self.token(start, TokenKind::Backslash)
            }
            '[' => {
                self.bump();
                self.token(start, TokenKind::LBracket)
            }
            ']' => {
                self.bump();
                self.token(start, TokenKind::RBracket)
            }
            '&' => {
                self.bump();
                self.token(start, TokenKind::Ampersand)
            }
            '{' => {
                self.bump();
                self.token(start, TokenKind::LBrace)
            }
            '}' => {
                self.bump();
                self.token(start, TokenKind::RBrace)
            }
            other => {
                self.bump();
                self.token(start, TokenKind::Char(other))
            }
        }
    }

    /// Read the rest of a word whose first character (if already consumed)
    /// is passed in `first`.
    fn scan_word(&mut self, first: Option<char>) -> Word {
        let mut value = String::new();
        if let Some(ch) = first {
            value.push(ch);
        } else if let Some(ch) = self.bump() {
            value.push(ch);
        }
        while let Some(ch) = self.peek() {
            if self.dialect.is_identifier_part(ch) {
                value.push(ch);
                self.bump();
            } else {
                break;
            }
        }
        Word::classify(value, None)
    }

    /// Read a single-quoted string; a doubled `''` is an embedded quote.
    /// The opening quote has not been consumed yet.
    fn scan_single_quoted_string(&mut self, start: Pos) -> Result<String, Error> {
        self.bump(); // opening '
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        self.bump();
                        value.push('\'');
                    } else {
                        return Ok(value);
                    }
                }
                Some(ch) => value.push(ch),
                None => {
                    return Err(Error::simple("unterminated string literal")
                        .with_span(Some(Span::new(start, self.pos))));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{GenericDialect, MySqlDialect};

    fn kinds(sql: &str) -> Vec<TokenKind> {
        Lexer::new(sql, &GenericDialect)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn word(value: &str) -> TokenKind {
        TokenKind::Keyword(Word::classify(value.to_string(), None))
    }

    #[test]
    fn test_select_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds("SELECT * FROM t"),
            vec![
                word("SELECT"),
                Whitespace(super::Whitespace::Space),
                Mult,
                Whitespace(super::Whitespace::Space),
                word("FROM"),
                Whitespace(super::Whitespace::Space),
                word("t"),
                Eof,
            ]
        );
    }

    #[test]
    fn test_both_neq_spellings() {
        assert_eq!(kinds("a <> b")[2], TokenKind::Neq);
        assert_eq!(kinds("a != b")[2], TokenKind::Neq);
    }

    #[test]
    fn test_number_keeps_period() {
        assert_eq!(kinds("12.34"), vec![TokenKind::Number("12.34".into()), TokenKind::Eof]);
    }

    #[test]
    fn test_doubled_quote_escape() {
        assert_eq!(
            kinds("'it''s'"),
            vec![TokenKind::SingleQuotedString("it's".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_national_string_and_word_starting_with_n() {
        assert_eq!(
            kinds("N'data'"),
            vec![TokenKind::NationalStringLiteral("data".into()), TokenKind::Eof]
        );
        assert_eq!(kinds("Name")[0], word("Name"));
    }

    #[test]
    fn test_line_comment_includes_newline() {
        let tokens = kinds("-- note\n1");
        assert_eq!(tokens[0], TokenKind::Comment(" note\n".into()));
        assert_eq!(tokens[1], TokenKind::Number("1".into()));
    }

    #[test]
    fn test_multiline_comment() {
        assert_eq!(
            kinds("/* a\nb */ x")[0],
            TokenKind::Comment(" a\nb ".into())
        );
    }

    #[test]
    fn test_crlf_collapses() {
        let tokens = Lexer::new("a\r\nb", &GenericDialect).tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Whitespace(Whitespace::Newline));
        assert_eq!(tokens[2].span.start, Pos::new(2, 0));
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_positions_and_tab_width() {
        let tokens = Lexer::new("a\tb\nc", &GenericDialect).tokenize().unwrap();
        // a [0,1), tab, b [5,6), newline, c at line 2
        assert_eq!(tokens[0].span, Span::new(Pos::new(1, 0), Pos::new(1, 1)));
        assert_eq!(tokens[2].span, Span::new(Pos::new(1, 5), Pos::new(1, 6)));
        assert_eq!(tokens[4].span, Span::new(Pos::new(2, 0), Pos::new(2, 1)));
    }

    #[test]
    fn test_double_colon_and_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("a::int"),
            vec![word("a"), DoubleColon, word("int"), Eof]
        );
        assert_eq!(kinds("a <= b")[2], LtEq);
        assert_eq!(kinds("a >= b")[2], GtEq);
        assert_eq!(kinds("a % b")[2], Mod);
    }

    #[test]
    fn test_delimited_identifiers() {
        let tokens = Lexer::new(r#""col name""#, &GenericDialect).tokenize().unwrap();
        assert_eq!(
            tokens[0].kind,
            TokenKind::Keyword(Word {
                value: "col name".into(),
                quote_style: Some('"'),
                keyword: String::new(),
            })
        );

        // A quoted word is never classified as a keyword, even if its
        // uppercase form is one.
        let tokens = Lexer::new("`select`", &MySqlDialect).tokenize().unwrap();
        assert_eq!(
            tokens[0].kind,
            TokenKind::Keyword(Word {
                value: "select".into(),
                quote_style: Some('`'),
                keyword: String::new(),
            })
        );
    }

    #[test]
    fn test_word_classification() {
        let tokens = Lexer::new("Select my_column", &GenericDialect)
            .tokenize()
            .unwrap();
        assert_eq!(
            tokens[0].kind,
            TokenKind::Keyword(Word {
                value: "Select".into(),
                quote_style: None,
                keyword: "SELECT".into(),
            })
        );
        assert_eq!(
            tokens[2].kind,
            TokenKind::Keyword(Word {
                value: "my_column".into(),
                quote_style: None,
                keyword: String::new(),
            })
        );
    }

    #[test]
    fn test_illegal_bang() {
        let err = Lexer::new("a ! b", &GenericDialect).tokenize().unwrap_err();
        assert_eq!(err.span, Some(Span::new(Pos::new(1, 2), Pos::new(1, 3))));
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("'abc", &GenericDialect).tokenize().unwrap_err();
        assert!(err.reason.message().contains("unterminated string"));
    }

    #[test]
    fn test_unknown_char() {
        assert_eq!(kinds("?")[0], TokenKind::Char('?'));
    }

    #[test]
    fn test_remaining_punctuation() {
        use TokenKind::*;
        assert_eq!(
            kinds(r"; : . \ [ ] & { }")
                .into_iter()
                .filter(|k| !matches!(k, Whitespace(_)))
                .collect::<Vec<_>>(),
            vec![
                Semicolon, Colon, Period, Backslash, LBracket, RBracket, Ampersand, LBrace,
                RBrace, Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = Lexer::new("/* open", &GenericDialect).tokenize().unwrap_err();
        assert!(err.reason.message().contains("unterminated multi-line"));
    }

    #[test]
    fn test_unterminated_delimited_identifier() {
        let err = Lexer::new("\"open", &GenericDialect).tokenize().unwrap_err();
        assert!(err.reason.message().contains("delimited identifier"));
    }
}
