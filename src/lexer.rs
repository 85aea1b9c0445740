use std::fmt;

use thiserror::Error;

use crate::ast::Token;

/// Language dialect accepted by the lexer and parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grammar {
    /// Operators and literals only: no `**`, no `0b` literals, no `AND`/`OR`/`NOT`.
    Basic,
    /// Full expression language.
    #[default]
    Extended,
    /// Extended plus the single `=` comparison used by query filters.
    Filter,
}

impl Grammar {
    fn has_extensions(self) -> bool {
        !matches!(self, Grammar::Basic)
    }
}

/// Location of a character in the source text.
///
/// `offset` counts characters (not bytes); `line` and `column` start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A token together with the source range it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position },
    #[error("malformed number '{text}' at {position}")]
    MalformedNumber { text: String, position: Position },
    #[error("unexpected character '{character}' at {position}")]
    UnexpectedCharacter { character: char, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnterminatedString { position }
            | LexError::MalformedNumber { position, .. }
            | LexError::UnexpectedCharacter { position, .. } => *position,
        }
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    grammar: Grammar,
    done: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self::with_grammar(input, Grammar::default())
    }

    pub fn with_grammar(input: &str, grammar: Grammar) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            grammar,
            done: false,
        }
    }

    pub fn grammar(&self) -> Grammar {
        self.grammar
    }

    /// Current cursor location.
    pub fn location(&self) -> Position {
        Position {
            offset: self.position,
            line: self.line,
            column: self.column,
        }
    }

    /// Source text between two character offsets.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.input.len());
        let start = start.min(end);
        self.input[start..end].iter().collect()
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if is_identifier_continue(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.location();
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    match self.current_char() {
                        Some(c) if c == quote || c == '\\' => result.push(c),
                        Some(c) => {
                            result.push('\\');
                            result.push(c);
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    fn malformed(&self, start: Position) -> LexError {
        LexError::MalformedNumber {
            text: self.slice(start.offset, self.position + 1),
            position: start,
        }
    }

    /// Rejects numbers glued to a following word, digit or fraction.
    fn check_number_end(&self, start: Position) -> Result<(), LexError> {
        match self.current_char() {
            Some(ch) if is_identifier_continue(ch) || ch == '.' => Err(self.malformed(start)),
            _ => Ok(()),
        }
    }

    fn read_radix(&mut self, start: Position, radix: u32) -> Result<Token, LexError> {
        self.advance_by(2); // 0x / 0b
        let mut value = 0f64;
        let mut digits = 0;
        while let Some(digit) = self.current_char().and_then(|c| c.to_digit(radix)) {
            value = value * radix as f64 + digit as f64;
            digits += 1;
            self.advance();
        }
        if digits == 0 {
            return Err(self.malformed(start));
        }
        self.check_number_end(start)?;
        Ok(Token::Number(value))
    }

    fn read_digits(&mut self) -> String {
        let mut digits = String::new();
        while let Some(ch) = self.current_char().filter(|c| c.is_ascii_digit()) {
            digits.push(ch);
            self.advance();
        }
        digits
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.location();

        if self.current_char() == Some('0') {
            match self.peek_char(1) {
                Some('x' | 'X') => return self.read_radix(start, 16),
                Some('b' | 'B') if self.grammar.has_extensions() => {
                    return self.read_radix(start, 2);
                }
                _ => {}
            }
        }

        let integer = self.read_digits();
        let mut fraction = String::new();
        if self.current_char() == Some('.') {
            self.advance();
            fraction = self.read_digits();
            if integer.is_empty() && fraction.is_empty() {
                return Err(self.malformed(start));
            }
        }

        let mut exponent = String::from("0");
        if matches!(self.current_char(), Some('e' | 'E')) {
            self.advance();
            let mut sign = "";
            if let Some(ch @ ('+' | '-')) = self.current_char() {
                sign = if ch == '-' { "-" } else { "" };
                self.advance();
            }
            let digits = self.read_digits();
            if digits.is_empty() {
                return Err(self.malformed(start));
            }
            exponent = format!("{}{}", sign, digits);
        }

        self.check_number_end(start)?;

        let text = format!(
            "{}.{}e{}",
            if integer.is_empty() { "0" } else { &integer },
            if fraction.is_empty() { "0" } else { &fraction },
            exponent
        );
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| self.malformed(start))
    }

    fn read_word_token(&mut self) -> Token {
        let extended = self.grammar.has_extensions();

        // Filters only write `NOT(...)`, so field names like `NOTES` stay whole.
        if self.grammar == Grammar::Extended
            && self.input[self.position..].starts_with(&['N', 'O', 'T'])
        {
            self.advance_by(3);
            return Token::Not;
        }

        let word = self.read_word();
        match word.as_str() {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "null" => Token::Null,
            "NOT" if extended => Token::Not,
            "AND" if extended => Token::And,
            "OR" if extended => Token::Or,
            _ => Token::Identifier(word),
        }
    }

    /// Consumes `len` characters and yields `token`.
    fn emit(&mut self, len: usize, token: Token) -> Result<Token, LexError> {
        self.advance_by(len);
        Ok(token)
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.next_spanned().map(|spanned| spanned.token)
    }

    pub fn next_spanned(&mut self) -> Result<Spanned, LexError> {
        self.skip_whitespace();
        let start = self.location();
        let token = self.scan()?;
        Ok(Spanned {
            token,
            start,
            end: self.location(),
        })
    }

    fn scan(&mut self) -> Result<Token, LexError> {
        let next = self.peek_char(1);
        let after = self.peek_char(2);

        match self.current_char() {
            None => Ok(Token::Eof),
            Some('+') if next == Some('+') => self.emit(2, Token::Increment),
            Some('+') => self.emit(1, Token::Plus),
            Some('-') if next == Some('-') => self.emit(2, Token::Decrement),
            Some('-') => self.emit(1, Token::Minus),
            Some('*') if next == Some('*') && self.grammar.has_extensions() => {
                self.emit(2, Token::StarStar)
            }
            Some('*') => self.emit(1, Token::Star),
            Some('/') => self.emit(1, Token::Slash),
            Some('%') => self.emit(1, Token::Percent),
            Some('^') => self.emit(1, Token::Caret),
            Some('~') => self.emit(1, Token::Tilde),
            Some('<') => match next {
                Some('<') => self.emit(2, Token::Shl),
                Some('=') => self.emit(2, Token::LtEq),
                _ => self.emit(1, Token::Lt),
            },
            Some('>') => match (next, after) {
                (Some('>'), Some('>')) => self.emit(3, Token::UShr),
                (Some('>'), _) => self.emit(2, Token::Shr),
                (Some('='), _) => self.emit(2, Token::GtEq),
                _ => self.emit(1, Token::Gt),
            },
            Some('=') => match (next, after) {
                (Some('='), Some('=')) => self.emit(3, Token::EqEqEq),
                (Some('='), _) => self.emit(2, Token::EqEq),
                _ if self.grammar == Grammar::Filter => self.emit(1, Token::Assign),
                _ => Err(LexError::UnexpectedCharacter {
                    character: '=',
                    position: self.location(),
                }),
            },
            Some('!') => match (next, after) {
                (Some('='), Some('=')) => self.emit(3, Token::NotEqEq),
                (Some('='), _) => self.emit(2, Token::NotEq),
                _ => self.emit(1, Token::Bang),
            },
            Some('&') if next == Some('&') => self.emit(2, Token::AmpAmp),
            Some('&') => self.emit(1, Token::Ampersand),
            Some('|') if next == Some('|') => self.emit(2, Token::PipePipe),
            Some('|') => self.emit(1, Token::Pipe),
            Some('?') if next == Some(':') => self.emit(2, Token::Elvis),
            Some('?') => self.emit(1, Token::Question),
            Some(':') => self.emit(1, Token::Colon),
            Some(',') => self.emit(1, Token::Comma),
            Some('(') => self.emit(1, Token::LParen),
            Some(')') => self.emit(1, Token::RParen),
            Some('[') => self.emit(1, Token::LBracket),
            Some(']') => self.emit(1, Token::RBracket),
            Some('{') => self.emit(1, Token::LBrace),
            Some('}') => self.emit(1, Token::RBrace),
            Some('.') if next.is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            Some('.') => self.emit(1, Token::Dot),
            Some(quote @ ('"' | '\'' | '`')) => self.read_string(quote).map(Token::String),
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) if is_identifier_start(ch) => Ok(self.read_word_token()),
            Some(ch) => Err(LexError::UnexpectedCharacter {
                character: ch,
                position: self.location(),
            }),
        }
    }
}

impl Iterator for Lexer {
    type Item = Result<Spanned, LexError>;

    /// Yields every token up to and including `Eof`, or the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_spanned();
        match &item {
            Ok(Spanned { token: Token::Eof, .. }) | Err(_) => self.done = true,
            Ok(_) => {}
        }
        Some(item)
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("true false null AND OR NOT");
    assert_eq!(lexer.next_token(), Ok(Token::Boolean(true)));
    assert_eq!(lexer.next_token(), Ok(Token::Boolean(false)));
    assert_eq!(lexer.next_token(), Ok(Token::Null));
    assert_eq!(lexer.next_token(), Ok(Token::And));
    assert_eq!(lexer.next_token(), Ok(Token::Or));
    assert_eq!(lexer.next_token(), Ok(Token::Not));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_basic_grammar_keeps_words() {
    let mut lexer = Lexer::with_grammar("AND NOTx 2**3", Grammar::Basic);
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("AND".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("NOTx".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Number(2.0)));
    assert_eq!(lexer.next_token(), Ok(Token::Star));
    assert_eq!(lexer.next_token(), Ok(Token::Star));
}

#[test]
fn test_filter_grammar_keeps_not_prefixed_words() {
    let mut lexer = Lexer::with_grammar("NOTES NOT(NOTx", Grammar::Filter);
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("NOTES".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Not));
    assert_eq!(lexer.next_token(), Ok(Token::LParen));
    assert_eq!(lexer.next_token(), Ok(Token::Identifier("NOTx".to_string())));
}

#[test]
fn test_location_follows_the_cursor() {
    let mut lexer = Lexer::new("ab\n  cd");
    assert_eq!(lexer.location(), Position { offset: 0, line: 1, column: 1 });
    lexer.next_token().unwrap();
    lexer.next_token().unwrap();
    assert_eq!(lexer.location(), Position { offset: 7, line: 2, column: 5 });
}

#[test]
fn test_positions_track_lines() {
    let mut lexer = Lexer::new("a\n  + b");
    lexer.next_spanned().unwrap();
    let plus = lexer.next_spanned().unwrap();
    assert_eq!(plus.token, Token::Plus);
    assert_eq!(plus.start, Position { offset: 4, line: 2, column: 3 });
}
