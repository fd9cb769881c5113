// Script lexer - tokenizes expression source text

use super::token::Token;
use crate::error::{EngineError, Result};

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let input: Vec<char> = input.chars().collect();
        let current_char = input.first().copied();
        Lexer {
            input,
            position: 0,
            current_char,
        }
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();

        let Some(ch) = self.current_char else {
            return Ok(Token::Eof);
        };

        let token = match ch {
            '+' => self.single(Token::Plus),
            '-' => self.single(Token::Minus),
            '*' => self.single(Token::Star),
            '/' => {
                self.advance();
                // Check for comments
                if self.current_char == Some('/') {
                    self.skip_comment();
                    return self.next_token();
                }
                Token::Slash
            }
            '=' => self.with_equals(Token::Assign, Token::Equal),
            '!' => self.with_equals(Token::Bang, Token::NotEqual),
            '<' => self.with_equals(Token::Less, Token::LessEqual),
            '>' => self.with_equals(Token::Greater, Token::GreaterEqual),
            ':' => self.single(Token::Colon),
            '(' => self.single(Token::LeftParen),
            ')' => self.single(Token::RightParen),
            '{' => self.single(Token::LeftBrace),
            '}' => self.single(Token::RightBrace),
            '[' => self.single(Token::LeftBracket),
            ']' => self.single(Token::RightBracket),
            ',' => self.single(Token::Comma),
            ';' => self.single(Token::Semicolon),
            '.' => self.single(Token::Dot),
            '"' | '\'' => self.read_string(ch)?,
            c if c.is_alphabetic() || c == '_' => self.read_identifier(),
            c if c.is_ascii_digit() => self.read_number(),
            c => {
                return Err(EngineError::parse(format!(
                    "Unexpected character '{}' at position {}",
                    c, self.position
                )))
            }
        };

        Ok(token)
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    /// `plain`, or `with_equals` when the next character is '='
    fn with_equals(&mut self, plain: Token, with_equals: Token) -> Token {
        self.advance();
        if self.current_char == Some('=') {
            self.advance();
            with_equals
        } else {
            plain
        }
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    /// Peek at the next character without advancing
    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Skip whitespace characters, newlines included
    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip single-line comments starting with //
    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let mut identifier = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Check if it's a keyword
        Token::keyword_from_str(&identifier).unwrap_or(Token::Identifier(identifier))
    }

    /// Read a string literal delimited by `quote`
    fn read_string(&mut self, quote: char) -> Result<Token> {
        let start = self.position;
        self.advance(); // Skip opening quote
        let mut string = String::new();

        while let Some(ch) = self.current_char {
            if ch == quote {
                self.advance(); // Skip closing quote
                return Ok(Token::String(string));
            } else if ch == '\\' && self.peek() == Some(quote) {
                // Handle escaped quotes
                self.advance();
                string.push(quote);
                self.advance();
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Err(EngineError::parse(format!(
            "Unterminated string starting at position {}",
            start
        )))
    }

    /// Read a number (integer or decimal)
    fn read_number(&mut self) -> Token {
        let mut number = String::new();
        let mut has_dot = false;

        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.' && !has_dot && self.peek().is_some_and(|c| c.is_ascii_digit()) {
                has_dot = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::Number(number)
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize().unwrap()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            tokens("+ - * / = == != ! < > <= >= :"),
            vec![
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::Assign,
                Token::Equal,
                Token::NotEqual,
                Token::Bang,
                Token::Less,
                Token::Greater,
                Token::LessEqual,
                Token::GreaterEqual,
                Token::Colon,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(
            tokens(r#""hello world" 'single' "say \"hi\"""#),
            vec![
                Token::String("hello world".to_string()),
                Token::String("single".to_string()),
                Token::String("say \"hi\"".to_string()),
                Token::Eof,
            ]
        );

        assert!(matches!(
            Lexer::new("\"open").tokenize(),
            Err(EngineError::Parse(_))
        ));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("123 456.789 0.5"),
            vec![
                Token::Number("123".to_string()),
                Token::Number("456.789".to_string()),
                Token::Number("0.5".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_property_path_and_comments() {
        assert_eq!(
            tokens("Person.age // trailing comment\n> 2"),
            vec![
                Token::Identifier("Person".to_string()),
                Token::Dot,
                Token::Identifier("age".to_string()),
                Token::Greater,
                Token::Number("2".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            tokens("IF x Then y ENDIF"),
            vec![
                Token::If,
                Token::Identifier("x".to_string()),
                Token::Then,
                Token::Identifier("y".to_string()),
                Token::EndIf,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unexpected_character() {
        assert!(matches!(Lexer::new("a # b").tokenize(), Err(EngineError::Parse(_))));
    }
}
