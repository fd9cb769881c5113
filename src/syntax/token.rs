// Script tokens for lexical analysis

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Identifier(String),
    Number(String),
    String(String),

    // Keywords
    And,
    Or,
    Xor,
    Not,
    In,
    Is,
    Empty,
    If,
    Then,
    Else,
    EndIf,
    Function,
    Project,
    Where,
    True,
    False,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Assign,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Bang,
    Colon,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Semicolon,
    Dot,

    // Special
    Eof,
}

impl Token {
    /// Check if the token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::And
                | Token::Or
                | Token::Xor
                | Token::Not
                | Token::In
                | Token::Is
                | Token::Empty
                | Token::If
                | Token::Then
                | Token::Else
                | Token::EndIf
                | Token::Function
                | Token::Project
                | Token::Where
                | Token::True
                | Token::False
        )
    }

    /// Convert a word to a keyword token if it matches, ignoring case
    pub fn keyword_from_str(s: &str) -> Option<Token> {
        match s.to_lowercase().as_str() {
            "and" => Some(Token::And),
            "or" => Some(Token::Or),
            "xor" => Some(Token::Xor),
            "not" => Some(Token::Not),
            "in" => Some(Token::In),
            "is" => Some(Token::Is),
            "empty" => Some(Token::Empty),
            "if" => Some(Token::If),
            "then" => Some(Token::Then),
            "else" => Some(Token::Else),
            "endif" => Some(Token::EndIf),
            "function" => Some(Token::Function),
            "project" => Some(Token::Project),
            "where" => Some(Token::Where),
            "true" => Some(Token::True),
            "false" => Some(Token::False),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_detection() {
        assert!(Token::Project.is_keyword());
        assert!(Token::EndIf.is_keyword());
        assert!(!Token::Identifier("test".to_string()).is_keyword());
        assert!(!Token::Plus.is_keyword());
    }

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Token::keyword_from_str("if"), Some(Token::If));
        assert_eq!(Token::keyword_from_str("ENDIF"), Some(Token::EndIf));
        assert_eq!(Token::keyword_from_str("Where"), Some(Token::Where));
        assert_eq!(Token::keyword_from_str("unknown"), None);
    }
}
