// Syntax module - script lexing and parsing

pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::Lexer;
pub use parser::Parser;
pub use token::Token;

use crate::error::Result;
use crate::expression::{Expression, Script};
use crate::report;

/// Parse a multi-statement program
pub fn parse_script(source: &str) -> Result<Script> {
    Parser::new(source)
        .and_then(|mut parser| parser.parse_script())
        .map_err(report::report)
}

/// Parse a single expression; trailing input is an error
pub fn parse_expression(source: &str) -> Result<Expression> {
    Parser::new(source)
        .and_then(|mut parser| parser.parse_single_expression())
        .map_err(report::report)
}
