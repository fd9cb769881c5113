// Script parser - converts tokens to an expression tree

use super::lexer::Lexer;
use super::token::Token;
use crate::error::{EngineError, Result};
use crate::expression::{
    ArithmeticOp, BinaryOp, BooleanOp, ComparisonOp, ContainsOp, Expression, FunctionScript,
    Script, UnaryOp,
};
use crate::value::Value;

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Parser {
            tokens,
            position: 0,
        })
    }

    /// Parse a whole program: statements and function definitions
    pub fn parse_script(&mut self) -> Result<Script> {
        let mut script = Script::default();

        loop {
            self.skip_separators();
            match self.current_token() {
                Token::Eof => break,
                Token::Function => {
                    let function = self.parse_function()?;
                    script.add_function(function);
                }
                _ => script.statements.push(self.parse_statement()?),
            }
        }

        Ok(script)
    }

    /// Parse a single expression that must span the whole input
    pub fn parse_single_expression(&mut self) -> Result<Expression> {
        let expr = self.parse_expression()?;
        self.skip_separators();
        if !self.match_token(&Token::Eof) {
            return self.error(format!("Unexpected token: {:?}", self.current_token()));
        }
        Ok(expr)
    }

    /// Parse `function name(p1, p2) { statements }`
    fn parse_function(&mut self) -> Result<FunctionScript> {
        self.expect_token(Token::Function)?;
        let name = self.expect_identifier()?;

        self.expect_token(Token::LeftParen)?;
        let parameters = if self.match_token(&Token::RightParen) {
            vec![]
        } else {
            self.parse_identifier_list()?
        };
        self.expect_token(Token::RightParen)?;

        self.expect_token(Token::LeftBrace)?;
        let body = self.parse_statements(&[Token::RightBrace])?;
        self.expect_token(Token::RightBrace)?;

        Ok(FunctionScript::new(name, parameters, body))
    }

    /// Parse statements up to (not including) one of `terminators`
    fn parse_statements(&mut self, terminators: &[Token]) -> Result<Vec<Expression>> {
        let mut statements = vec![];

        loop {
            self.skip_separators();
            let token = self.current_token();
            if terminators.contains(&token) {
                break;
            }
            if token == Token::Eof {
                return self.error(format!("Expected {:?}, found end of input", terminators[0]));
            }
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse an assignment or a bare expression
    fn parse_statement(&mut self) -> Result<Expression> {
        if let Token::Identifier(name) = self.current_token() {
            if self.peek_token() == Token::Assign {
                self.advance();
                self.advance();
                let value = self.parse_expression()?;
                return Ok(Expression::assign(name, value));
            }
        }
        self.parse_expression()
    }

    /// Parse expression
    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_or()
    }

    /// Parse OR expression
    fn parse_or(&mut self) -> Result<Expression> {
        let mut left = self.parse_xor()?;

        while self.match_token(&Token::Or) {
            self.advance();
            let right = self.parse_xor()?;
            left = Expression::or(left, right);
        }

        Ok(left)
    }

    /// Parse XOR expression
    fn parse_xor(&mut self) -> Result<Expression> {
        let mut left = self.parse_and()?;

        while self.match_token(&Token::Xor) {
            self.advance();
            let right = self.parse_and()?;
            left = Expression::binary(BinaryOp::Boolean(BooleanOp::Xor), left, right);
        }

        Ok(left)
    }

    /// Parse AND expression
    fn parse_and(&mut self) -> Result<Expression> {
        let mut left = self.parse_not()?;

        while self.match_token(&Token::And) {
            self.advance();
            let right = self.parse_not()?;
            left = Expression::and(left, right);
        }

        Ok(left)
    }

    /// Parse NOT expression
    fn parse_not(&mut self) -> Result<Expression> {
        if self.match_token(&Token::Not) || self.match_token(&Token::Bang) {
            self.advance();
            let operand = self.parse_not()?;
            Ok(Expression::unary(UnaryOp::Not, operand))
        } else {
            self.parse_comparison()
        }
    }

    /// Parse comparison expression
    fn parse_comparison(&mut self) -> Result<Expression> {
        let left = self.parse_addition()?;

        // Handle special comparison operators
        if self.match_token(&Token::Is) {
            self.advance();
            let negated = if self.match_token(&Token::Not) {
                self.advance();
                true
            } else {
                false
            };
            self.expect_token(Token::Empty)?;
            let op = if negated {
                UnaryOp::IsNotEmpty
            } else {
                UnaryOp::IsEmpty
            };
            return Ok(Expression::unary(op, left));
        }

        if self.match_token(&Token::In) {
            self.advance();
            let right = self.parse_addition()?;
            return Ok(Expression::contains(ContainsOp::In, left, right));
        }

        if self.match_token(&Token::Not) && self.peek_token() == Token::In {
            self.advance();
            self.advance();
            let right = self.parse_addition()?;
            return Ok(Expression::contains(ContainsOp::NotIn, left, right));
        }

        // Standard comparison operators
        let op = match self.current_token() {
            Token::Equal => Some(ComparisonOp::Eq),
            Token::NotEqual => Some(ComparisonOp::Ne),
            Token::Less => Some(ComparisonOp::Lt),
            Token::Greater => Some(ComparisonOp::Gt),
            Token::LessEqual => Some(ComparisonOp::Le),
            Token::GreaterEqual => Some(ComparisonOp::Ge),
            _ => None,
        };

        if let Some(op) = op {
            self.advance();
            let right = self.parse_addition()?;
            Ok(Expression::comparison(op, left, right))
        } else {
            Ok(left)
        }
    }

    /// Parse addition/subtraction expression
    fn parse_addition(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplication()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => ArithmeticOp::Add,
                Token::Minus => ArithmeticOp::Subtract,
                _ => break,
            };
            self.advance();

            let right = self.parse_multiplication()?;
            left = Expression::arithmetic(op, left, right);
        }

        Ok(left)
    }

    /// Parse multiplication/division expression
    fn parse_multiplication(&mut self) -> Result<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => ArithmeticOp::Multiply,
                Token::Slash => ArithmeticOp::Divide,
                _ => break,
            };
            self.advance();

            let right = self.parse_unary()?;
            left = Expression::arithmetic(op, left, right);
        }

        Ok(left)
    }

    /// Parse unary expression
    fn parse_unary(&mut self) -> Result<Expression> {
        if self.match_token(&Token::Minus) {
            self.advance();
            let operand = self.parse_unary()?;
            Ok(Expression::unary(UnaryOp::Minus, operand))
        } else {
            self.parse_postfix()
        }
    }

    /// Parse indexing, `vector[index]`
    fn parse_postfix(&mut self) -> Result<Expression> {
        let mut expr = self.parse_primary()?;

        while self.match_token(&Token::LeftBracket) {
            self.advance();
            let index = self.parse_expression()?;
            self.expect_token(Token::RightBracket)?;
            expr = Expression::index(expr, index);
        }

        Ok(expr)
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> Result<Expression> {
        match self.current_token() {
            Token::Number(n) => {
                self.advance();
                if n.contains('.') {
                    match n.parse::<f64>() {
                        Ok(d) => Ok(Expression::constant(d)),
                        Err(_) => self.error(format!("Invalid number: {}", n)),
                    }
                } else {
                    match n.parse::<i64>() {
                        Ok(i) => Ok(Expression::constant(i)),
                        Err(_) => self.error(format!("Invalid number: {}", n)),
                    }
                }
            }
            Token::String(s) => {
                self.advance();
                Ok(Expression::constant(Value::String(s)))
            }
            Token::True => {
                self.advance();
                Ok(Expression::constant(true))
            }
            Token::False => {
                self.advance();
                Ok(Expression::constant(false))
            }
            Token::Identifier(name) => {
                self.advance();

                // Check for a property path (Entity.field.subfield)
                if self.match_token(&Token::Dot) {
                    let mut path = vec![];
                    while self.match_token(&Token::Dot) {
                        self.advance();
                        path.push(self.expect_identifier()?);
                    }
                    Ok(Expression::property_path(name, path))
                }
                // Check for function call
                else if self.match_token(&Token::LeftParen) {
                    self.advance();

                    let args = if self.match_token(&Token::RightParen) {
                        vec![]
                    } else {
                        self.parse_expression_list()?
                    };
                    self.expect_token(Token::RightParen)?;

                    Ok(Expression::call(name, args))
                } else {
                    Ok(Expression::var(name))
                }
            }
            Token::LeftParen => {
                self.advance();

                // `()` is the empty vector, `(a, b)` a vector literal
                if self.match_token(&Token::RightParen) {
                    self.advance();
                    return Ok(Expression::Vector(vec![]));
                }

                let expr = self.parse_expression()?;
                if self.match_token(&Token::Comma) {
                    self.advance();
                    let mut elements = vec![expr];
                    elements.extend(self.parse_expression_list()?);
                    self.expect_token(Token::RightParen)?;
                    Ok(Expression::Vector(elements))
                } else {
                    self.expect_token(Token::RightParen)?;
                    Ok(expr)
                }
            }
            Token::If => self.parse_if_expression(),
            Token::Project => self.parse_projection(),
            token => self.error(format!("Unexpected token: {:?}", token)),
        }
    }

    /// Parse `if condition then statements [else statements] endif`
    fn parse_if_expression(&mut self) -> Result<Expression> {
        self.expect_token(Token::If)?;
        let condition = self.parse_expression()?;
        self.expect_token(Token::Then)?;

        let if_branch = self.parse_statements(&[Token::Else, Token::EndIf])?;

        let else_branch = if self.match_token(&Token::Else) {
            self.advance();
            Some(Expression::Sequence(self.parse_statements(&[Token::EndIf])?))
        } else {
            None
        };

        self.expect_token(Token::EndIf)?;

        Ok(Expression::if_else(
            condition,
            Expression::Sequence(if_branch),
            else_branch,
        ))
    }

    /// Parse `project { [alias :] expr, ... } [where expr]`
    fn parse_projection(&mut self) -> Result<Expression> {
        self.expect_token(Token::Project)?;
        self.expect_token(Token::LeftBrace)?;

        let mut elements = vec![];
        loop {
            elements.push(self.parse_projection_element()?);
            if !self.match_token(&Token::Comma) {
                break;
            }
            self.advance();
        }
        self.expect_token(Token::RightBrace)?;

        let filter = if self.match_token(&Token::Where) {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };

        Ok(Expression::Projection { elements, filter })
    }

    fn parse_projection_element(&mut self) -> Result<Expression> {
        if let Token::Identifier(alias) = self.current_token() {
            if self.peek_token() == Token::Colon {
                self.advance();
                self.advance();
                let expression = self.parse_expression()?;
                return Ok(Expression::alias(alias, expression));
            }
        }
        self.parse_expression()
    }

    /// Parse list of expressions
    fn parse_expression_list(&mut self) -> Result<Vec<Expression>> {
        let mut expressions = vec![];

        loop {
            expressions.push(self.parse_expression()?);
            if !self.match_token(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(expressions)
    }

    /// Parse list of identifiers
    fn parse_identifier_list(&mut self) -> Result<Vec<String>> {
        let mut identifiers = vec![];

        loop {
            identifiers.push(self.expect_identifier()?);
            if !self.match_token(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(identifiers)
    }

    // Helper methods

    /// Get current token
    fn current_token(&self) -> Token {
        self.tokens
            .get(self.position)
            .cloned()
            .unwrap_or(Token::Eof)
    }

    /// Get the token after the current one
    fn peek_token(&self) -> Token {
        self.tokens
            .get(self.position + 1)
            .cloned()
            .unwrap_or(Token::Eof)
    }

    /// Advance to next token
    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    /// Check if current token matches
    fn match_token(&self, token: &Token) -> bool {
        self.current_token() == *token
    }

    fn skip_separators(&mut self) {
        while self.match_token(&Token::Semicolon) {
            self.advance();
        }
    }

    /// Expect a specific token
    fn expect_token(&mut self, token: Token) -> Result<()> {
        if self.current_token() == token {
            self.advance();
            Ok(())
        } else {
            self.error(format!(
                "Expected {:?}, found {:?}",
                token,
                self.current_token()
            ))
        }
    }

    /// Expect an identifier
    fn expect_identifier(&mut self) -> Result<String> {
        match self.current_token() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            token => self.error(format!("Expected identifier, found {:?}", token)),
        }
    }

    fn error<T>(&self, message: String) -> Result<T> {
        Err(EngineError::Parse(message))
    }
}
