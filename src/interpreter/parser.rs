use super::error::ParserError;
use crate::ast::{
    BlockStatement, Expression, Identifier, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Expression binding strength, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Eq | TokenKind::Neq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Dash => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::Lparen => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

fn infix_operator(kind: TokenKind) -> Option<InfixOperator> {
    match kind {
        TokenKind::Plus => Some(InfixOperator::Plus),
        TokenKind::Dash => Some(InfixOperator::Dash),
        TokenKind::Asterisk => Some(InfixOperator::Asterisk),
        TokenKind::Slash => Some(InfixOperator::Slash),
        TokenKind::Lt => Some(InfixOperator::Lt),
        TokenKind::Gt => Some(InfixOperator::Gt),
        TokenKind::Eq => Some(InfixOperator::Eq),
        TokenKind::Neq => Some(InfixOperator::Neq),
        _ => None,
    }
}

/// Pratt parser over the lexer's token stream. Keeps two tokens of
/// lookahead and accumulates errors instead of aborting; failed sub-parses
/// yield `None` and the enclosing statement is skipped, so one pass over a
/// broken source still produces a useful report.
pub struct Parser {
    lexer: Lexer,
    current: Token,
    peek: Token,
    errors: Vec<ParserError>,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let mut parser = Self {
            lexer,
            current: Token::new(TokenKind::Eof, ""),
            peek: Token::new(TokenKind::Eof, ""),
            errors: Vec::new(),
        };

        // Prime both lookahead slots.
        parser.next_token();
        parser.next_token();

        parser
    }

    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while self.current.kind != TokenKind::Eof {
            if let Some(statement) = self.parse_statement() {
                program.statements.push(statement);
            }
            self.next_token();
        }

        program
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        if !self.expect_peek(TokenKind::Identifier) {
            return None;
        }
        let name = Identifier::new(&self.current.literal);

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume_optional_semicolon();

        Some(Statement::Let { name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        self.consume_optional_semicolon();

        Some(Statement::Return { value })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.consume_optional_semicolon();

        Some(Statement::Expression { expression })
    }

    fn parse_expression(&mut self, min_precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while self.peek.kind != TokenKind::Semicolon
            && self.peek.kind != TokenKind::Eof
            && precedence_of(self.peek.kind) > min_precedence
        {
            self.next_token();
            left = self.parse_infix(left)?;
        }

        Some(left)
    }

    /// Dispatch on the current token in prefix position.
    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.current.kind {
            TokenKind::Identifier => Some(Expression::Identifier(Identifier::new(
                &self.current.literal,
            ))),
            TokenKind::Integer => self.parse_integer_literal(),
            TokenKind::String => Some(Expression::StringLiteral(self.current.literal.clone())),
            TokenKind::True | TokenKind::False => Some(Expression::BooleanLiteral(
                self.current.kind == TokenKind::True,
            )),
            TokenKind::Bang => self.parse_prefix_expression(PrefixOperator::Bang),
            TokenKind::Dash => self.parse_prefix_expression(PrefixOperator::Dash),
            TokenKind::Lparen => self.parse_grouped_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => self.parse_function_literal(),
            _ => {
                self.errors.push(ParserError::InvalidPrefixToken {
                    found: self.current.clone(),
                });
                None
            }
        }
    }

    /// Dispatch on the current token in infix position. Only called for
    /// tokens that carry a precedence above `Lowest`.
    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        if self.current.kind == TokenKind::Lparen {
            return self.parse_call_expression(left);
        }

        let operator = infix_operator(self.current.kind)?;
        let precedence = precedence_of(self.current.kind);
        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expression::Infix {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.current.literal.parse::<i64>() {
            Ok(value) => Some(Expression::IntegerLiteral(value)),
            Err(_) => {
                self.errors.push(ParserError::InvalidIntegerLiteral {
                    literal: self.current.literal.clone(),
                });
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self, operator: PrefixOperator) -> Option<Expression> {
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;

        Some(Expression::Prefix {
            operator,
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();

        let expression = self.parse_expression(Precedence::Lowest)?;
        if !self.expect_peek(TokenKind::Rparen) {
            return None;
        }

        Some(expression)
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenKind::Lparen) {
            return None;
        }
        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::Rparen) {
            return None;
        }
        if !self.expect_peek(TokenKind::Lbrace) {
            return None;
        }

        let then = self.parse_block_statement();

        let otherwise = if self.peek.kind == TokenKind::Else {
            self.next_token();
            if !self.expect_peek(TokenKind::Lbrace) {
                return None;
            }
            Some(self.parse_block_statement())
        } else {
            None
        };

        Some(Expression::If {
            condition: Box::new(condition),
            then,
            otherwise,
        })
    }

    /// Parses statements until the closing brace; leaves `current` on it.
    fn parse_block_statement(&mut self) -> BlockStatement {
        let mut block = BlockStatement::default();
        self.next_token();

        while self.current.kind != TokenKind::Rbrace && self.current.kind != TokenKind::Eof {
            if let Some(statement) = self.parse_statement() {
                block.statements.push(statement);
            }
            self.next_token();
        }

        block
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        if !self.expect_peek(TokenKind::Lparen) {
            return None;
        }

        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(TokenKind::Lbrace) {
            return None;
        }
        let body = self.parse_block_statement();

        Some(Expression::FunctionLiteral { parameters, body })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();

        if self.peek.kind == TokenKind::Rparen {
            self.next_token();
            return Some(parameters);
        }

        loop {
            if !self.expect_peek(TokenKind::Identifier) {
                return None;
            }
            parameters.push(Identifier::new(&self.current.literal));

            match self.peek.kind {
                TokenKind::Comma => self.next_token(),
                TokenKind::Rparen => {
                    self.next_token();
                    return Some(parameters);
                }
                _ => {
                    self.peek_error(TokenKind::Rparen);
                    return None;
                }
            }
        }
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_call_arguments()?;

        Some(Expression::Call {
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_call_arguments(&mut self) -> Option<Vec<Expression>> {
        let mut arguments = Vec::new();

        if self.peek.kind == TokenKind::Rparen {
            self.next_token();
            return Some(arguments);
        }

        self.next_token();
        arguments.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek.kind == TokenKind::Comma {
            self.next_token();
            self.next_token();
            arguments.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(TokenKind::Rparen) {
            return None;
        }

        Some(arguments)
    }

    fn next_token(&mut self) {
        self.current = std::mem::replace(&mut self.peek, self.lexer.next_token());
    }

    fn consume_optional_semicolon(&mut self) {
        if self.peek.kind == TokenKind::Semicolon {
            self.next_token();
        }
    }

    /// Advances past the peek token when it matches; otherwise records an
    /// unexpected-token error and leaves the position untouched.
    fn expect_peek(&mut self, expected: TokenKind) -> bool {
        if self.peek.kind == expected {
            self.next_token();
            true
        } else {
            self.peek_error(expected);
            false
        }
    }

    fn peek_error(&mut self, expected: TokenKind) {
        self.errors.push(ParserError::UnexpectedToken {
            expected,
            found: self.peek.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();
        assert!(
            parser.errors().is_empty(),
            "parser errors for {:?}: {:?}",
            source,
            parser.errors()
        );
        program
    }

    fn parse_errors(source: &str) -> Vec<String> {
        let mut parser = Parser::new(Lexer::new(source));
        parser.parse_program();
        parser.errors().iter().map(ToString::to_string).collect()
    }

    fn single_expression(program: &Program) -> &Expression {
        assert_eq!(program.statements.len(), 1, "program: {}", program);
        match &program.statements[0] {
            Statement::Expression { expression } => expression,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_let_statements() {
        let program = parse("let x = 5; let y = true; let foobar = y;");
        assert_eq!(program.statements.len(), 3);

        let expected = [("x", "5"), ("y", "true"), ("foobar", "y")];
        for (statement, (name, value)) in program.statements.iter().zip(expected) {
            assert_eq!(statement.token_literal(), "let");
            match statement {
                Statement::Let {
                    name: identifier,
                    value: expression,
                } => {
                    assert_eq!(identifier.name.as_ref(), name);
                    assert_eq!(expression.to_string(), value);
                }
                other => panic!("expected let statement, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_return_statements() {
        let program = parse("return 5; return x + y;");
        assert_eq!(program.statements.len(), 2);
        assert_eq!(program.to_string(), "return 5;return (x + y);");
    }

    #[test]
    fn test_trailing_semicolon_is_optional() {
        assert_eq!(parse("let x = 5").to_string(), "let x = 5;");
        assert_eq!(parse("return 5").to_string(), "return 5;");
        assert_eq!(parse("x + y").to_string(), "(x + y);");
    }

    #[test]
    fn test_identifier_expression() {
        let program = parse("foobar;");
        match single_expression(&program) {
            Expression::Identifier(identifier) => assert_eq!(identifier.name.as_ref(), "foobar"),
            other => panic!("expected identifier, got {:?}", other),
        }
    }

    #[test]
    fn test_integer_literal_expression() {
        let program = parse("5;");
        assert_eq!(single_expression(&program), &Expression::IntegerLiteral(5));
    }

    #[test]
    fn test_string_literal_expression() {
        let program = parse(r#""hello world";"#);
        assert_eq!(
            single_expression(&program),
            &Expression::StringLiteral("hello world".to_string())
        );
    }

    #[test]
    fn test_boolean_literal_expressions() {
        assert_eq!(
            single_expression(&parse("true;")),
            &Expression::BooleanLiteral(true)
        );
        assert_eq!(
            single_expression(&parse("false;")),
            &Expression::BooleanLiteral(false)
        );
    }

    #[test]
    fn test_prefix_expressions() {
        let cases = [
            ("!5;", PrefixOperator::Bang, "5"),
            ("-15;", PrefixOperator::Dash, "15"),
            ("!true;", PrefixOperator::Bang, "true"),
        ];
        for (source, expected_operator, expected_right) in cases {
            let program = parse(source);
            match single_expression(&program) {
                Expression::Prefix { operator, right } => {
                    assert_eq!(*operator, expected_operator);
                    assert_eq!(right.to_string(), expected_right);
                }
                other => panic!("expected prefix expression, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_infix_expressions() {
        let cases = [
            ("5 + 5;", InfixOperator::Plus),
            ("5 - 5;", InfixOperator::Dash),
            ("5 * 5;", InfixOperator::Asterisk),
            ("5 / 5;", InfixOperator::Slash),
            ("5 < 5;", InfixOperator::Lt),
            ("5 > 5;", InfixOperator::Gt),
            ("5 == 5;", InfixOperator::Eq),
            ("5 != 5;", InfixOperator::Neq),
        ];
        for (source, expected_operator) in cases {
            let program = parse(source);
            match single_expression(&program) {
                Expression::Infix { operator, left, right } => {
                    assert_eq!(*operator, expected_operator);
                    assert_eq!(**left, Expression::IntegerLiteral(5));
                    assert_eq!(**right, Expression::IntegerLiteral(5));
                }
                other => panic!("expected infix expression, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_operator_precedence() {
        let cases = [
            ("-a * b", "((-a) * b);"),
            ("!-a", "(!(-a));"),
            ("a + b + c", "((a + b) + c);"),
            ("a + b - c", "((a + b) - c);"),
            ("a * b * c", "((a * b) * c);"),
            ("a * b / c", "((a * b) / c);"),
            ("a + b / c", "(a + (b / c));"),
            ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f);"),
            ("3 + 4; -5 * 5", "(3 + 4);((-5) * 5);"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4));"),
            ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4));"),
            (
                "3 + 4 * 5 == 3 * 1 + 4 * 5",
                "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)));",
            ),
            ("3 > 5 == false", "((3 > 5) == false);"),
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4);"),
            ("(5 + 5) * 2", "((5 + 5) * 2);"),
            ("2 / (5 + 5)", "(2 / (5 + 5));"),
            ("-(5 + 5)", "(-(5 + 5));"),
            ("!(true == true)", "(!(true == true));"),
            ("a + add(b * c) + d", "((a + add((b * c))) + d);"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)));",
            ),
            (
                "add(a + b + c * d / f + g)",
                "add((((a + b) + ((c * d) / f)) + g));",
            ),
        ];
        for (source, expected) in cases {
            assert_eq!(parse(source).to_string(), expected, "source: {}", source);
        }
    }

    #[test]
    fn test_pretty_printed_form_is_a_fixed_point() {
        // Holds for brace-free forms; blocks print without braces and do not
        // round-trip through the parser.
        let sources = [
            "a + b * c + d / e - f",
            "let x = 1 + 2 * 3; x",
            "!(true == true)",
            "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
            "adder(2)(3)",
        ];
        for source in sources {
            let printed = parse(source).to_string();
            assert_eq!(parse(&printed).to_string(), printed, "source: {}", source);
        }
    }

    #[test]
    fn test_if_expression() {
        let program = parse("if (x < y) { x }");
        match single_expression(&program) {
            Expression::If {
                condition,
                then,
                otherwise,
            } => {
                assert_eq!(condition.to_string(), "(x < y)");
                assert_eq!(then.to_string(), "x;");
                assert!(otherwise.is_none());
            }
            other => panic!("expected if expression, got {:?}", other),
        }
    }

    #[test]
    fn test_if_else_expression() {
        let program = parse("if (x < y) { x } else { y }");
        match single_expression(&program) {
            Expression::If { otherwise, .. } => {
                assert_eq!(otherwise.as_ref().map(ToString::to_string), Some("y;".into()));
            }
            other => panic!("expected if expression, got {:?}", other),
        }
        assert_eq!(program.to_string(), "if (x < y) x; y;");
    }

    #[test]
    fn test_function_literal() {
        let program = parse("fn(x, y) { x + y; }");
        match single_expression(&program) {
            Expression::FunctionLiteral { parameters, body } => {
                let names: Vec<&str> = parameters.iter().map(|p| p.name.as_ref()).collect();
                assert_eq!(names, vec!["x", "y"]);
                assert_eq!(body.to_string(), "(x + y);");
            }
            other => panic!("expected function literal, got {:?}", other),
        }
    }

    #[test]
    fn test_function_parameter_lists() {
        let cases = [
            ("fn() {};", vec![]),
            ("fn(x) {};", vec!["x"]),
            ("fn(x, y, z) {};", vec!["x", "y", "z"]),
        ];
        for (source, expected) in cases {
            let program = parse(source);
            match single_expression(&program) {
                Expression::FunctionLiteral { parameters, .. } => {
                    let names: Vec<&str> = parameters.iter().map(|p| p.name.as_ref()).collect();
                    assert_eq!(names, expected);
                }
                other => panic!("expected function literal, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_call_expression() {
        let program = parse("add(1, 2 * 3, 4 + 5);");
        match single_expression(&program) {
            Expression::Call {
                function,
                arguments,
            } => {
                assert_eq!(function.to_string(), "add");
                let args: Vec<String> = arguments.iter().map(ToString::to_string).collect();
                assert_eq!(args, vec!["1", "(2 * 3)", "(4 + 5)"]);
            }
            other => panic!("expected call expression, got {:?}", other),
        }
    }

    #[test]
    fn test_chained_calls_are_left_associative() {
        let program = parse("f()();");
        match single_expression(&program) {
            Expression::Call { function, .. } => match function.as_ref() {
                Expression::Call { function, .. } => assert_eq!(function.to_string(), "f"),
                other => panic!("expected inner call, got {:?}", other),
            },
            other => panic!("expected call expression, got {:?}", other),
        }
    }

    #[test]
    fn test_call_on_function_literal() {
        assert_eq!(parse("fn(x) { x } (11);").to_string(), "fn(x) x;(11);");
    }

    #[test]
    fn test_expect_peek_error_message() {
        let errors = parse_errors("let x 5;");
        assert_eq!(
            errors,
            vec![
                "unexpected token of type \"INTEGER\" with literal \"5\", expected token of type \"=\""
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_missing_let_identifier() {
        let errors = parse_errors("let = 5;");
        assert_eq!(
            errors[0],
            "unexpected token of type \"=\" with literal \"=\", expected token of type \"IDENTIFIER\""
        );
    }

    #[test]
    fn test_no_prefix_parse_error() {
        let errors = parse_errors("let x = ;");
        assert_eq!(
            errors,
            vec!["token \";\" cannot appear in prefix position".to_string()]
        );
    }

    #[test]
    fn test_bracket_has_no_prefix_parse() {
        let errors = parse_errors("[1, 2]");
        assert!(
            errors
                .iter()
                .any(|e| e == "token \"[\" cannot appear in prefix position"),
            "errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_failed_statement_is_skipped_and_parsing_continues() {
        let mut parser = Parser::new(Lexer::new("let x 5; let y = 10;"));
        let program = parser.parse_program();
        assert_eq!(parser.errors().len(), 1);
        // The broken let is dropped; its leftover `5` re-parses as an
        // expression statement before the next let is picked up.
        assert_eq!(program.to_string(), "5;let y = 10;");
    }

    #[test]
    fn test_parameter_list_rejects_trailing_comma() {
        let errors = parse_errors("fn(x,) { x }");
        assert_eq!(
            errors[0],
            "unexpected token of type \")\" with literal \")\", expected token of type \"IDENTIFIER\""
        );
    }

    #[test]
    fn test_parameter_list_rejects_stray_token() {
        let errors = parse_errors("fn(x y) { x }");
        assert_eq!(
            errors[0],
            "unexpected token of type \"IDENTIFIER\" with literal \"y\", expected token of type \")\""
        );
    }

    #[test]
    fn test_integer_literal_out_of_range() {
        let errors = parse_errors("92233720368547758089;");
        assert_eq!(
            errors,
            vec!["could not parse \"92233720368547758089\" as integer".to_string()]
        );
    }

    #[test]
    fn test_unterminated_if_reports_missing_brace() {
        let errors = parse_errors("if (x) y");
        assert_eq!(
            errors[0],
            "unexpected token of type \"IDENTIFIER\" with literal \"y\", expected token of type \"{\""
        );
    }
}
