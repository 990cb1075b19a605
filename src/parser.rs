use crate::{
    ast::{BinaryOperator, Literal, Node, UnaryOperator},
    error::{ParserError, SyntaxError},
    lexer::{Lexer, Token},
    limits::Limits,
};
use tracing::trace;

const END_OF_INPUT: &str = "end of input";

/// Remove every line break so that an expression can be written over several lines.
#[inline]
pub fn normalize(expression: &str) -> String {
    expression.replace("\r\n", "").replace('\n', "")
}

/// Normalize then parse a raw expression.
pub fn parse(expression: &str, limits: &Limits) -> Result<Node, SyntaxError> {
    let normalized = normalize(expression);
    trace!(expression = %normalized, "parsing");
    Parser::new(&normalized, limits.max_depth())
        .and_then(|mut parser| parser.parse())
        .map_err(|cause| SyntaxError {
            expression: normalized.clone(),
            cause,
        })
}

struct Parser<'input> {
    tokens: Vec<(usize, Token<'input>, usize)>,
    cursor: usize,
    length: usize,
    depth: usize,
    max_depth: usize,
}

impl<'input> Parser<'input> {
    fn new(input: &'input str, max_depth: usize) -> Result<Self, ParserError> {
        let tokens = Lexer::new(input).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            tokens,
            cursor: 0,
            length: input.len(),
            depth: 0,
            max_depth,
        })
    }

    fn parse(&mut self) -> Result<Node, ParserError> {
        let root = self.expression(BinaryOperator::Or.precedence())?;
        match self.next_token() {
            None => Ok(root),
            Some((position, token, _)) => Err(ParserError::Unexpected {
                expected: "an operator or end of input",
                found: token.to_string(),
                position,
            }),
        }
    }

    fn expression(&mut self, min_precedence: u8) -> Result<Node, ParserError> {
        let mut left = self.unary()?;
        while let Some(operator) = self.peek().and_then(binary_operator) {
            let precedence = operator.precedence();
            if precedence < min_precedence {
                break;
            }
            self.cursor += 1;
            let right = self.expression(precedence + 1)?;
            left = Node::Binary(operator, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Node, ParserError> {
        let operator = match self.peek() {
            Some(Token::Minus) => UnaryOperator::Negate,
            Some(Token::Plus) => UnaryOperator::Plus,
            Some(Token::Not) => UnaryOperator::Not,
            Some(Token::Caret) => UnaryOperator::BitNot,
            _ => return self.primary(),
        };
        let position = self.position();
        self.cursor += 1;
        let operand = self.descend(position, Self::unary)?;
        Ok(Node::Unary(operator, Box::new(operand)))
    }

    fn primary(&mut self) -> Result<Node, ParserError> {
        let Some((start, token, _)) = self.next_token() else {
            return Err(self.unexpected_end("an operand"));
        };
        match token {
            Token::StringLiteral(text) => Ok(Node::Literal(Literal::String(text.to_string()))),
            Token::RawStringLiteral(text) => {
                Ok(Node::Literal(Literal::RawString(text.to_string())))
            }
            Token::IntegerLiteral(text) => Ok(Node::Literal(Literal::Integer(text.to_string()))),
            Token::FloatLiteral(text) => Ok(Node::Literal(Literal::Float(text.to_string()))),
            Token::ImaginaryLiteral(text) => {
                Ok(Node::Literal(Literal::Imaginary(text.to_string())))
            }
            Token::CharLiteral(text) => Ok(Node::Literal(Literal::Char(text.to_string()))),
            Token::BooleanLiteral(value) => Ok(Node::Literal(Literal::Boolean(value))),
            Token::Identifier(first) => {
                let name = self.qualified_name(first)?;
                if matches!(self.peek(), Some(Token::LeftParenthesis)) {
                    self.cursor += 1;
                    let arguments = self.descend(start, Self::arguments)?;
                    Ok(Node::Call { name, arguments })
                } else {
                    Ok(Node::Identifier(name))
                }
            }
            Token::LeftParenthesis => {
                let inner = self.descend(start, |parser| {
                    parser.expression(BinaryOperator::Or.precedence())
                })?;
                self.expect_right_parenthesis()?;
                Ok(inner)
            }
            other => Err(ParserError::Unexpected {
                expected: "an operand",
                found: other.to_string(),
                position: start,
            }),
        }
    }

    fn qualified_name(&mut self, first: &str) -> Result<String, ParserError> {
        let mut name = first.to_string();
        while matches!(self.peek(), Some(Token::Dot)) {
            self.cursor += 1;
            match self.next_token() {
                Some((_, Token::Identifier(segment), _)) => {
                    name.push('.');
                    name.push_str(segment);
                }
                Some((position, token, _)) => {
                    return Err(ParserError::Unexpected {
                        expected: "an identifier",
                        found: token.to_string(),
                        position,
                    })
                }
                None => return Err(self.unexpected_end("an identifier")),
            }
        }
        Ok(name)
    }

    /// Arguments of a call, the opening parenthesis being already consumed.
    fn arguments(&mut self) -> Result<Vec<Node>, ParserError> {
        let mut arguments = Vec::new();
        if matches!(self.peek(), Some(Token::RightParenthesis)) {
            self.cursor += 1;
            return Ok(arguments);
        }

        loop {
            arguments.push(self.expression(BinaryOperator::Or.precedence())?);
            match self.next_token() {
                Some((_, Token::Comma, _)) => {
                    // A trailing comma is allowed before the closing parenthesis.
                    if matches!(self.peek(), Some(Token::RightParenthesis)) {
                        self.cursor += 1;
                        return Ok(arguments);
                    }
                }
                Some((_, Token::RightParenthesis, _)) => return Ok(arguments),
                Some((position, token, _)) => {
                    return Err(ParserError::Unexpected {
                        expected: "`,` or `)`",
                        found: token.to_string(),
                        position,
                    })
                }
                None => return Err(self.unexpected_end("`,` or `)`")),
            }
        }
    }

    fn expect_right_parenthesis(&mut self) -> Result<(), ParserError> {
        match self.next_token() {
            Some((_, Token::RightParenthesis, _)) => Ok(()),
            Some((position, token, _)) => Err(ParserError::Unexpected {
                expected: "`)`",
                found: token.to_string(),
                position,
            }),
            None => Err(self.unexpected_end("`)`")),
        }
    }

    fn descend<T>(
        &mut self,
        position: usize,
        parse: impl FnOnce(&mut Self) -> Result<T, ParserError>,
    ) -> Result<T, ParserError> {
        if self.depth >= self.max_depth {
            return Err(ParserError::TooDeep {
                limit: self.max_depth,
                position,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    #[inline]
    fn peek(&self) -> Option<&Token<'input>> {
        self.tokens.get(self.cursor).map(|(_, token, _)| token)
    }

    #[inline]
    fn position(&self) -> usize {
        self.tokens
            .get(self.cursor)
            .map_or(self.length, |(start, _, _)| *start)
    }

    fn next_token(&mut self) -> Option<(usize, Token<'input>, usize)> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn unexpected_end(&self, expected: &'static str) -> ParserError {
        ParserError::Unexpected {
            expected,
            found: END_OF_INPUT.to_string(),
            position: self.length,
        }
    }
}

fn binary_operator(token: &Token) -> Option<BinaryOperator> {
    match token {
        Token::Or => Some(BinaryOperator::Or),
        Token::And => Some(BinaryOperator::And),
        Token::Equal => Some(BinaryOperator::Equal),
        Token::NotEqual => Some(BinaryOperator::NotEqual),
        Token::LessThan => Some(BinaryOperator::LessThan),
        Token::LessThanEqual => Some(BinaryOperator::LessThanEqual),
        Token::GreaterThan => Some(BinaryOperator::GreaterThan),
        Token::GreaterThanEqual => Some(BinaryOperator::GreaterThanEqual),
        Token::Plus => Some(BinaryOperator::Add),
        Token::Minus => Some(BinaryOperator::Subtract),
        Token::Pipe => Some(BinaryOperator::BitOr),
        Token::Caret => Some(BinaryOperator::BitXor),
        Token::Star => Some(BinaryOperator::Multiply),
        Token::Slash => Some(BinaryOperator::Divide),
        Token::Percent => Some(BinaryOperator::Remainder),
        Token::Ampersand => Some(BinaryOperator::BitAnd),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        lexer::LexicalError,
        test_utils::ast::{
            and, binary, boolean, call, float, identifier, integer, neg, or, string, unary,
        },
    };

    fn parse_default(expression: &str) -> Result<Node, SyntaxError> {
        parse(expression, &Limits::default())
    }

    fn cause_of(result: Result<Node, SyntaxError>) -> ParserError {
        result.unwrap_err().cause
    }

    #[test]
    fn return_an_error_on_empty_input() {
        let parsed = parse_default("");

        assert_eq!(
            Err(SyntaxError {
                expression: String::new(),
                cause: ParserError::Unexpected {
                    expected: "an operand",
                    found: "end of input".to_string(),
                    position: 0
                }
            }),
            parsed
        );
    }

    #[test]
    fn return_an_error_on_blank_input() {
        assert!(parse_default(" \n\t ").is_err());
    }

    #[test]
    fn return_an_error_on_a_trailing_operator() {
        let parsed = parse_default(r#"mustTrueWithArg1("A") &&"#);

        assert_eq!(
            ParserError::Unexpected {
                expected: "an operand",
                found: "end of input".to_string(),
                position: 24
            },
            cause_of(parsed)
        );
    }

    #[test]
    fn return_an_error_on_invalid_input() {
        assert!(parse_default(")(invalid-").is_err());
    }

    #[test]
    fn return_an_error_on_unbalanced_parenthesis() {
        let parsed = parse_default(r#"("A" && "B""#);

        assert_eq!(
            ParserError::Unexpected {
                expected: "`)`",
                found: "end of input".to_string(),
                position: 11
            },
            cause_of(parsed)
        );
    }

    #[test]
    fn return_an_error_on_trailing_tokens() {
        let parsed = parse_default(r#""A" "B""#);

        assert_eq!(
            ParserError::Unexpected {
                expected: "an operator or end of input",
                found: r#"`"B"`"#.to_string(),
                position: 4
            },
            cause_of(parsed)
        );
    }

    #[test]
    fn return_a_lexical_error_with_its_position() {
        let parsed = parse_default(r#""A" && #"#);

        assert_eq!(
            ParserError::Lexical {
                error: LexicalError::InvalidToken,
                position: 7
            },
            cause_of(parsed)
        );
    }

    #[test]
    fn can_parse_literals() {
        assert_eq!(Ok(string!("A")), parse_default(r#""A""#));
        assert_eq!(Ok(integer!("42")), parse_default("42"));
        assert_eq!(Ok(float!("1.1")), parse_default("1.1"));
        assert_eq!(Ok(boolean!(true)), parse_default("true"));
        assert_eq!(
            Ok(Node::Literal(Literal::Char("'a'".to_string()))),
            parse_default("'a'")
        );
        assert_eq!(
            Ok(Node::Literal(Literal::RawString("`a`".to_string()))),
            parse_default("`a`")
        );
    }

    #[test]
    fn can_parse_and_expression() {
        let parsed = parse_default(r#""A" && "B""#);

        assert_eq!(Ok(and!(string!("A"), string!("B"))), parsed);
    }

    #[test]
    fn can_parse_or_expression() {
        let parsed = parse_default(r#""A" || "B""#);

        assert_eq!(Ok(or!(string!("A"), string!("B"))), parsed);
    }

    #[test]
    fn bind_and_tighter_than_or() {
        let parsed = parse_default(r#""A" || "B" && "C""#);

        assert_eq!(
            Ok(or!(string!("A"), and!(string!("B"), string!("C")))),
            parsed
        );
    }

    #[test]
    fn associate_to_the_left() {
        let parsed = parse_default(r#""A" && "B" && "C""#);

        assert_eq!(
            Ok(and!(and!(string!("A"), string!("B")), string!("C"))),
            parsed
        );
    }

    #[test]
    fn can_override_precedence_with_parenthesis() {
        let parsed = parse_default(r#"("A" || "B") && "C""#);

        assert_eq!(
            Ok(and!(or!(string!("A"), string!("B")), string!("C"))),
            parsed
        );
    }

    #[test]
    fn can_parse_negation() {
        assert_eq!(Ok(neg!(integer!("5"))), parse_default("-5"));
        assert_eq!(Ok(neg!(neg!(float!("1.5")))), parse_default("--1.5"));
    }

    #[test]
    fn bind_negation_tighter_than_binary_operators() {
        let parsed = parse_default("-1 && 2");

        assert_eq!(Ok(and!(neg!(integer!("1")), integer!("2"))), parsed);
    }

    #[test]
    fn can_parse_unsupported_operators_into_the_tree() {
        assert_eq!(
            Ok(binary!(BinaryOperator::Add, string!("A"), string!("B"))),
            parse_default(r#""A" + "B""#)
        );
        assert_eq!(
            Ok(unary!(UnaryOperator::Not, boolean!(true))),
            parse_default("!true")
        );
        assert_eq!(
            Ok(and!(
                binary!(BinaryOperator::LessThan, integer!("1"), integer!("2")),
                string!("A")
            )),
            parse_default(r#"1 < 2 && "A""#)
        );
    }

    #[test]
    fn bind_multiplicative_tighter_than_additive() {
        let parsed = parse_default("1 + 2 * 3");

        assert_eq!(
            Ok(binary!(
                BinaryOperator::Add,
                integer!("1"),
                binary!(BinaryOperator::Multiply, integer!("2"), integer!("3"))
            )),
            parsed
        );
    }

    #[test]
    fn can_parse_call_without_arguments() {
        let parsed = parse_default("mustTrueWithoutArg()");

        assert_eq!(Ok(call!("mustTrueWithoutArg")), parsed);
    }

    #[test]
    fn can_parse_call_with_arguments() {
        let parsed = parse_default(r#"f("A", 1, -2.5, g())"#);

        assert_eq!(
            Ok(call!(
                "f",
                string!("A"),
                integer!("1"),
                neg!(float!("2.5")),
                call!("g")
            )),
            parsed
        );
    }

    #[test]
    fn can_parse_call_with_a_trailing_comma() {
        let parsed = parse_default(r#"f("A",)"#);

        assert_eq!(Ok(call!("f", string!("A"))), parsed);
    }

    #[test]
    fn can_parse_call_with_a_qualified_name() {
        let parsed = parse_default(r#"strings.Contains("A")"#);

        assert_eq!(Ok(call!("strings.Contains", string!("A"))), parsed);
    }

    #[test]
    fn can_parse_bare_identifier() {
        assert_eq!(Ok(identifier!("private")), parse_default("private"));
    }

    #[test]
    fn return_an_error_on_a_missing_comma_between_arguments() {
        let parsed = parse_default(r#"f("A" "B")"#);

        assert_eq!(
            ParserError::Unexpected {
                expected: "`,` or `)`",
                found: r#"`"B"`"#.to_string(),
                position: 6
            },
            cause_of(parsed)
        );
    }

    #[test]
    fn remove_line_breaks_before_parsing() {
        let parsed = parse_default("\n\tmustTrueWithArg1(\"A\")\r\n\t||\n\tNot(\"B\")\n");

        assert_eq!(
            Ok(or!(
                call!("mustTrueWithArg1", string!("A")),
                call!("Not", string!("B"))
            )),
            parsed
        );
    }

    #[test]
    fn join_tokens_split_by_a_line_break() {
        assert_eq!("ab", normalize("a\nb"));
        assert_eq!("ab", normalize("a\r\nb"));
        assert_eq!("a\rb", normalize("a\rb"));
    }

    #[test]
    fn return_an_error_when_nesting_too_deep() {
        let limits = Limits::default().with_max_depth(2);

        let parsed = parse(r#"((("A")))"#, &limits);

        assert_eq!(
            ParserError::TooDeep {
                limit: 2,
                position: 2
            },
            cause_of(parsed)
        );
    }

    #[test]
    fn accept_nesting_up_to_the_limit() {
        let limits = Limits::default().with_max_depth(2);

        assert_eq!(Ok(string!("A")), parse(r#"(("A"))"#, &limits));
    }

    #[test]
    fn do_not_count_long_flat_chains_as_nesting() {
        let limits = Limits::default().with_max_depth(1);
        let expression = vec![r#"mustTrueWithArg1("A")"#; 1000].join("||");

        assert!(parse(&expression, &limits).is_ok());
    }
}
