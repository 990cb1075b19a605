use crate::error::ParserError;
use logos::{Logos, SpannedIter};
use thiserror::Error;

#[derive(Default, Error, Debug, Clone, PartialEq)]
pub enum LexicalError {
    #[default]
    #[error("invalid token")]
    InvalidToken,
}

/// Tokens of the filter language.
///
/// Besides `&&`, `||` and the unary `-`, the lexer knows about the operators of the wider
/// expression language so that the parser can build a tree the compiler rejects by name
/// instead of failing with an opaque lexical error. Literals keep their source text; turning
/// them into values is left to the compiler.
#[derive(Clone, Debug, Logos, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+", error = LexicalError)]
pub enum Token<'source> {
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("!")]
    Not,
    #[token("-")]
    Minus,
    #[token("+")]
    Plus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Ampersand,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("==")]
    Equal,
    #[token("!=")]
    NotEqual,
    #[token("<")]
    LessThan,
    #[token("<=")]
    LessThanEqual,
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterThanEqual,
    #[token("(")]
    LeftParenthesis,
    #[token(")")]
    RightParenthesis,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[regex(r"[0-9][0-9_]*|0[xX][0-9a-fA-F_]+", |lex| lex.slice())]
    IntegerLiteral(&'source str),
    #[regex(
        r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?|\.[0-9][0-9_]*([eE][+-]?[0-9]+)?|[0-9][0-9_]*[eE][+-]?[0-9]+",
        |lex| lex.slice()
    )]
    FloatLiteral(&'source str),
    #[regex(
        r"([0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9]+)?|\.[0-9][0-9_]*([eE][+-]?[0-9]+)?)i",
        |lex| lex.slice()
    )]
    ImaginaryLiteral(&'source str),
    #[regex(r#""(\\.|[^"\\])*""#, |lex| lex.slice())]
    StringLiteral(&'source str),
    #[regex(r"`[^`]*`", |lex| lex.slice())]
    RawStringLiteral(&'source str),
    #[regex(r"'(\\.|[^'\\])*'", |lex| lex.slice())]
    CharLiteral(&'source str),
    #[token("true", |_| true)]
    #[token("false", |_| false)]
    BooleanLiteral(bool),
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice())]
    Identifier(&'source str),
}

impl std::fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => write!(f, "`&&`"),
            Self::Or => write!(f, "`||`"),
            Self::Not => write!(f, "`!`"),
            Self::Minus => write!(f, "`-`"),
            Self::Plus => write!(f, "`+`"),
            Self::Star => write!(f, "`*`"),
            Self::Slash => write!(f, "`/`"),
            Self::Percent => write!(f, "`%`"),
            Self::Ampersand => write!(f, "`&`"),
            Self::Pipe => write!(f, "`|`"),
            Self::Caret => write!(f, "`^`"),
            Self::Equal => write!(f, "`==`"),
            Self::NotEqual => write!(f, "`!=`"),
            Self::LessThan => write!(f, "`<`"),
            Self::LessThanEqual => write!(f, "`<=`"),
            Self::GreaterThan => write!(f, "`>`"),
            Self::GreaterThanEqual => write!(f, "`>=`"),
            Self::LeftParenthesis => write!(f, "`(`"),
            Self::RightParenthesis => write!(f, "`)`"),
            Self::Comma => write!(f, "`,`"),
            Self::Dot => write!(f, "`.`"),
            Self::IntegerLiteral(text)
            | Self::FloatLiteral(text)
            | Self::ImaginaryLiteral(text)
            | Self::StringLiteral(text)
            | Self::RawStringLiteral(text)
            | Self::CharLiteral(text)
            | Self::Identifier(text) => write!(f, "`{text}`"),
            Self::BooleanLiteral(value) => write!(f, "`{value}`"),
        }
    }
}

pub type Spanned<Tok, Location, Error> = Result<(Location, Tok, Location), Error>;

pub struct Lexer<'input> {
    token_stream: SpannedIter<'input, Token<'input>>,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        Self {
            token_stream: Token::lexer(input).spanned(),
        }
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Spanned<Token<'input>, usize, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.token_stream.next().map(|(token, span)| {
            let token = token.map_err(|error| ParserError::Lexical {
                error,
                position: span.start,
            })?;
            Ok((span.start, token, span.end))
        })
    }
}
