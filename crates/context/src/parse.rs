//! Recursive-descent parser for the predicate syntax.
//!
//! ```text
//! expr    = and ("||" and)*
//! and     = unary ("&&" unary)*
//! unary   = "!" unary | primary
//! primary = "(" expr ")" | "true" | "false" | key (op value)?
//! op      = "==" | "!=" | "=~"
//! value   = quoted | regex | word
//! ```
//!
//! `key == true` and `key == false` parse to the bare-key forms.

use std::str::FromStr;

use thiserror::Error;

use crate::expr::{ContextKeyExpr, KeyRegex};
use crate::snapshot::ContextValue;

/// Error produced for malformed predicate text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextParseError {
	#[error("unexpected end of input at {position}")]
	UnexpectedEnd { position: usize },
	#[error("unexpected {found:?} at {position}")]
	Unexpected { found: String, position: usize },
	#[error("unterminated {what} starting at {position}")]
	Unterminated { what: &'static str, position: usize },
	#[error("invalid regex at {position}: {message}")]
	InvalidRegex { message: String, position: usize },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
	LParen,
	RParen,
	Bang,
	And,
	Or,
	Eq,
	NotEq,
	Match,
	Quoted(String),
	Regex(String, String),
	Word(String),
}

fn is_word_char(c: char) -> bool {
	!c.is_whitespace() && !matches!(c, '(' | ')' | '!' | '&' | '|' | '=' | '\'' | '"')
}

fn lex(input: &str) -> Result<Vec<(Token, usize)>, ContextParseError> {
	let mut tokens: Vec<(Token, usize)> = Vec::new();
	let mut chars = input.char_indices().peekable();

	while let Some(&(pos, c)) = chars.peek() {
		if c.is_whitespace() {
			chars.next();
			continue;
		}

		let two = input.get(pos..pos + 2);
		let token = match (c, two) {
			(_, Some("&&")) => {
				chars.nth(1);
				Token::And
			}
			(_, Some("||")) => {
				chars.nth(1);
				Token::Or
			}
			(_, Some("==")) => {
				chars.nth(1);
				Token::Eq
			}
			(_, Some("!=")) => {
				chars.nth(1);
				Token::NotEq
			}
			(_, Some("=~")) => {
				chars.nth(1);
				Token::Match
			}
			('(', _) => {
				chars.next();
				Token::LParen
			}
			(')', _) => {
				chars.next();
				Token::RParen
			}
			('!', _) => {
				chars.next();
				Token::Bang
			}
			('/', _) if matches!(tokens.last(), Some((Token::Match, _))) => {
				chars.next();
				let mut pattern = String::new();
				let mut closed = false;
				while let Some((_, c)) = chars.next() {
					match c {
						'\\' if chars.peek().is_some_and(|&(_, n)| n == '/' || n == '\\') => {
							if let Some((_, escaped)) = chars.next() {
								pattern.push(escaped);
							}
						}
						'/' => {
							closed = true;
							break;
						}
						c => pattern.push(c),
					}
				}
				if !closed {
					return Err(ContextParseError::Unterminated { what: "regex", position: pos });
				}
				let mut flags = String::new();
				while let Some(&(_, f)) = chars.peek() {
					if !f.is_ascii_alphabetic() {
						break;
					}
					flags.push(f);
					chars.next();
				}
				Token::Regex(pattern, flags)
			}
			(quote @ ('\'' | '"'), _) => {
				chars.next();
				let mut text = String::new();
				let mut closed = false;
				while let Some((_, c)) = chars.next() {
					match c {
						'\\' if chars.peek().is_some_and(|&(_, n)| n == quote || n == '\\') => {
							if let Some((_, escaped)) = chars.next() {
								text.push(escaped);
							}
						}
						c if c == quote => {
							closed = true;
							break;
						}
						c => text.push(c),
					}
				}
				if !closed {
					return Err(ContextParseError::Unterminated { what: "string", position: pos });
				}
				Token::Quoted(text)
			}
			(c, _) if is_word_char(c) => {
				let mut word = String::new();
				while let Some(&(_, c)) = chars.peek() {
					if !is_word_char(c) {
						break;
					}
					word.push(c);
					chars.next();
				}
				Token::Word(word)
			}
			(c, _) => {
				return Err(ContextParseError::Unexpected { found: c.to_string(), position: pos });
			}
		};
		tokens.push((token, pos));
	}

	Ok(tokens)
}

struct Parser {
	tokens: Vec<(Token, usize)>,
	cursor: usize,
	end: usize,
}

impl Parser {
	fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.cursor).map(|(t, _)| t)
	}

	fn position(&self) -> usize {
		self.tokens.get(self.cursor).map_or(self.end, |(_, p)| *p)
	}

	fn next(&mut self) -> Result<(Token, usize), ContextParseError> {
		let token = self
			.tokens
			.get(self.cursor)
			.cloned()
			.ok_or(ContextParseError::UnexpectedEnd { position: self.end })?;
		self.cursor += 1;
		Ok(token)
	}

	fn unexpected(token: &Token, position: usize) -> ContextParseError {
		ContextParseError::Unexpected {
			found: format!("{token:?}"),
			position,
		}
	}

	fn parse_or(&mut self) -> Result<ContextKeyExpr, ContextParseError> {
		let mut terms = vec![Some(self.parse_and()?)];
		while self.peek() == Some(&Token::Or) {
			self.cursor += 1;
			terms.push(Some(self.parse_and()?));
		}
		Ok(ContextKeyExpr::or(terms).unwrap_or(ContextKeyExpr::False))
	}

	fn parse_and(&mut self) -> Result<ContextKeyExpr, ContextParseError> {
		let mut terms = vec![Some(self.parse_unary()?)];
		while self.peek() == Some(&Token::And) {
			self.cursor += 1;
			terms.push(Some(self.parse_unary()?));
		}
		Ok(ContextKeyExpr::and(terms).unwrap_or(ContextKeyExpr::True))
	}

	fn parse_unary(&mut self) -> Result<ContextKeyExpr, ContextParseError> {
		if self.peek() == Some(&Token::Bang) {
			self.cursor += 1;
			return Ok(self.parse_unary()?.negate());
		}
		self.parse_primary()
	}

	fn parse_primary(&mut self) -> Result<ContextKeyExpr, ContextParseError> {
		let (token, position) = self.next()?;
		let key = match token {
			Token::LParen => {
				let inner = self.parse_or()?;
				return match self.next()? {
					(Token::RParen, _) => Ok(inner),
					(other, pos) => Err(Self::unexpected(&other, pos)),
				};
			}
			Token::Word(word) if word == "true" => return Ok(ContextKeyExpr::True),
			Token::Word(word) if word == "false" => return Ok(ContextKeyExpr::False),
			Token::Word(word) => word,
			other => return Err(Self::unexpected(&other, position)),
		};

		match self.peek() {
			Some(Token::Eq) | Some(Token::NotEq) => {
				let (op, _) = self.next()?;
				let expr = literal_comparison(&key, self.parse_value()?);
				Ok(if op == Token::NotEq { expr.negate() } else { expr })
			}
			Some(Token::Match) => {
				self.cursor += 1;
				let position = self.position();
				match self.next()? {
					(Token::Regex(pattern, flags), _) => {
						let inline: String = flags.chars().filter(|f| matches!(f, 'i' | 'm' | 's')).collect();
						let source = if inline.is_empty() { pattern } else { format!("(?{inline}){pattern}") };
						let re = KeyRegex::new(&source).map_err(|e| ContextParseError::InvalidRegex {
							message: e.to_string(),
							position,
						})?;
						Ok(ContextKeyExpr::Regex(Box::from(key.as_str()), re))
					}
					(other, pos) => Err(Self::unexpected(&other, pos)),
				}
			}
			_ => Ok(ContextKeyExpr::has(&key)),
		}
	}

	fn parse_value(&mut self) -> Result<Literal, ContextParseError> {
		match self.next()? {
			(Token::Quoted(text), _) => Ok(Literal::Text(text)),
			(Token::Word(word), _) if word == "true" => Ok(Literal::Bool(true)),
			(Token::Word(word), _) if word == "false" => Ok(Literal::Bool(false)),
			(Token::Word(word), _) => Ok(Literal::Text(word)),
			(other, pos) => Err(Self::unexpected(&other, pos)),
		}
	}
}

enum Literal {
	Bool(bool),
	Text(String),
}

fn literal_comparison(key: &str, value: Literal) -> ContextKeyExpr {
	match value {
		Literal::Bool(true) => ContextKeyExpr::has(key),
		Literal::Bool(false) => ContextKeyExpr::not(key),
		Literal::Text(text) => ContextKeyExpr::equals(key, ContextValue::from(text)),
	}
}

impl FromStr for ContextKeyExpr {
	type Err = ContextParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut parser = Parser {
			tokens: lex(s)?,
			cursor: 0,
			end: s.len(),
		};
		let expr = parser.parse_or()?;
		match parser.tokens.get(parser.cursor) {
			None => Ok(expr),
			Some((token, pos)) => Err(Parser::unexpected(token, *pos)),
		}
	}
}
