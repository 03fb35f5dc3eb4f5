use std::fmt;
use std::ops::Range;

use logos::Logos;

/// Minimum length of an underscore run that counts as a section rule.
pub const RULE_MIN_LEN: usize = 10;

/// Token type for lore documents.
///
/// The lexer only finds line structure. Everything with meaning (headers,
/// fields, dialogue) is recognized later from whole lines.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Line break.
    Newline,
    /// Bullet marker `•`. Starts a new logical line even mid-line.
    Bullet,
    /// A run of at least [`RULE_MIN_LEN`] underscores.
    Rule,
    /// Any other run of text.
    Text(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Newline => write!(f, "newline"),
            Token::Bullet => write!(f, "•"),
            Token::Rule => write!(f, "rule"),
            Token::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Internal logos token. Every input character belongs to exactly one pattern,
/// so lexing cannot fail.
#[derive(Logos, Debug)]
enum RawToken {
    #[token("\n")]
    Newline,

    #[token("•")]
    Bullet,

    #[regex(r"_+")]
    Underscores,

    #[regex(r"[^\n•_]+")]
    Text,
}

/// Lex a document into `(Token, Span)` pairs.
pub fn lex(source: &str) -> Vec<(Token, Range<usize>)> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let token = match result {
            Ok(RawToken::Newline) => Token::Newline,
            Ok(RawToken::Bullet) => Token::Bullet,
            Ok(RawToken::Underscores) if lexer.slice().len() >= RULE_MIN_LEN => Token::Rule,
            Ok(RawToken::Underscores | RawToken::Text) | Err(()) => {
                Token::Text(lexer.slice().to_string())
            }
        };
        tokens.push((token, span));
    }

    tokens
}

/// One logical line of a lore document.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Whether the line was introduced by a bullet marker.
    pub bullet: bool,
    /// Whether the line is a section rule.
    pub rule: bool,
    /// Trimmed text, without the bullet marker.
    pub text: String,
    /// Byte range of the line in the source.
    pub span: Range<usize>,
}

impl Line {
    /// A line with no text that is neither a bullet nor a rule.
    pub fn is_blank(&self) -> bool {
        !self.bullet && !self.rule && self.text.is_empty()
    }
}

struct PendingLine {
    bullet: bool,
    text: String,
    span: Range<usize>,
}

impl PendingLine {
    fn finish(self) -> Line {
        Line {
            bullet: self.bullet,
            rule: false,
            text: self.text.trim().to_string(),
            span: self.span,
        }
    }
}

/// Fold the token stream into logical lines.
///
/// Newlines end a line, bullets and rules also start a new one. Blank source
/// lines are kept as blank [`Line`]s so paragraph breaks survive.
pub fn lines(source: &str) -> Vec<Line> {
    let mut out = Vec::new();
    let mut current: Option<PendingLine> = None;
    let mut at_line_start = true;

    for (token, span) in lex(source) {
        match token {
            Token::Newline => {
                match current.take() {
                    Some(pending) => out.push(pending.finish()),
                    None if at_line_start => out.push(Line {
                        bullet: false,
                        rule: false,
                        text: String::new(),
                        span: span.clone(),
                    }),
                    None => {}
                }
                at_line_start = true;
            }
            Token::Bullet => {
                if let Some(pending) = current.take() {
                    out.push(pending.finish());
                }
                current = Some(PendingLine {
                    bullet: true,
                    text: String::new(),
                    span,
                });
                at_line_start = false;
            }
            Token::Rule => {
                if let Some(pending) = current.take() {
                    out.push(pending.finish());
                }
                out.push(Line {
                    bullet: false,
                    rule: true,
                    text: String::new(),
                    span,
                });
                at_line_start = false;
            }
            Token::Text(text) => {
                let pending = current.get_or_insert_with(|| PendingLine {
                    bullet: false,
                    text: String::new(),
                    span: span.clone(),
                });
                pending.text.push_str(&text);
                pending.span.end = span.end;
                at_line_start = false;
            }
        }
    }

    if let Some(pending) = current.take() {
        out.push(pending.finish());
    }

    out
}
