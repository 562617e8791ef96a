use std::str::Chars;

use ahash::AHashSet;
use regex_automata::meta::Regex;
use regex_automata::{Anchored, Input};

use super::markers::LineTracker;
use super::token::{Token, TokenKind};
use crate::errors::SQLLexError;

/// An element matched during lexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element<'a> {
    pub name: &'static str,
    pub kind: TokenKind,
    pub text: &'a str,
}

enum Scan<'a> {
    Matched(Element<'a>),
    Unterminated(&'static str),
    NoMatch,
}

#[derive(Debug, Clone)]
pub struct Matcher {
    name: &'static str,
    kind: TokenKind,
    pattern: Pattern,
}

#[derive(Debug, Clone)]
enum Pattern {
    String(&'static str),
    Regex(Regex),
    Native(fn(&mut Cursor) -> bool),
    Quoted {
        open: char,
        close: char,
        escape: Option<char>,
    },
}

impl Matcher {
    pub const fn string(name: &'static str, template: &'static str, kind: TokenKind) -> Self {
        Self {
            name,
            kind,
            pattern: Pattern::String(template),
        }
    }

    #[track_caller]
    pub fn regex(name: &'static str, pattern: &'static str, kind: TokenKind) -> Self {
        let regex = Regex::new(pattern).unwrap_or_else(|err| {
            panic!(
                "Invalid regex pattern for lexer matcher '{name}' at {}: {err}",
                std::panic::Location::caller()
            )
        });

        Self {
            name,
            kind,
            pattern: Pattern::Regex(regex),
        }
    }

    pub fn native(name: &'static str, f: fn(&mut Cursor) -> bool, kind: TokenKind) -> Self {
        Self {
            name,
            kind,
            pattern: Pattern::Native(f),
        }
    }

    /// A literal enclosed by `open` and `close`. A doubled `close` inside the
    /// literal stands for itself.
    pub fn quoted(name: &'static str, open: char, close: char, kind: TokenKind) -> Self {
        Self {
            name,
            kind,
            pattern: Pattern::Quoted {
                open,
                close,
                escape: None,
            },
        }
    }

    /// Lets `escape` protect the following character inside a quoted literal.
    #[track_caller]
    pub fn escape(mut self, escape_char: char) -> Self {
        match &mut self.pattern {
            Pattern::Quoted { escape, .. } => *escape = Some(escape_char),
            _ => panic!("Only quoted matchers accept an escape character."),
        }
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The escape character of a quoted matcher, if it has one.
    pub fn escape_char(&self) -> Option<char> {
        match self.pattern {
            Pattern::Quoted { escape, .. } => escape,
            _ => None,
        }
    }

    /// Match the start of `forward_string`, returning the matched text.
    pub fn matches<'a>(&self, forward_string: &'a str) -> Option<&'a str> {
        match self.scan(forward_string) {
            Scan::Matched(element) => Some(element.text),
            Scan::Unterminated(_) | Scan::NoMatch => None,
        }
    }

    fn scan<'a>(&self, forward_string: &'a str) -> Scan<'a> {
        let len = match &self.pattern {
            Pattern::String(template) => forward_string
                .starts_with(template)
                .then_some(template.len()),
            Pattern::Regex(regex) => regex
                .search(&Input::new(forward_string).anchored(Anchored::Yes))
                .map(|matched| matched.end()),
            Pattern::Native(f) => {
                let mut cursor = Cursor::new(forward_string);
                let matched = f(&mut cursor);

                if cursor.unterminated {
                    return Scan::Unterminated(self.name);
                }

                matched.then(|| cursor.lexed().len())
            }
            &Pattern::Quoted {
                open,
                close,
                escape,
            } => match scan_quoted(forward_string, open, close, escape) {
                Ok(len) => len,
                Err(()) => return Scan::Unterminated(self.name),
            },
        };

        match len {
            Some(len) if len > 0 => Scan::Matched(Element {
                name: self.name,
                kind: self.kind,
                text: &forward_string[..len],
            }),
            _ => Scan::NoMatch,
        }
    }
}

fn scan_quoted(
    forward_string: &str,
    open: char,
    close: char,
    escape: Option<char>,
) -> Result<Option<usize>, ()> {
    let mut chars = forward_string.char_indices();

    match chars.next() {
        Some((_, ch)) if ch == open => {}
        _ => return Ok(None),
    }

    while let Some((idx, ch)) = chars.next() {
        if Some(ch) == escape {
            chars.next();
            continue;
        }

        if ch == close {
            let end = idx + ch.len_utf8();
            if forward_string[end..].starts_with(close) {
                chars.next();
                continue;
            }
            return Ok(Some(end));
        }
    }

    Err(())
}

pub struct Cursor<'text> {
    text: &'text str,
    chars: Chars<'text>,
    unterminated: bool,
}

impl<'text> Cursor<'text> {
    pub const EOF: char = '\0';

    fn new(text: &'text str) -> Self {
        Self {
            text,
            chars: text.chars(),
            unterminated: false,
        }
    }

    pub fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(Self::EOF)
    }

    pub fn shift(&mut self) -> char {
        self.chars.next().unwrap_or(Self::EOF)
    }

    pub fn shift_while(&mut self, f: impl Fn(char) -> bool + Copy) {
        while self.peek() != Self::EOF && f(self.peek()) {
            self.shift();
        }
    }

    /// Flags input which opens a construct that never closes.
    pub fn mark_unterminated(&mut self) {
        self.unterminated = true;
    }

    fn lexed(&self) -> &'text str {
        let len = self.text.len() - self.chars.as_str().len();
        &self.text[..len]
    }
}

/// The Lexer class actually does the lexing step.
///
/// Matchers are tried in order and the first one to match wins. Words whose
/// uppercase form is one of the reserved keywords come out as
/// [`TokenKind::Keyword`].
#[derive(Debug, Clone)]
pub struct Lexer {
    matchers: Vec<Matcher>,
    reserved_keywords: AHashSet<&'static str>,
    string_escape: Option<char>,
}

impl Lexer {
    pub fn new(lexer_matchers: &[Matcher], reserved_keywords: AHashSet<&'static str>) -> Self {
        let string_escape = lexer_matchers
            .iter()
            .filter(|matcher| matcher.kind() == TokenKind::StringLiteral)
            .find_map(Matcher::escape_char);

        Self {
            matchers: lexer_matchers.to_vec(),
            reserved_keywords,
            string_escape,
        }
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved_keywords
            .contains(word.to_ascii_uppercase().as_str())
    }

    /// The character that escapes the next one inside string literals. A
    /// doubled quote always stands for itself.
    pub fn string_escape(&self) -> Option<char> {
        self.string_escape
    }

    /// Lex `source` into tokens, dropping whitespace and comments. The
    /// returned sequence always ends with an end-of-file token.
    pub fn lex(&self, source: &str) -> Result<Vec<Token>, SQLLexError> {
        let mut tracker = LineTracker::default();
        let mut tokens = Vec::new();
        let mut forward_string = source;

        while !forward_string.is_empty() {
            match self.scan(forward_string) {
                Scan::Matched(element) => {
                    let position = tracker.consume(element.text);
                    forward_string = &forward_string[element.text.len()..];

                    if element.kind.is_trivia() {
                        continue;
                    }

                    let kind = if element.kind == TokenKind::Word && self.is_reserved(element.text)
                    {
                        TokenKind::Keyword
                    } else {
                        element.kind
                    };

                    tokens.push(Token::new(kind, element.text, position));
                }
                Scan::Unterminated(name) => {
                    let position = tracker.point();
                    return Err(SQLLexError::new(
                        format!("Unterminated {} at {position}", name.replace('_', " ")),
                        position,
                    ));
                }
                Scan::NoMatch => {
                    let position = tracker.point();
                    let ch = forward_string.chars().next().unwrap_or(Cursor::EOF);
                    return Err(SQLLexError::new(
                        format!("Unable to lex character {ch:?} at {position}"),
                        position,
                    ));
                }
            }
        }

        tokens.push(Token::end_of_file(tracker.point()));
        log::trace!("lexed {} tokens", tokens.len());

        Ok(tokens)
    }

    fn scan<'a>(&self, forward_string: &'a str) -> Scan<'a> {
        for matcher in &self.matchers {
            match matcher.scan(forward_string) {
                Scan::NoMatch => continue,
                found => return found,
            }
        }

        Scan::NoMatch
    }
}
