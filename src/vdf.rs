//! Reader for Valve's text KeyValues format, used for Steam's per-user config
//! files (`loginusers.vdf`, `localconfig.vdf`).
//!
//! Only what Steam's own config files need: quoted or bare tokens, nested
//! `{ }` sections, `//` comments and `[$PLATFORM]` conditionals (ignored).
//! Key lookups are case-insensitive because Steam itself is inconsistent
//! (`apps` vs `Apps`, `LastPlayed` vs `lastplayed`).

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum VdfError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected '{0}' at byte {1}")]
    Unexpected(char, usize),
    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Obj(Object),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    entries: Vec<(String, Value)>,
}

impl Object {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Value::Str(s) => Some(s),
            Value::Obj(_) => None,
        }
    }

    pub fn get_obj(&self, key: &str) -> Option<&Object> {
        match self.get(key)? {
            Value::Obj(o) => Some(o),
            Value::Str(_) => None,
        }
    }

    /// Follows a chain of nested sections.
    pub fn path(&self, keys: &[&str]) -> Option<&Object> {
        keys.iter().try_fold(self, |obj, key| obj.get_obj(key))
    }

    /// Nested sections only, with their keys.
    pub fn objects(&self) -> impl Iterator<Item = (&str, &Object)> {
        self.entries.iter().filter_map(|(k, v)| match v {
            Value::Obj(o) => Some((k.as_str(), o)),
            Value::Str(_) => None,
        })
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Text(String),
    Open,
    Close,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() || c == '\u{feff}' => {
                    self.bump();
                }
                Some('/') if self.src[self.pos..].starts_with("//") => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                // Platform conditionals such as [$WIN32] carry no data we use.
                Some('[') => {
                    while let Some(c) = self.bump() {
                        if c == ']' {
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, VdfError> {
        self.skip_trivia();
        let start = self.pos;
        let Some(c) = self.peek_char() else {
            return Ok(None);
        };

        match c {
            '{' => {
                self.bump();
                Ok(Some(Token::Open))
            }
            '}' => {
                self.bump();
                Ok(Some(Token::Close))
            }
            '"' => {
                self.bump();
                let mut text = String::new();
                loop {
                    match self.bump() {
                        None => return Err(VdfError::UnterminatedString(start)),
                        Some('"') => break,
                        Some('\\') => match self.bump() {
                            Some('n') => text.push('\n'),
                            Some('t') => text.push('\t'),
                            Some(other) => text.push(other),
                            None => return Err(VdfError::UnterminatedString(start)),
                        },
                        Some(other) => text.push(other),
                    }
                }
                Ok(Some(Token::Text(text)))
            }
            _ => {
                while let Some(c) = self.peek_char() {
                    if c.is_whitespace() || matches!(c, '{' | '}' | '"') {
                        break;
                    }
                    self.bump();
                }
                Ok(Some(Token::Text(self.src[start..self.pos].to_string())))
            }
        }
    }
}

/// Parses a KeyValues document into its top-level object.
pub fn parse(src: &str) -> Result<Object, VdfError> {
    let mut lexer = Lexer::new(src);
    let root = parse_entries(&mut lexer, false)?;
    Ok(root)
}

fn parse_entries(lexer: &mut Lexer<'_>, nested: bool) -> Result<Object, VdfError> {
    let mut object = Object::default();

    loop {
        let key = match lexer.next_token()? {
            None if nested => return Err(VdfError::UnexpectedEof),
            None => return Ok(object),
            Some(Token::Close) if nested => return Ok(object),
            Some(Token::Close) => return Err(VdfError::Unexpected('}', lexer.pos - 1)),
            Some(Token::Open) => return Err(VdfError::Unexpected('{', lexer.pos - 1)),
            Some(Token::Text(key)) => key,
        };

        let value = match lexer.next_token()? {
            None => return Err(VdfError::UnexpectedEof),
            Some(Token::Text(text)) => Value::Str(text),
            Some(Token::Open) => Value::Obj(parse_entries(lexer, true)?),
            Some(Token::Close) => return Err(VdfError::Unexpected('}', lexer.pos - 1)),
        };

        object.entries.push((key, value));
    }
}
