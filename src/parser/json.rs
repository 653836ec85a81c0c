//! Pull reader for the skeleton of a JSON document
//!
//! Objects and arrays that frame a result are walked one member or element
//! at a time; the values inside them are handed to serde_json. Values are
//! only read through serde_json when they end on a closing delimiter, so no
//! byte past the value is consumed; bare numbers are skipped by hand.

use crate::error::{WireError, WireResult};
use serde::de::{DeserializeOwned, IgnoredAny};
use std::io::{self, BufRead};

pub(crate) struct JsonPull<R> {
    reader: R,
}

impl<R: BufRead> JsonPull<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Next significant byte, left unconsumed; `None` at end of input
    pub fn peek(&mut self) -> WireResult<Option<u8>> {
        loop {
            let byte = match self.reader.fill_buf() {
                Ok(buf) => buf.first().copied(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            match byte {
                Some(b) if b.is_ascii_whitespace() => self.reader.consume(1),
                other => return Ok(other),
            }
        }
    }

    pub fn expect(&mut self, expected: u8) -> WireResult<()> {
        match self.peek()? {
            Some(b) if b == expected => {
                self.reader.consume(1);
                Ok(())
            }
            Some(b) => Err(unexpected(b, &format!("'{}'", expected as char))),
            None => Err(truncated()),
        }
    }

    /// Name of the next object member, positioned at its value; `None` after `}`
    pub fn next_member(&mut self, first: &mut bool) -> WireResult<Option<String>> {
        match self.peek()? {
            Some(b'}') => {
                self.reader.consume(1);
                return Ok(None);
            }
            Some(b',') if !*first => self.reader.consume(1),
            Some(_) if *first => {}
            Some(b) => return Err(unexpected(b, "',' or '}'")),
            None => return Err(truncated()),
        }
        *first = false;
        let name: String = self.read_value()?;
        self.expect(b':')?;
        Ok(Some(name))
    }

    /// Whether another array element follows, positioned at it; false after `]`
    pub fn next_element(&mut self, first: &mut bool) -> WireResult<bool> {
        match self.peek()? {
            Some(b']') => {
                self.reader.consume(1);
                return Ok(false);
            }
            Some(b',') if !*first => self.reader.consume(1),
            Some(_) if *first => {}
            Some(b) => return Err(unexpected(b, "',' or ']'")),
            None => return Err(truncated()),
        }
        *first = false;
        Ok(true)
    }

    pub fn read_value<T: DeserializeOwned>(&mut self) -> WireResult<T> {
        let mut de = serde_json::Deserializer::from_reader(&mut self.reader);
        Ok(T::deserialize(&mut de)?)
    }

    pub fn read_bool(&mut self) -> WireResult<bool> {
        match self.peek()? {
            Some(b't') | Some(b'f') => self.read_value(),
            Some(b) => Err(unexpected(b, "a boolean")),
            None => Err(truncated()),
        }
    }

    pub fn skip_value(&mut self) -> WireResult<()> {
        match self.peek()? {
            Some(b'-') | Some(b'0'..=b'9') => self.skip_number(),
            Some(_) => self.read_value::<IgnoredAny>().map(|_| ()),
            None => Err(truncated()),
        }
    }

    fn skip_number(&mut self) -> WireResult<()> {
        loop {
            let (len, more) = match self.reader.fill_buf() {
                Ok(buf) => {
                    let len = buf
                        .iter()
                        .take_while(|b| matches!(b, b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E'))
                        .count();
                    (len, len == buf.len() && !buf.is_empty())
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.reader.consume(len);
            if !more {
                return Ok(());
            }
        }
    }

    /// Only whitespace may follow the document
    pub fn expect_end(&mut self) -> WireResult<()> {
        match self.peek()? {
            None => Ok(()),
            Some(b) => Err(unexpected(b, "end of document")),
        }
    }
}

fn unexpected(found: u8, expected: &str) -> WireError {
    WireError::malformed(format!(
        "expected {} but found '{}'",
        expected,
        found.escape_ascii()
    ))
}

fn truncated() -> WireError {
    WireError::malformed("truncated stream")
}
