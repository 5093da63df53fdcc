// ============================================================
// INITIAL SPACE FILTER
// ============================================================
// Drop spaces at the start of unquoted field positions before the
// tokenizer sees them

use std::io::{self, Read};

use crate::domain::csv::DialectConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    Unquoted,
    UnquotedEscape,
    Quoted,
    QuotedEscape,
    /// A quote seen inside a quoted field: either its end or a doubled quote
    QuoteInQuoted,
}

/// Byte-level reader adapter that removes the spaces following a
/// delimiter or a line break. Spaces inside quoted fields are kept, and a
/// quote after the skipped spaces still opens a quoted field.
///
/// Passes bytes through untouched when `enabled` is false.
pub struct InitialSpaceFilter<R> {
    inner: R,
    enabled: bool,
    delimiter: u8,
    quote: u8,
    escape: Option<u8>,
    doublequote: bool,
    state: State,
}

impl<R: Read> InitialSpaceFilter<R> {
    pub fn new(inner: R, dialect: &DialectConfig) -> Self {
        Self {
            inner,
            enabled: dialect.skipinitialspace,
            delimiter: dialect.delimiter,
            quote: dialect.quotechar,
            escape: dialect.escapechar,
            doublequote: dialect.doublequote,
            state: State::FieldStart,
        }
    }

    /// Advance the state machine by one byte; false when the byte is dropped
    fn keep(&mut self, byte: u8) -> bool {
        let is_break = byte == self.delimiter || byte == b'\n' || byte == b'\r';

        self.state = match self.state {
            State::FieldStart if byte == b' ' => return false,
            State::FieldStart if byte == self.quote => State::Quoted,
            State::FieldStart | State::Unquoted if is_break => State::FieldStart,
            State::FieldStart | State::Unquoted if Some(byte) == self.escape => {
                State::UnquotedEscape
            }
            State::FieldStart | State::Unquoted | State::UnquotedEscape => State::Unquoted,
            State::Quoted if Some(byte) == self.escape && byte != self.quote => {
                State::QuotedEscape
            }
            State::Quoted if byte == self.quote => State::QuoteInQuoted,
            State::Quoted | State::QuotedEscape => State::Quoted,
            State::QuoteInQuoted if byte == self.quote && self.doublequote => State::Quoted,
            State::QuoteInQuoted if is_break => State::FieldStart,
            State::QuoteInQuoted => State::Unquoted,
        };
        true
    }
}

impl<R: Read> Read for InitialSpaceFilter<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.enabled {
            return self.inner.read(buf);
        }

        loop {
            let read = self.inner.read(buf)?;
            if read == 0 {
                return Ok(0);
            }

            let mut kept = 0;
            for idx in 0..read {
                let byte = buf[idx];
                if self.keep(byte) {
                    buf[kept] = byte;
                    kept += 1;
                }
            }

            // A chunk made only of dropped spaces is not end of input
            if kept > 0 {
                return Ok(kept);
            }
        }
    }
}
