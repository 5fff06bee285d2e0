//! Character sources and the push-back cursor the reader consumes

use std::collections::VecDeque;
use std::io::BufRead;

/// Anything that can hand out characters one at a time
pub trait CharSource {
    /// Next character, or `None` once the source is exhausted
    fn next_char(&mut self) -> Option<char>;
}

/// In-memory source over a string
pub struct StrSource {
    chars: Vec<char>,
    pos: usize,
}

impl StrSource {
    /// Creates a source over the given text
    pub fn new(text: &str) -> Self {
        StrSource {
            chars: text.chars().collect(),
            pos: 0,
        }
    }
}

impl CharSource for StrSource {
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }
}

/// Streaming source pulling one line at a time from a buffered reader
///
/// I/O failures are logged and treated as end of input.
pub struct StreamSource<R: BufRead> {
    inner: R,
    pending: VecDeque<char>,
    exhausted: bool,
}

impl<R: BufRead> StreamSource<R> {
    /// Wraps a buffered reader
    pub fn new(inner: R) -> Self {
        StreamSource {
            inner,
            pending: VecDeque::new(),
            exhausted: false,
        }
    }

    fn refill(&mut self) {
        let mut line = String::new();
        match self.inner.read_line(&mut line) {
            Ok(0) => self.exhausted = true,
            Ok(_) => self.pending.extend(line.chars()),
            Err(err) => {
                tracing::warn!("stream source read failed, treating as end of input: {}", err);
                self.exhausted = true;
            }
        }
    }
}

impl<R: BufRead> CharSource for StreamSource<R> {
    fn next_char(&mut self) -> Option<char> {
        while self.pending.is_empty() && !self.exhausted {
            self.refill();
        }
        self.pending.pop_front()
    }
}

/// Cursor over a character source with push-back and a cached end-of-input flag
pub struct CharStream {
    source: Box<dyn CharSource>,
    /// Pushed-back characters, most recent last
    pushback: Vec<char>,
    finished: bool,
    /// Characters consumed so far (decremented on push-back)
    offset: usize,
}

impl CharStream {
    /// Creates a stream over an in-memory string
    pub fn from_text(text: &str) -> Self {
        Self::new(Box::new(StrSource::new(text)))
    }

    /// Creates a stream over a buffered reader
    pub fn from_reader<R: BufRead + 'static>(reader: R) -> Self {
        Self::new(Box::new(StreamSource::new(reader)))
    }

    /// Creates a stream over any boxed character source
    pub fn new(source: Box<dyn CharSource>) -> Self {
        CharStream {
            source,
            pushback: Vec::new(),
            finished: false,
            offset: 0,
        }
    }

    /// Consumes and returns the next character
    pub fn advance(&mut self) -> Option<char> {
        let c = match self.pushback.pop() {
            Some(c) => Some(c),
            None if self.finished => None,
            None => self.source.next_char(),
        };
        match c {
            Some(_) => self.offset += 1,
            None => self.finished = true,
        }
        c
    }

    /// Returns the next character without consuming it
    pub fn peek(&mut self) -> Option<char> {
        let c = self.advance()?;
        self.unread(c);
        Some(c)
    }

    /// Pushes a character back so the next call to `advance` returns it
    pub fn unread(&mut self, c: char) {
        self.pushback.push(c);
        self.offset = self.offset.saturating_sub(1);
        self.finished = false;
    }

    /// True once the underlying source has nothing left
    ///
    /// The answer is cached after the first time exhaustion is observed.
    pub fn is_finished(&mut self) -> bool {
        if !self.pushback.is_empty() {
            return false;
        }
        if !self.finished {
            if let Some(c) = self.advance() {
                self.unread(c);
            }
        }
        self.finished
    }

    /// Number of characters consumed so far
    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_next_and_unread() {
        let mut stream = CharStream::from_text("ab");
        assert_eq!(stream.advance(), Some('a'));
        assert_eq!(stream.offset(), 1);
        stream.unread('a');
        assert_eq!(stream.offset(), 0);
        assert_eq!(stream.advance(), Some('a'));
        assert_eq!(stream.advance(), Some('b'));
        assert_eq!(stream.advance(), None);
        assert!(stream.is_finished());
    }

    #[test]
    fn test_unread_clears_finished() {
        let mut stream = CharStream::from_text("x");
        assert_eq!(stream.advance(), Some('x'));
        assert!(stream.is_finished());
        stream.unread('x');
        assert!(!stream.is_finished());
        assert_eq!(stream.peek(), Some('x'));
    }

    #[test]
    fn test_empty_source_is_finished() {
        let mut stream = CharStream::from_text("");
        assert!(stream.is_finished());
        assert_eq!(stream.advance(), None);
    }

    #[test]
    fn test_stream_source_reads_lines() {
        let mut stream = CharStream::from_reader(Cursor::new("a\nb"));
        let collected: String = std::iter::from_fn(|| stream.advance()).collect();
        assert_eq!(collected, "a\nb");
        assert!(stream.is_finished());
    }
}
