use crate::error::Error;

/// Max recursion depth
const MAX_DEPTH: usize = 256;

#[derive(Default)]
pub(super) struct Backrefs<'a> {
    /// Up to 10 idents can be memorized for lookup using backref's: 0, 1, ..
    memorized: [&'a str; 10],

    /// Number of so far memorized idents.
    memorized_count: usize,
}

impl<'a> Backrefs<'a> {
    /// Every ident takes a slot until the table is full, repeated idents included.
    pub fn try_memorizing_ident(&mut self, ident: &'a str) {
        if self.memorized_count != self.memorized.len() {
            self.memorized[self.memorized_count] = ident;
            self.memorized_count += 1;
        }
    }

    pub fn get_memorized_ident(&self, idx: usize) -> Result<&'a str, Error> {
        if idx >= self.memorized_count {
            return Err(Error::DanglingReference);
        }

        Ok(self.memorized[idx])
    }
}

/// Read-only cursor over the mangled symbol.
pub(super) struct Context<'a> {
    src: &'a str,
    pub offset: usize,
    depth: usize,
}

impl<'a> Context<'a> {
    /// Create an initialized parser that hasn't started parsing yet.
    pub fn new(s: &'a str) -> Self {
        Self {
            src: s,
            offset: 0,
            depth: 0,
        }
    }

    /// Part of the mangled symbol that hasn't been consumed.
    #[inline]
    pub fn src(&self) -> &'a str {
        &self.src[self.offset..]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offset == self.src.len()
    }

    /// View the current byte in the mangled symbol without incrementing the offset.
    pub fn peek(&self) -> Option<u8> {
        self.src().bytes().next()
    }

    pub fn starts_with(&self, literal: &str) -> bool {
        self.src().starts_with(literal)
    }

    /// Increment the offset if the literal matches, leaving it untouched otherwise.
    pub fn consume(&mut self, literal: &str) -> bool {
        let matches = self.starts_with(literal);
        self.offset += literal.len() * (matches as usize);
        matches
    }

    /// View the current byte in the mangled symbol, incrementing the offset.
    pub fn take(&mut self) -> Option<u8> {
        self.peek().map(|byte| {
            self.offset += 1;
            byte
        })
    }

    /// Undo the last [`Self::take`].
    pub fn push_back(&mut self, byte: Option<u8>) {
        if let Some(byte) = byte {
            debug_assert_eq!(self.src.as_bytes().get(self.offset - 1), Some(&byte));
            self.offset -= 1;
        }
    }

    /// Consume everything that's left.
    pub fn take_rest(&mut self) -> &'a str {
        let rest = self.src();
        self.offset = self.src.len();
        rest
    }

    /// ```text
    /// <number> = [?] <non-negative integer>
    ///
    /// <non-negative integer> = <decimal digit> // when 1 <= number <= 10
    ///                        | <hex digit>+ @  // when number == 0 or >= 10
    ///
    /// <hex-digit> = [A-P] // A = 0, B = 1, ...
    /// ```
    pub fn number(&mut self) -> Result<i32, Error> {
        let negative = self.consume("?");

        if let Some(c @ b'0'..=b'9') = self.peek() {
            self.offset += 1;

            let n = (c - b'0') as i32 + 1;
            return Ok(if negative { -n } else { n });
        }

        let mut n = 0i32;
        let mut len = 0;
        for chr in self.src().bytes() {
            match chr {
                b'A'..=b'P' => {
                    n = n.checked_mul(16).ok_or(Error::BadNumber)?;
                    n = n.checked_add((chr - b'A') as i32).ok_or(Error::BadNumber)?;
                    len += 1;
                }
                b'@' => {
                    self.offset += len + 1;
                    return Ok(if negative { -n } else { n });
                }
                _ => break,
            }
        }

        Err(Error::BadNumber)
    }

    /// Identifier terminated by '@', the terminator is consumed but not returned.
    pub fn ident(&mut self) -> Result<&'a str, Error> {
        let len = self
            .src()
            .bytes()
            .position(|c| c == b'@')
            .ok_or(Error::UnterminatedString)?;

        let ident = &self.src()[..len];
        self.offset += len + 1;
        Ok(ident)
    }

    #[inline]
    pub fn descent(&mut self) -> Result<(), Error> {
        self.depth += 1;

        if self.depth > MAX_DEPTH {
            return Err(Error::RecursionLimit);
        }

        Ok(())
    }

    #[inline]
    pub fn ascent(&mut self) {
        self.depth -= 1;
    }
}
