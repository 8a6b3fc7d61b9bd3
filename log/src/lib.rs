use std::sync::Mutex;

use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Green,
    Red,
    Gold,
    Gray,
}

impl Color {
    fn ansi(self) -> &'static str {
        match self {
            Color::Green => "\x1b[92m",
            Color::Red => "\x1b[91m",
            Color::Gold => "\x1b[93m",
            Color::Gray => "\x1b[37m",
        }
    }
}

const RESET: &str = "\x1b[0m";

#[macro_export]
macro_rules! notify {
    () => {};

    ($($arg:tt)*) => {{
        $crate::append(format!($($arg)*), $crate::Color::Green);
    }};
}

#[macro_export]
macro_rules! strong {
    () => {};

    ($($arg:tt)*) => {{
        $crate::append(format!($($arg)*), $crate::Color::Red);
    }};
}

#[macro_export]
macro_rules! warn {
    () => {};

    ($($arg:tt)*) => {{
        $crate::append(format!($($arg)*), $crate::Color::Gold);
    }};
}

#[macro_export]
macro_rules! trace {
    () => {};

    ($($arg:tt)*) => {{
        $crate::append(format!($($arg)*), $crate::Color::Gray);
    }};
}

pub static LOGGER: Lazy<Mutex<Logger<300>>> = Lazy::new(|| Mutex::new(Logger::new()));

/// Append a line to the global logger.
///
/// A poisoned lock only means another thread panicked mid-append, the ring buffer
/// itself is still consistent so we keep using it.
pub fn append(line: String, color: Color) {
    let mut logger = LOGGER.lock().unwrap_or_else(|err| err.into_inner());
    logger.append(line, color);
}

pub struct Logger<const N: usize> {
    lines: [(String, Color); N],
    head: usize,
    len: usize,
}

impl<const N: usize> Logger<N> {
    fn new() -> Self {
        Self {
            lines: std::array::from_fn(|_| (String::new(), Color::Gray)),
            head: 0,
            len: 0,
        }
    }

    pub fn append(&mut self, line: String, color: Color) {
        self.lines[self.head] = (line + "\n", color);
        self.head = (self.head + 1) % N;
        self.len += 1;
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn lines(&self) -> (&[(String, Color)], &[(String, Color)]) {
        if self.len < N {
            (&self.lines[0..self.len], &[])
        } else {
            // wrapped around, so we need to return two slices
            let (a, b) = self.lines.split_at(self.head);

            (b, a)
        }
    }

    /// Lines in the order they were appended, oldest first, without colors.
    pub fn lines_plain(&self) -> impl Iterator<Item = &str> {
        let (a, b) = self.lines();
        a.iter().chain(b).map(|(line, _)| line.trim_end_matches('\n'))
    }

    /// Render all buffered lines with terminal escape codes.
    pub fn format(&self) -> String {
        let mut layout = String::new();
        let lines = self.lines();

        for (line, color) in lines.0.iter().chain(lines.1) {
            layout += color.ansi();
            layout += line.trim_end_matches('\n');
            layout += RESET;
            layout.push('\n');
        }

        layout
    }
}
