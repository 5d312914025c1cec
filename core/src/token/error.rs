use std::fmt;

/// A location in a source file.
///
/// `line` is zero-based, `column` counts UTF-16 code units from the start of
/// the line (the unit editors report positions in) and `offset` is the byte
/// offset into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self { line, column, offset }
    }

    pub fn start() -> Self {
        Self {
            line: 0,
            column: 0,
            offset: 0,
        }
    }

    /// Orders two positions by line, then column.
    pub fn cmp_line_col(&self, line: u32, column: u32) -> std::cmp::Ordering {
        (self.line, self.column).cmp(&(line, column))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Half-open source range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn single(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Span {
        let start = if self.start.offset <= other.start.offset {
            self.start
        } else {
            other.start
        };
        let end = if self.end.offset >= other.end.offset {
            self.end
        } else {
            other.end
        };
        Span { start, end }
    }

    /// True when `(line, column)` lies inside the span; the end is exclusive.
    pub fn contains(&self, line: u32, column: u32) -> bool {
        use std::cmp::Ordering;
        self.start.cmp_line_col(line, column) != Ordering::Greater
            && self.end.cmp_line_col(line, column) == Ordering::Greater
    }

    pub fn contains_span(&self, other: &Span) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }

    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}:{}-{}", self.start.line + 1, self.start.column + 1, self.end.column + 1)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Syntax error with the span of the offending input.
///
/// Parse errors never abort a parse: the parser records them next to the
/// `ErrorNode` that replaced the malformed region.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    pub fn with_position(message: impl Into<String>, position: Position) -> Self {
        Self::new(message, Span::single(position))
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

impl std::error::Error for ParseError {}

/// Convert a byte offset into a position (zero-based line, UTF-16 column).
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    let mut line = 0;
    let mut column = 0;

    for (i, ch) in text.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += ch.len_utf16() as u32;
        }
    }

    Position::new(line, column, offset.min(text.len()))
}

/// Convert a zero-based line and UTF-16 column into a byte offset, clamped to the line end.
pub fn position_to_offset(text: &str, line: u32, column: u32) -> usize {
    let mut offset = 0usize;
    for (idx, l) in text.split_inclusive('\n').enumerate() {
        if idx as u32 == line {
            let mut seen = 0u32;
            for (i, ch) in l.char_indices() {
                if seen >= column || ch == '\n' || ch == '\r' {
                    return offset + i;
                }
                seen += ch.len_utf16() as u32;
            }
            return offset + l.trim_end_matches(['\n', '\r']).len();
        }
        offset += l.len();
    }
    text.len()
}
