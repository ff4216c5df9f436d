//! Newline-terminated line splitting.

/// Lazily yields the `\n`-terminated lines of a text, each with trailing
/// whitespace removed. Leading whitespace is kept since indentation carries
/// structure in the formats read downstream.
///
/// A trailing fragment without a final `\n` is not yielded.
///
/// ```
/// use lockgraph::tokenizer::LineSplitter;
///
/// let lines: Vec<_> = LineSplitter::new("a:\n  b: 1  \r\nunterminated").collect();
/// assert_eq!(lines, ["a:", "  b: 1"]);
/// ```
#[derive(Debug, Clone)]
pub struct LineSplitter<'a> {
    rest: &'a str,
}

impl<'a> LineSplitter<'a> {
    /// Creates a splitter over `input`.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { rest: input }
    }
}

impl<'a> Iterator for LineSplitter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.rest.find('\n')?;
        let line = &self.rest[..end];
        self.rest = &self.rest[end + 1..];
        Some(line.trim_end())
    }
}
