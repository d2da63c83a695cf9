use crate::span::Span;

/// One whitespace-delimited word of a command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Word<'src> {
    pub text: &'src str,
    pub span: Span,
}

/// A non-blank, comment-stripped source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line<'src> {
    pub words: Vec<Word<'src>>,
    /// Covers the first word through the last.
    pub span: Span,
}

/// Splits VM source into command lines.
///
/// Blank lines and comment-only lines are skipped; a `//` anywhere on a
/// line starts a comment that runs to the end of it.
pub struct Lexer<'src> {
    source: &'src str,
    pos: usize,
    line: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 0,
        }
    }

    fn scan_line(&self, start: usize, end: usize) -> Vec<Word<'src>> {
        let bytes = self.source.as_bytes();
        let mut end = end;
        if let Some(at) = self.source[start..end].find("//") {
            end = start + at;
        }

        let mut words = Vec::new();
        let mut pos = start;
        while pos < end {
            while pos < end && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            let word_start = pos;
            while pos < end && !bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos > word_start {
                words.push(Word {
                    text: &self.source[word_start..pos],
                    span: Span::new(self.line, word_start as u32, pos as u32),
                });
            }
        }
        words
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Line<'src>;

    fn next(&mut self) -> Option<Line<'src>> {
        while self.pos < self.source.len() {
            let start = self.pos;
            let end = match self.source[start..].find('\n') {
                Some(at) => start + at,
                None => self.source.len(),
            };
            self.pos = end + 1;
            self.line += 1;

            let words = self.scan_line(start, end);
            if let (Some(first), Some(last)) = (words.first(), words.last()) {
                let span = Span::new(self.line, first.span.start, last.span.end);
                return Some(Line { words, span });
            }
        }
        None
    }
}
