use log::warn;
use std::io::{self, BufRead, StdinLock};
use waypoint_nav::ManualInput;

/// Reads one `a0 a1` pair per tick from a line-oriented source.
///
/// Lines that do not parse and the end of the input read as `(0, 0)`.
pub struct LineInput<R> {
    reader: R,
    buf: String,
}

impl LineInput<StdinLock<'static>> {
    /// Reads from the standard input.
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> LineInput<R> {
    /// Reads from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
        }
    }
}

fn parse_axes(line: &str) -> Option<[f32; 2]> {
    let mut it = line.split_whitespace().map(str::parse::<f32>);
    match (it.next(), it.next(), it.next()) {
        (Some(Ok(a0)), Some(Ok(a1)), None) => Some([a0, a1]),
        _ => None,
    }
}

impl<R: BufRead> ManualInput for LineInput<R> {
    fn read_axes(&mut self) -> [f32; 2] {
        self.buf.clear();
        match self.reader.read_line(&mut self.buf) {
            Ok(0) => [0.0, 0.0],
            Ok(_) => parse_axes(&self.buf).unwrap_or_else(|| {
                warn!("Expected 'a0 a1', got '{}'", self.buf.trim_end());
                [0.0, 0.0]
            }),
            Err(e) => {
                warn!("Failed to read input: {}", e);
                [0.0, 0.0]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_pairs_per_line() {
        let mut input = LineInput::new(Cursor::new("1 0\n  -0.5\t0.25 \nfoo\n1 2 3\n"));
        assert_eq!(input.read_axes(), [1.0, 0.0]);
        assert_eq!(input.read_axes(), [-0.5, 0.25]);
        assert_eq!(input.read_axes(), [0.0, 0.0]);
        assert_eq!(input.read_axes(), [0.0, 0.0]);
        // End of input.
        assert_eq!(input.read_axes(), [0.0, 0.0]);
    }
}
