//! Line-oriented script writer

use std::fmt::Display;
use std::io::{self, Write};

/// One indent level
pub const INDENT: &str = "    ";

/// Indent of wrapped continuation lines
pub const CONTINUATION: &str = "        ";

/// Writes Python source line by line
pub struct ScriptWriter<W: Write> {
    out: W,
    indent: usize,
}

impl<W: Write> ScriptWriter<W> {
    /// Wrap an output sink
    pub fn new(out: W) -> Self {
        Self { out, indent: 0 }
    }

    /// Increase the indent of following lines
    pub fn indent(&mut self) {
        self.indent += 1;
    }

    /// Decrease the indent of following lines
    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write one line at the current indent
    pub fn line(&mut self, text: impl Display) -> io::Result<()> {
        self.write_indent()?;
        writeln!(self.out, "{}", text)
    }

    /// Write an empty line
    pub fn blank(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    /// Write a `# ...` comment, one comment line per line of `text`
    ///
    /// Line breaks inside `text` never end the comment.
    pub fn comment(&mut self, text: impl Display) -> io::Result<()> {
        let text = text.to_string().replace("\r\n", "\n");
        for segment in text.split(|c: char| c == '\n' || c == '\r') {
            self.write_indent()?;
            if segment.is_empty() {
                writeln!(self.out, "#")?;
            } else {
                writeln!(self.out, "# {}", segment)?;
            }
        }
        Ok(())
    }

    /// Write `target = value`
    pub fn assign(&mut self, target: impl Display, value: impl Display) -> io::Result<()> {
        self.write_indent()?;
        writeln!(self.out, "{} = {}", target, value)
    }

    /// Write `target = [a, b, ...]`, breaking the line every `limit` elements
    pub fn assign_list<I, T>(&mut self, target: impl Display, items: I, limit: usize) -> io::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        self.write_indent()?;
        write!(self.out, "{} = ", target)?;
        self.write_list(items, limit)?;
        writeln!(self.out)
    }

    /// Write `[a, b, ...]` without a trailing newline
    pub fn write_list<I, T>(&mut self, items: I, limit: usize) -> io::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        self.out.write_all(b"[")?;
        for (k, item) in items.into_iter().enumerate() {
            if k > 0 {
                if limit > 0 && k % limit == 0 {
                    write!(self.out, ",\n{}", CONTINUATION)?;
                } else {
                    self.out.write_all(b", ")?;
                }
            }
            write!(self.out, "{}", item)?;
        }
        self.out.write_all(b"]")
    }

    /// Write raw text with no indent or newline
    pub fn raw(&mut self, text: impl Display) -> io::Result<()> {
        write!(self.out, "{}", text)
    }

    /// Flush and return the sink
    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_indent(&mut self) -> io::Result<()> {
        for _ in 0..self.indent {
            self.out.write_all(INDENT.as_bytes())?;
        }
        Ok(())
    }
}
