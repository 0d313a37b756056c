//! Text sink with explicit indentation control.

use std::sync::Mutex;

use crate::error::GenResult;

/// External text sink contract: generated code is written line by line with
/// explicit indent/dedent operations.
pub trait IndentedWriter
{
    /// Write one line at the current indentation. An empty string produces a
    /// bare newline.
    fn write_line(&mut self, line: &str) -> GenResult<()>;

    fn indent(&mut self);

    fn dedent(&mut self);
}

/// In-memory `IndentedWriter` producing a `String` buffer.
#[derive(Debug, Default)]
pub struct TextWriter
{
    buffer: String,
    depth: usize,
}

const INDENT: &str = "    ";

impl TextWriter
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Reuse a pooled buffer as the backing storage.
    #[must_use]
    pub fn with_buffer(buffer: String) -> Self
    {
        Self { buffer, depth: 0 }
    }

    #[must_use]
    pub fn into_buffer(self) -> String
    {
        self.buffer
    }
}

impl IndentedWriter for TextWriter
{
    fn write_line(&mut self, line: &str) -> GenResult<()>
    {
        if !line.is_empty() {
            for _ in 0..self.depth {
                self.buffer.push_str(INDENT);
            }
            self.buffer.push_str(line);
        }
        self.buffer.push('\n');
        Ok(())
    }

    fn indent(&mut self)
    {
        self.depth += 1;
    }

    fn dedent(&mut self)
    {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Take/return pool for per-worker scratch buffers.
///
/// Falls back to a fresh allocation when empty; unbounded, so its size is
/// capped in practice by the number of workers that ever held a buffer at
/// the same time.
#[derive(Debug, Default)]
pub struct BufferPool
{
    buffers: Mutex<Vec<String>>,
}

impl BufferPool
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn take(&self) -> String
    {
        self.buffers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop()
            .unwrap_or_default()
    }

    pub fn give(&self, mut buffer: String)
    {
        buffer.clear();
        self.buffers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(buffer);
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_text_writer_indentation()
    {
        let mut writer = TextWriter::new();
        writer.write_line("a").unwrap();
        writer.indent();
        writer.write_line("b").unwrap();
        writer.write_line("").unwrap();
        writer.dedent();
        writer.write_line("c").unwrap();
        assert_eq!(writer.into_buffer(), "a\n    b\n\nc\n");
    }

    #[test]
    fn test_dedent_saturates()
    {
        let mut writer = TextWriter::new();
        writer.dedent();
        writer.write_line("x").unwrap();
        assert_eq!(writer.into_buffer(), "x\n");
    }

    #[test]
    fn test_buffer_pool_reuses()
    {
        let pool = BufferPool::new();
        let mut first = pool.take();
        first.push_str("scratch");
        pool.give(first);
        let second = pool.take();
        assert!(second.is_empty());
        assert!(second.capacity() >= "scratch".len());
    }
}
