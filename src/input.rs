use std::fs::File;
use std::io::{self, BufRead, BufReader};

use bstr::ByteSlice;

use crate::config::Config;

/// Open the command source: stdin for `-`, the named file otherwise
pub fn open_input(config: &Config) -> io::Result<Box<dyn BufRead>> {
    if config.reads_stdin() {
        Ok(Box::new(BufReader::new(io::stdin().lock())))
    } else {
        Ok(Box::new(BufReader::new(File::open(&config.command_file)?)))
    }
}

/// Reads newline-terminated lines, trimmed of surrounding whitespace
pub struct LineReader<R> {
    reader: R,
    buffer: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            line_number: 0,
        }
    }

    /// Read the next line, returning None at EOF
    ///
    /// The terminator (`\n` or `\r\n`) and any surrounding whitespace are
    /// stripped, so blank lines come back empty.
    pub fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        self.buffer.clear();
        let bytes_read = self.reader.read_until(b'\n', &mut self.buffer)?;

        if bytes_read == 0 {
            return Ok(None);
        }

        self.line_number += 1;
        Ok(Some(self.buffer.trim()))
    }

    /// Number of lines read so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}
