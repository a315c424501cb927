//! Command-file interpreter
//!
//! ```text
//! insert <id>
//! <payload line>
//! delete <id>
//! search <id>
//! print hashtable
//! print blocks
//! ```

use std::io::{self, BufRead, Write};

use bstr::ByteSlice;
use tracing::{debug, warn};

use crate::error::Result;
use crate::input::LineReader;
use crate::store::Store;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Insert { id: i64, payload: Vec<u8> },
    Delete(i64),
    Search(i64),
    Print(Report),
    /// Unrecognised or malformed line, kept for diagnostics
    Invalid(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Report {
    Hashtable,
    FreeBlocks,
}

/// Turns a line stream into commands
pub struct CommandReader<R> {
    lines: LineReader<R>,
}

impl<R: BufRead> CommandReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: LineReader::new(reader),
        }
    }

    /// Next command, skipping blank lines; None at EOF
    pub fn next_command(&mut self) -> io::Result<Option<Command>> {
        let line = loop {
            match self.lines.next_line()? {
                None => return Ok(None),
                Some(line) if line.is_empty() => continue,
                Some(line) => break line.to_vec(),
            }
        };
        self.parse(&line).map(Some)
    }

    fn parse(&mut self, line: &[u8]) -> io::Result<Command> {
        let fields: Vec<&[u8]> = line.fields().collect();

        let command = match fields.as_slice() {
            [b"insert", rest @ ..] => {
                // The payload line belongs to this command even if the id is bad
                let payload = self.lines.next_line()?.map(<[u8]>::to_vec).unwrap_or_default();
                match rest {
                    [id] => parse_id(id).map(|id| Command::Insert { id, payload }),
                    _ => None,
                }
            }
            [b"delete", id] => parse_id(id).map(Command::Delete),
            [b"search", id] => parse_id(id).map(Command::Search),
            [b"print", rest @ ..] => Some(match rest {
                [b"hashtable"] => Command::Print(Report::Hashtable),
                _ => Command::Print(Report::FreeBlocks),
            }),
            _ => None,
        };

        Ok(command.unwrap_or_else(|| {
            warn!(line = self.lines.line_number(), "unrecognised command");
            Command::Invalid(line.to_str_lossy().into_owned())
        }))
    }
}

/// Parse a decimal record id
pub fn parse_id(text: &[u8]) -> Option<i64> {
    text.to_str().ok()?.parse().ok()
}

/// Run one command against the store
pub fn execute<W: Write>(store: &mut Store, out: &mut W, command: &Command) -> io::Result<()> {
    debug!(?command, "executing");
    match command {
        Command::Insert { id, payload } => {
            store.insert(out, *id, payload)?;
        }
        Command::Delete(id) => {
            store.delete(out, *id)?;
        }
        Command::Search(id) => {
            store.search(out, *id)?;
        }
        Command::Print(Report::Hashtable) => store.print_hashtable(out)?,
        Command::Print(Report::FreeBlocks) => store.print_free_blocks(out)?,
        Command::Invalid(_) => writeln!(out, "Invalid command")?,
    }
    Ok(())
}

/// Execute every command from `reader`, writing reports to `out`
pub fn run_commands<R: BufRead, W: Write>(store: &mut Store, reader: R, out: &mut W) -> Result<()> {
    let mut commands = CommandReader::new(reader);
    while let Some(command) = commands.next_command()? {
        execute(store, out, &command)?;
    }
    Ok(())
}
