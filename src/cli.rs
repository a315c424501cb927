use clap::{ArgAction, Parser};

use crate::error::{Result, StoreError};

#[derive(Parser, Debug, Clone)]
#[command(name = "buddydb", about = "Run a command file against a buddy-allocated record store")]
pub struct Args {
    /// Initial memory pool size in bytes (power of two)
    #[arg(value_name = "MEMORY_SIZE")]
    pub memory_size: String,

    /// Initial hash table size in slots (power of two)
    #[arg(value_name = "HASH_SIZE")]
    pub hash_size: String,

    /// Command file to execute, or - for stdin
    #[arg(value_name = "COMMAND_FILE")]
    pub command_file: String,

    /// Write the report to FILE instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn memory_size(&self) -> Result<usize> {
        parse_power_of_two("memory size", &self.memory_size)
    }

    pub fn hash_size(&self) -> Result<usize> {
        parse_power_of_two("hash size", &self.hash_size)
    }
}

/// Parse a size argument that must be a positive power of two
fn parse_power_of_two(what: &str, s: &str) -> Result<usize> {
    match s.parse::<usize>() {
        Ok(n) if n.is_power_of_two() => Ok(n),
        _ => Err(StoreError::InvalidArgument(format!(
            "{} must be a positive power of two, got '{}'",
            what, s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(memory: &str, hash: &str) -> Args {
        Args::parse_from(["buddydb", memory, hash, "commands.txt"])
    }

    #[test]
    fn test_sizes_parse() {
        let args = args("512", "4");
        assert_eq!(args.memory_size().unwrap(), 512);
        assert_eq!(args.hash_size().unwrap(), 4);
        assert_eq!(args.command_file, "commands.txt");
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_sizes_rejected() {
        assert!(args("0", "4").memory_size().is_err());
        assert!(args("100", "4").memory_size().is_err());
        assert!(args("64", "3").hash_size().is_err());
        assert!(args("64", "ten").hash_size().is_err());
    }

    #[test]
    fn test_verbosity_counts() {
        let args = Args::parse_from(["buddydb", "-vv", "8", "8", "-"]);
        assert_eq!(args.verbose, 2);
    }
}
