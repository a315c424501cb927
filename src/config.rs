use crate::cli::Args;
use crate::error::Result;

/// Runtime configuration derived from CLI arguments
#[derive(Clone, Debug)]
pub struct Config {
    pub memory_size: usize,
    pub hash_size: usize,
    pub command_file: String,
    pub output_file: Option<String>,
    pub verbosity: u8,
}

impl Config {
    /// Build configuration from parsed CLI arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        Ok(Config {
            memory_size: args.memory_size()?,
            hash_size: args.hash_size()?,
            command_file: args.command_file.clone(),
            output_file: args.output.clone(),
            verbosity: args.verbose,
        })
    }

    /// Whether commands come from stdin
    pub fn reads_stdin(&self) -> bool {
        self.command_file == "-"
    }
}
