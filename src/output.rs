use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::config::Config;

/// Open the report sink: the output file if given, stdout otherwise
pub fn open_output(config: &Config) -> io::Result<BufWriter<Box<dyn Write>>> {
    let sink: Box<dyn Write> = match &config.output_file {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };
    Ok(BufWriter::new(sink))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(output_file: Option<String>) -> Config {
        Config {
            memory_size: 16,
            hash_size: 4,
            command_file: "-".to_string(),
            output_file,
            verbosity: 0,
        }
    }

    #[test]
    fn test_writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        let config = test_config(Some(path.to_string_lossy().into_owned()));

        let mut out = open_output(&config).unwrap();
        writeln!(out, "Freeblock List:").unwrap();
        out.flush().unwrap();
        drop(out);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Freeblock List:\n");
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.txt");
        let config = test_config(Some(path.to_string_lossy().into_owned()));
        assert!(open_output(&config).is_err());
    }
}
