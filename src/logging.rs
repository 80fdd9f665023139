use std::fmt::Display;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Target};
use log::{LevelFilter, Record};

/// `-v` count to level: none → error, `-v` → warn, `-vv` → info, more → debug.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Error,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Copies every log entry to stderr and, when configured, a log file.
struct Tee {
    file: Option<File>,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

/// One log entry: `<timestamp> <LEVEL> [<module>] <message>`.
fn write_entry(out: &mut impl Write, timestamp: impl Display, record: &Record) -> io::Result<()> {
    writeln!(
        out,
        "{} {} [{}] {}",
        timestamp,
        record.level(),
        record.module_path().unwrap_or_else(|| record.target()),
        record.args()
    )
}

/// Install the global logger.
///
/// Entries read `<timestamp> <LEVEL> [<module>] <message>`. `RUST_LOG`, when
/// set, overrides the verbosity-derived level. A log file is truncated first.
pub fn init_logging(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
    let file = log_file
        .map(|path| {
            File::create(path).with_context(|| format!("creating log file {}", path.display()))
        })
        .transpose()?;

    Builder::new()
        .filter_level(level_for_verbosity(verbosity))
        .parse_default_env()
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            write_entry(buf, timestamp, record)
        })
        .target(Target::Pipe(Box::new(Tee { file })))
        .try_init()
        .context("installing logger")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for_verbosity(0), LevelFilter::Error);
        assert_eq!(level_for_verbosity(1), LevelFilter::Warn);
        assert_eq!(level_for_verbosity(2), LevelFilter::Info);
        assert_eq!(level_for_verbosity(3), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(9), LevelFilter::Debug);
    }

    #[test]
    fn entries_carry_timestamp_level_module_and_message() {
        let mut out = Vec::new();
        write_entry(
            &mut out,
            "2026-10-16T09:30:00Z",
            &Record::builder()
                .args(format_args!("Verified damping"))
                .level(log::Level::Info)
                .target("verify")
                .module_path(Some("ccqo::verify"))
                .build(),
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "2026-10-16T09:30:00Z INFO [ccqo::verify] Verified damping\n"
        );
    }

    #[test]
    fn entries_fall_back_to_the_target() {
        let mut out = Vec::new();
        write_entry(
            &mut out,
            "t",
            &Record::builder()
                .args(format_args!("x"))
                .level(log::Level::Warn)
                .target("ccqo")
                .build(),
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "t WARN [ccqo] x\n");
    }

    #[test]
    fn tee_writes_through_to_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let mut tee = Tee {
            file: Some(File::create(&path).unwrap()),
        };
        tee.write_all(b"entry\n").unwrap();
        tee.flush().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "entry\n");
    }
}
