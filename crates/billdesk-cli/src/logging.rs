// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Routes tracing output to `path`. The terminal belongs to the dashboard,
/// so nothing is written to stdout or stderr. `RUST_LOG` wins over `level`.
pub fn init(path: &Path, level: &str) -> Result<()> {
    let file = open_log_file(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!(err))
        .with_context(|| format!("initialize logging to {}", path.display()))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].file to a writable path",
                path.display()
            )
        })
}

#[cfg(test)]
mod tests {
    use super::open_log_file;
    use anyhow::Result;
    use std::io::Write;

    #[test]
    fn log_file_parent_directories_are_created() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("billdesk.log");
        let mut file = open_log_file(&path)?;
        writeln!(file, "first")?;
        drop(file);

        let mut file = open_log_file(&path)?;
        writeln!(file, "second")?;
        drop(file);

        assert_eq!(std::fs::read_to_string(&path)?, "first\nsecond\n");
        Ok(())
    }

    #[test]
    fn directory_as_log_file_fails_with_hint() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let error = open_log_file(temp.path()).expect_err("directory is not a file");
        assert!(format!("{error:#}").contains("[log].file"));
        Ok(())
    }
}
