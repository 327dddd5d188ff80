//! Terminal console over stdin/stdout.

use std::io::{self, BufRead, Write};

use parkit_core::{Console, CoreError, CoreResult};

/// Operator terminal on the process's standard streams.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn read_line(&self) -> CoreResult<Option<String>> {
        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| CoreError::store(format!("console read failed: {}", e)))?;

        if read == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn write_line(&self, line: &str) {
        let mut out = io::stdout().lock();
        // A closed stdout leaves nothing to report to.
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }
}
