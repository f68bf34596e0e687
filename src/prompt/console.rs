use std::io::{self, BufRead, BufReader, Stderr, Stdin, Stdout, Write};

use crate::error::PimError;

/// Line-oriented prompt/response channel.
pub trait Console {
    /// Write one line of output.
    fn say(&mut self, line: &str);

    /// Write `message` without a newline and read one line of input,
    /// returned without its line terminator. End of input is fatal.
    fn prompt(&mut self, message: &str) -> Result<String, PimError>;
}

/// Console over any reader/writer pair; `LineConsole::stdio()` for the
/// terminal, `LineConsole::stderr()` when stdout carries a JSON document,
/// in-memory buffers for scripted sessions.
pub struct LineConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl LineConsole<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl LineConsole<BufReader<Stdin>, Stderr> {
    pub fn stderr() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R: BufRead, W: Write> Console for LineConsole<R, W> {
    fn say(&mut self, line: &str) {
        // A broken writer is reported by the next prompt, which writes to
        // the same stream and propagates.
        let _ = writeln!(self.output, "{}", line);
    }

    fn prompt(&mut self, message: &str) -> Result<String, PimError> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PimError::InputClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl<R: BufRead> LineConsole<R, Vec<u8>> {
    /// Everything written so far, for scripted sessions.
    pub fn transcript(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}
