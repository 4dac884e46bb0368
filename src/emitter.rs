use std::io::{self, Write};

/// Writes one yaw rate per line and flushes it straight away so a
/// downstream reader sees every step without delay.
#[derive(Debug)]
pub struct Emitter<W: Write> {
    writer: W,
    lines_written: u64,
}

impl<W: Write> Emitter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            lines_written: 0,
        }
    }

    pub fn emit(&mut self, yaw_rate: f64) -> io::Result<()> {
        writeln!(self.writer, "{:.6}", yaw_rate)?;
        self.writer.flush()?;
        self.lines_written += 1;
        Ok(())
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
