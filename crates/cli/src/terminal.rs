use std::io::Write;

/// Prints cumulative snapshots to a line-oriented sink.
///
/// A snapshot that extends what is already printed only writes the new
/// suffix; any other snapshot starts over on a fresh line.
pub struct SnapshotPrinter<W: Write> {
    out: W,
    printed: String,
}

impl<W: Write> SnapshotPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: String::new(),
        }
    }

    pub fn show(&mut self, snapshot: &str) -> std::io::Result<()> {
        match snapshot.strip_prefix(self.printed.as_str()) {
            Some(suffix) => self.out.write_all(suffix.as_bytes())?,
            None => {
                self.out.write_all(b"\n")?;
                self.out.write_all(snapshot.as_bytes())?;
            }
        }
        self.out.flush()?;
        self.printed.clear();
        self.printed.push_str(snapshot);
        Ok(())
    }

    pub fn finish(mut self) -> std::io::Result<W> {
        if !self.printed.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}
