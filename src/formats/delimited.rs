use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::RawRecord;
use crate::transcoder::split_fields;

/// Line-oriented reader over a delimited text file.
///
/// The first line is the header; everything after it is data.
pub struct LineSource<R: BufRead = BufReader<File>> {
    path: PathBuf,
    lines: Lines<R>,
}

impl LineSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::InvalidInput(format!("cannot open file '{}': {}", path.display(), e))
        })?;
        Ok(Self::from_reader(path, BufReader::new(file)))
    }
}

impl<R: BufRead> LineSource<R> {
    pub fn from_reader<P: AsRef<Path>>(path: P, reader: R) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: reader.lines(),
        }
    }

    /// Next line with any trailing `\r` removed, or `None` at end of file.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self.lines.next() {
            Some(Ok(mut line)) => {
                if line.ends_with('\r') {
                    line.pop();
                }
                Ok(Some(line))
            }
            Some(Err(e)) => Err(Error::InvalidInput(format!(
                "reading file '{}': {}",
                self.path.display(),
                e
            ))),
            None => Ok(None),
        }
    }

    fn require_line(&mut self) -> Result<String> {
        self.read_line()?
            .ok_or_else(|| Error::InvalidInput("file empty or too small".to_string()))
    }

    /// Consume the header line, split on `delimiter`.
    pub fn read_header(&mut self, delimiter: &str) -> Result<RawRecord> {
        Ok(split_fields(&self.require_line()?, delimiter))
    }

    /// Consume the header and the first data line. Both must exist.
    pub fn read_header_and_sample(&mut self, delimiter: &str) -> Result<(RawRecord, RawRecord)> {
        let header = self.read_header(delimiter)?;
        let sample = split_fields(&self.require_line()?, delimiter);
        Ok((header, sample))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Remaining data lines, empty ones included.
impl<R: BufRead> Iterator for LineSource<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_line().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_sample_and_rest() {
        let data = "a;b\r\n1;x\n\n2;y\n";
        let mut source = LineSource::from_reader("mem", Cursor::new(data));
        let (header, sample) = source.read_header_and_sample(";").unwrap();
        assert_eq!(header, vec!["a", "b"]);
        assert_eq!(sample, vec!["1", "x"]);

        let rest: Vec<String> = source.map(|l| l.unwrap()).collect();
        assert_eq!(rest, vec!["", "2;y"]);
    }

    #[test]
    fn test_too_small() {
        let mut source = LineSource::from_reader("mem", Cursor::new("only,header\n"));
        assert!(matches!(
            source.read_header_and_sample(","),
            Err(Error::InvalidInput(_))
        ));
    }
}
