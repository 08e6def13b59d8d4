use std::{
    fs::File,
    io::{BufRead, BufReader, Write},
    path::Path,
};

use crate::errors::{Error, Result};

/// A sentence of the training corpus with its gold tags.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TaggedSentence {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

impl TaggedSentence {
    pub fn push<W: Into<String>, T: Into<String>>(&mut self, word: W, tag: T) {
        self.words.push(word.into());
        self.tags.push(tag.into());
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.words
            .iter()
            .zip(&self.tags)
            .map(|(w, t)| (w.as_str(), t.as_str()))
    }
}

impl<W: Into<String>, T: Into<String>> FromIterator<(W, T)> for TaggedSentence {
    fn from_iter<I: IntoIterator<Item = (W, T)>>(iter: I) -> Self {
        let mut seq = TaggedSentence::default();
        for (w, t) in iter {
            seq.push(w, t);
        }
        seq
    }
}

/// A tagged corpus: `word<TAB>tag` lines, sentences separated by blank lines.
#[derive(Debug, Default, Clone)]
pub struct Dataset {
    pub seqs: Vec<TaggedSentence>,
}

impl Dataset {
    pub fn read<R: BufRead>(reader: R) -> Result<Self> {
        let mut ds = Dataset::default();
        let mut seq = TaggedSentence::default();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end();
            if line.is_empty() {
                if !seq.is_empty() {
                    ds.seqs.push(std::mem::take(&mut seq));
                }
                continue;
            }
            let mut fields = line.split('\t');
            match (fields.next(), fields.next(), fields.next()) {
                (Some(word), Some(tag), None) if !word.is_empty() && !tag.is_empty() => {
                    seq.push(word, tag)
                }
                _ => {
                    return Err(Error::invalid_format(
                        i + 1,
                        format!("expected word<TAB>tag, got {line:?}"),
                    ))
                }
            }
        }
        if !seq.is_empty() {
            ds.seqs.push(seq);
        }
        Ok(ds)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = open_file(path.as_ref())?;
        let ds = Self::read(BufReader::new(f))?;
        log::info!(
            "read {} sentences ({} tokens) from {}",
            ds.len(),
            ds.total_items(),
            path.as_ref().display()
        );
        Ok(ds)
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn max_length(&self) -> usize {
        self.seqs.iter().map(|x| x.len()).max().unwrap_or_default()
    }

    pub fn total_items(&self) -> usize {
        self.seqs.iter().map(|x| x.len()).sum()
    }
}

impl TryFrom<File> for Dataset {
    type Error = Error;

    fn try_from(value: File) -> Result<Self> {
        Self::read(BufReader::new(value))
    }
}

/// Opens `path` for reading; the error carries the path.
pub fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Creates (or truncates) `path`; the error carries the path.
pub fn create_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads untagged text: one token per line, sentences separated by blank lines.
pub fn read_sentences<R: BufRead>(reader: R) -> Result<Vec<Vec<String>>> {
    let mut sentences = Vec::new();
    let mut sentence = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let token = line.trim_end();
        if token.contains('\t') {
            return Err(Error::invalid_format(
                i + 1,
                format!("expected one untagged token, got {line:?}"),
            ));
        }
        if token.is_empty() {
            if !sentence.is_empty() {
                sentences.push(std::mem::take(&mut sentence));
            }
        } else {
            sentence.push(token.to_string());
        }
    }
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
    Ok(sentences)
}

/// Writes one tagged sentence followed by a blank line.
pub fn write_tagged<W: Write>(writer: &mut W, tokens: &[(String, String)]) -> Result<()> {
    for (word, tag) in tokens {
        writeln!(writer, "{word}\t{tag}")?;
    }
    writeln!(writer)?;
    Ok(())
}
