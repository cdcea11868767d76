use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{EmbeddingError, EmbeddingService, cosine_similarity, mean_vector};

/// In-memory word vectors read from a word2vec text-format model.
///
/// The first line holds `<count> <dimensions>`; each following line holds a
/// word and its values separated by spaces. Invalid UTF-8 in words is
/// replaced rather than rejected.
#[derive(Debug, Clone, Default)]
pub struct WordVectors {
    dimensions: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl WordVectors {
    /// Loads a model from disk.
    pub fn load(path: &Path) -> Result<Self, EmbeddingError> {
        let file = File::open(path).map_err(|source| EmbeddingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let vectors = Self::from_reader(BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            words = vectors.len(),
            dimensions = vectors.dimensions(),
            "loaded word vectors"
        );
        Ok(vectors)
    }

    /// Reads a model from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, EmbeddingError> {
        let mut lines = reader.split(b'\n').enumerate();

        let (count, dimensions) = match lines.next() {
            Some((_, header)) => parse_header(&read_line(header, 1)?)?,
            None => {
                return Err(EmbeddingError::Parse {
                    line: 1,
                    reason: "missing `<count> <dimensions>` header".to_string(),
                });
            }
        };

        let mut vectors = HashMap::with_capacity(count);
        for (index, line) in lines {
            let line_no = index + 1;
            let line = read_line(line, line_no)?;
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let values = fields
                .map(str::parse::<f32>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| EmbeddingError::Parse {
                    line: line_no,
                    reason: e.to_string(),
                })?;
            if values.len() != dimensions {
                return Err(EmbeddingError::Parse {
                    line: line_no,
                    reason: format!("expected {dimensions} values, found {}", values.len()),
                });
            }
            vectors.insert(word.to_string(), values);
        }

        if vectors.len() != count {
            tracing::warn!(
                declared = count,
                found = vectors.len(),
                "word vector count differs from header"
            );
        }

        Ok(Self {
            dimensions,
            vectors,
        })
    }

    /// Builds a model from explicit vectors.
    pub fn from_vectors(
        dimensions: usize,
        vectors: impl IntoIterator<Item = (String, Vec<f32>)>,
    ) -> Self {
        Self {
            dimensions,
            vectors: vectors.into_iter().collect(),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn vector(&self, word: &str) -> Option<&[f32]> {
        self.vectors.get(word).map(Vec::as_slice)
    }

    fn mean(&self, tokens: &[String]) -> Option<Vec<f32>> {
        mean_vector(tokens.iter().filter_map(|token| self.vector(token)))
    }
}

impl EmbeddingService for WordVectors {
    fn contains(&self, token: &str) -> bool {
        self.vectors.contains_key(token)
    }

    /// Unknown tokens are left out of the mean; a side with no known token
    /// scores `0.0`.
    fn n_similarity(&self, a: &[String], b: &[String]) -> Result<f64, EmbeddingError> {
        match (self.mean(a), self.mean(b)) {
            (Some(a), Some(b)) => Ok(cosine_similarity(&a, &b)),
            _ => Ok(0.0),
        }
    }
}

fn read_line(line: std::io::Result<Vec<u8>>, line_no: usize) -> Result<String, EmbeddingError> {
    let bytes = line.map_err(|e| EmbeddingError::Parse {
        line: line_no,
        reason: e.to_string(),
    })?;
    Ok(decode_dropping_invalid(&bytes))
}

/// Decodes UTF-8, silently dropping invalid byte sequences.
fn decode_dropping_invalid(mut bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                text.push_str(valid);
                return text;
            }
            Err(error) => {
                let (valid, rest) = bytes.split_at(error.valid_up_to());
                text.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match error.error_len() {
                    Some(len) => bytes = &rest[len..],
                    None => return text,
                }
            }
        }
    }
}

fn parse_header(header: &str) -> Result<(usize, usize), EmbeddingError> {
    let invalid = || EmbeddingError::Parse {
        line: 1,
        reason: format!("invalid header `{}`", header.trim()),
    };
    let mut fields = header.split_whitespace().map(str::parse::<usize>);
    match (fields.next(), fields.next(), fields.next()) {
        (Some(Ok(count)), Some(Ok(dimensions)), None) if dimensions > 0 => Ok((count, dimensions)),
        _ => Err(invalid()),
    }
}
