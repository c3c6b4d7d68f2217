//! Word vector table used by the semantic profile scorer.
//!
//! Loaded once at startup from a GloVe / word2vec text file, or built as a
//! deterministic hashed sub-word embedding when no file is configured. The
//! table is read-only after construction and shared behind an `Arc`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::info;

/// Matches the width of small pretrained English pipelines.
pub const DEFAULT_HASHED_DIM: usize = 96;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Error)]
pub enum WordVectorError {
    #[error("I/O error reading word vectors: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: expected {expected} dimensions, found {found}")]
    DimensionMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("word vector file contains no vectors")]
    Empty,

    #[error("vector dimension must be greater than zero")]
    ZeroDimension,
}

#[derive(Debug, Clone)]
pub struct WordVectors {
    dim: usize,
    table: HashMap<String, Vec<f32>>,
    /// Out-of-vocabulary tokens get a hashed sub-word vector instead of none.
    hash_oov: bool,
}

impl WordVectors {
    /// Empty table where every token is embedded from its character trigrams.
    pub fn hashed(dim: usize) -> Result<Self, WordVectorError> {
        if dim == 0 {
            return Err(WordVectorError::ZeroDimension);
        }
        Ok(Self {
            dim,
            table: HashMap::new(),
            hash_oov: true,
        })
    }

    pub fn load(path: &Path) -> Result<Self, WordVectorError> {
        let file = File::open(path)?;
        let vectors = Self::from_reader(BufReader::new(file))?;
        info!(
            "Loaded {} word vectors ({} dims) from {}",
            vectors.len(),
            vectors.dim,
            path.display()
        );
        Ok(vectors)
    }

    /// Parses `word v1 v2 ...` lines. An optional word2vec `count dim` header
    /// line is skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, WordVectorError> {
        let mut table = HashMap::new();
        let mut dim: Option<usize> = None;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = index + 1;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let values: Vec<&str> = parts.collect();

            if index == 0
                && values.len() == 1
                && word.parse::<usize>().is_ok()
                && values[0].parse::<usize>().is_ok()
            {
                continue;
            }

            let vector = values
                .iter()
                .map(|v| v.parse::<f32>())
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| WordVectorError::Parse {
                    line: line_no,
                    message: format!("invalid component for '{word}': {e}"),
                })?;

            match dim {
                None if vector.is_empty() => {
                    return Err(WordVectorError::Parse {
                        line: line_no,
                        message: format!("no components for '{word}'"),
                    })
                }
                None => dim = Some(vector.len()),
                Some(expected) if expected != vector.len() => {
                    return Err(WordVectorError::DimensionMismatch {
                        line: line_no,
                        expected,
                        found: vector.len(),
                    })
                }
                Some(_) => {}
            }

            table.insert(word.to_lowercase(), vector);
        }

        let dim = dim.ok_or(WordVectorError::Empty)?;
        Ok(Self {
            dim,
            table,
            hash_oov: false,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// True for the file-less table built by [`WordVectors::hashed`].
    pub fn is_hashed(&self) -> bool {
        self.hash_oov
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Vector for a lower-cased token, if it has one.
    pub fn vector(&self, token: &str) -> Option<Cow<'_, [f32]>> {
        if let Some(v) = self.table.get(token) {
            return Some(Cow::Borrowed(v.as_slice()));
        }
        if self.hash_oov && !token.is_empty() {
            return Some(Cow::Owned(hashed_vector(token, self.dim)));
        }
        None
    }
}

/// Sum of pseudo-random vectors for the token and its boundary-marked trigrams.
fn hashed_vector(token: &str, dim: usize) -> Vec<f32> {
    let marked: Vec<char> = format!("<{token}>").chars().collect();
    let mut out = vec![0.0_f32; dim];

    add_seeded(&mut out, fnv1a(token.as_bytes()));
    for gram in marked.windows(3) {
        let gram: String = gram.iter().collect();
        add_seeded(&mut out, fnv1a(gram.as_bytes()));
    }
    out
}

fn add_seeded(out: &mut [f32], seed: u64) {
    let mut state = seed;
    for slot in out.iter_mut() {
        state = splitmix64(state);
        // top 24 bits → [-1, 1)
        let unit = (state >> 40) as f32 / (1u64 << 24) as f32;
        *slot += unit * 2.0 - 1.0;
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
