//! Word embedding lookup
//!
//! The noise engine only needs "give me the k nearest words of this word",
//! expressed by [`NearestNeighbors`]. [`WordVectors`] implements it over a
//! plain-text vector file in the common `.vec` layout:
//!
//! ```text
//! 4 3
//! hello 0.1 0.2 0.3
//! world 0.2 0.1 0.0
//! ...
//! ```
//!
//! The `count dim` header line is optional.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{PrepError, PrepResult};

/// Nearest-neighbor provider over some embedding space
pub trait NearestNeighbors {
    /// Up to `k` neighbors of `word` as `(score, word)`, best first.
    /// Unknown words have no neighbors.
    fn nearest_neighbors(&self, word: &str, k: usize) -> Vec<(f32, String)>;
}

/// In-memory word vectors, normalized for cosine similarity
#[derive(Debug, Clone)]
pub struct WordVectors {
    words: Vec<String>,
    vectors: Vec<Vec<f32>>,
    index: HashMap<String, usize>,
}

impl WordVectors {
    /// Load vectors from a text file
    pub fn load(path: &Path) -> PrepResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| PrepError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let vectors = Self::parse(&content)
            .map_err(|msg| PrepError::Embedding(format!("{}: {}", path.display(), msg)))?;
        info!(
            "Loaded {} word vectors from {}",
            vectors.len(),
            path.display()
        );
        Ok(vectors)
    }

    /// Parse the text vector format
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut words = Vec::new();
        let mut vectors: Vec<Vec<f32>> = Vec::new();
        let mut index = HashMap::new();
        let mut dim = None;

        for (line_no, line) in content.lines().enumerate() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if line_no == 0 && fields.len() == 2 && fields.iter().all(|f| f.parse::<usize>().is_ok())
            {
                continue;
            }

            let word = fields[0];
            let values = fields[1..]
                .iter()
                .map(|f| f.parse::<f32>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| format!("line {}: {}", line_no + 1, e))?;
            if values.is_empty() {
                return Err(format!("line {}: no vector for '{}'", line_no + 1, word));
            }
            match dim {
                None => dim = Some(values.len()),
                Some(d) if d != values.len() => {
                    return Err(format!(
                        "line {}: expected {} dimensions, got {}",
                        line_no + 1,
                        d,
                        values.len()
                    ));
                }
                Some(_) => {}
            }

            if index.contains_key(word) {
                continue;
            }
            index.insert(word.to_string(), words.len());
            words.push(word.to_string());
            vectors.push(normalized(values));
        }

        Ok(WordVectors {
            words,
            vectors,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl NearestNeighbors for WordVectors {
    fn nearest_neighbors(&self, word: &str, k: usize) -> Vec<(f32, String)> {
        let Some(&query_index) = self.index.get(word) else {
            return Vec::new();
        };
        let query = &self.vectors[query_index];

        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != query_index)
            .map(|(i, vector)| (dot(query, vector), i))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        scored
            .into_iter()
            .take(k)
            .map(|(score, i)| (score, self.words[i].clone()))
            .collect()
    }
}

fn normalized(mut values: Vec<f32>) -> Vec<f32> {
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut values {
            *v /= norm;
        }
    }
    values
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VECTORS: &str = "5 2\n\
        hello 1.0 0.0\n\
        hi 0.9 0.1\n\
        hey 0.8 0.3\n\
        world 0.0 1.0\n\
        42 0.95 0.05\n";

    #[test]
    fn test_parse_with_header() {
        let vectors = WordVectors::parse(VECTORS).unwrap();
        assert_eq!(vectors.len(), 5);
        assert!(vectors.index.contains_key("hello"));
        assert!(vectors.nearest_neighbors("5", 3).is_empty());
    }

    #[test]
    fn test_parse_without_header() {
        let vectors = WordVectors::parse("a 1 0\nb 0 1\n").unwrap();
        assert_eq!(vectors.len(), 2);
    }

    #[test]
    fn test_parse_rejects_inconsistent_dimensions() {
        let err = WordVectors::parse("a 1 0\nb 0 1 2\n").unwrap_err();
        assert!(err.contains("line 2"));
        assert!(WordVectors::parse("a x y\n").is_err());
    }

    #[test]
    fn test_nearest_neighbors_sorted_by_similarity() {
        let vectors = WordVectors::parse(VECTORS).unwrap();
        let neighbors = vectors.nearest_neighbors("hello", 3);
        let words: Vec<_> = neighbors.iter().map(|(_, w)| w.as_str()).collect();
        assert_eq!(words, vec!["42", "hi", "hey"]);
        assert!(neighbors[0].0 >= neighbors[1].0);
        assert!(neighbors[1].0 >= neighbors[2].0);
    }

    #[test]
    fn test_nearest_neighbors_excludes_query_and_unknown() {
        let vectors = WordVectors::parse(VECTORS).unwrap();
        let all = vectors.nearest_neighbors("world", 10);
        assert_eq!(all.len(), 4);
        assert!(all.iter().all(|(_, w)| w != "world"));
        assert!(vectors.nearest_neighbors("unknown", 3).is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VECTORS.as_bytes()).unwrap();
        let vectors = WordVectors::load(file.path()).unwrap();
        assert_eq!(vectors.len(), 5);

        let missing = WordVectors::load(Path::new("/nonexistent/vectors.vec"));
        assert!(matches!(missing, Err(PrepError::Io { .. })));
    }
}
