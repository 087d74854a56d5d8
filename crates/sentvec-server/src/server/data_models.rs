use sentvec::Embedding;
use serde::{Deserialize, Serialize};

use crate::server::ServerError;

/// One input string with its embedding.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct EncodedSentence {
    pub vector: Embedding,
    pub string: String,
}

impl EncodedSentence {
    /// Pair each sentence with the vector at the same position.
    pub fn zip(
        sentences: Vec<String>,
        vectors: Vec<Embedding>,
    ) -> Result<Vec<EncodedSentence>, ServerError> {
        if sentences.len() != vectors.len() {
            return Err(ServerError::ShapeMismatch {
                expected: sentences.len(),
                actual: vectors.len(),
            });
        }

        Ok(vectors
            .into_iter()
            .zip(sentences)
            .map(|(vector, string)| EncodedSentence { vector, string })
            .collect())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ModelCard {
    pub id: String,
    pub object: String,
    pub dimension: usize,
}

impl ModelCard {
    pub fn new(id: impl Into<String>, dimension: usize) -> Self {
        Self {
            id: id.into(),
            object: "model".to_string(),
            dimension,
        }
    }
}
