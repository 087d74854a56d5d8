//! Deterministic encoders standing in for real models in tests.

use sentvec::{Embedding, Encoder, Error, Result};
use std::thread;
use std::time::Duration;

/// Derives each vector from the bytes of its sentence, so equal strings get
/// equal vectors and the output depends only on the input.
pub(crate) struct StubEncoder {
    dimension: usize,
}

impl StubEncoder {
    pub(crate) fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn vector(&self, sentence: &str) -> Embedding {
        (0..self.dimension)
            .map(|i| {
                sentence
                    .bytes()
                    .enumerate()
                    .map(|(j, b)| f32::from(b) * ((i + j + 1) as f32))
                    .sum::<f32>()
                    + sentence.len() as f32
            })
            .collect()
    }
}

impl Encoder for StubEncoder {
    fn embed(&self, sentences: &[String]) -> Result<Vec<Embedding>> {
        Ok(sentences.iter().map(|s| self.vector(s)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Always fails, like a model that can't handle its input.
pub(crate) struct FailingEncoder;

impl Encoder for FailingEncoder {
    fn embed(&self, _sentences: &[String]) -> Result<Vec<Embedding>> {
        Err(Error::Inference("model crashed"))
    }

    fn dimension(&self) -> usize {
        8
    }
}

/// Drops the last vector of every batch.
pub(crate) struct ShortEncoder;

impl Encoder for ShortEncoder {
    fn embed(&self, sentences: &[String]) -> Result<Vec<Embedding>> {
        Ok(sentences
            .iter()
            .skip(1)
            .map(|_| vec![0.0; self.dimension()])
            .collect())
    }

    fn dimension(&self) -> usize {
        2
    }
}

/// A [`StubEncoder`] that takes its time.
pub(crate) struct SlowEncoder {
    inner: StubEncoder,
    delay: Duration,
}

impl SlowEncoder {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            inner: StubEncoder::new(4),
            delay,
        }
    }
}

impl Encoder for SlowEncoder {
    fn embed(&self, sentences: &[String]) -> Result<Vec<Embedding>> {
        thread::sleep(self.delay);
        self.inner.embed(sentences)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}
