use sentvec::{Encoder, Error, SentenceEncoder};
use std::process::ExitCode;

fn main() -> Result<ExitCode, Error> {
    let sentences: Vec<String> = [
        "The cat sits outside",
        "A man is playing guitar",
        "I love pasta",
        "The new movie is awesome",
        "The cat plays in the garden",
        "A woman watches TV",
        "The new movie is so great",
        "Do you like pizza?",
        "The cat sits",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    let encoder = SentenceEncoder::builder()
        .with_model_repo("sentence-transformers/all-MiniLM-L6-v2")?
        .with_normalize(true)
        .build()?;

    let embeddings = encoder.embed(&sentences)?;
    println!(
        "Encoded {} sentences into {} dimensions",
        embeddings.len(),
        encoder.dimension()
    );

    // Vectors are unit length, so the dot product is the cosine similarity.
    let mut similarities = Vec::with_capacity(sentences.len() * (sentences.len() - 1) / 2);
    for i in 0..embeddings.len() {
        for j in (i + 1)..embeddings.len() {
            let score: f32 = embeddings[i]
                .iter()
                .zip(&embeddings[j])
                .map(|(a, b)| a * b)
                .sum();
            similarities.push((score, i, j))
        }
    }

    similarities.sort_by(|u, v| v.0.total_cmp(&u.0));
    for &(score, i, j) in similarities.iter().take(5) {
        println!("score: {score:.2} '{}' '{}'", sentences[i], sentences[j])
    }

    Ok(ExitCode::SUCCESS)
}
