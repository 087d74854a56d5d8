use candle_core::Tensor;

use crate::{Error, Result};

const DEFAULT_REVISION: &str = "main";

pub fn normalize_l2(v: &Tensor) -> candle_core::Result<Tensor> {
    v.broadcast_div(&v.sqr()?.sum_keepdim(1)?.sqrt()?)
}

/// Split a `<repo>[:<revision>]` string into the repository id and revision.
///
/// A missing or empty revision resolves to `main`.
pub fn parse_repo_string(repo_string: &str) -> Result<(&str, &str)> {
    if repo_string.is_empty() {
        return Err(Error::InvalidRepoString("Model repository string is empty"));
    }

    const ILLEGAL_CHARS: [char; 6] = ['\\', '<', '>', '|', '?', '*'];
    if repo_string.chars().any(|c| ILLEGAL_CHARS.contains(&c)) {
        return Err(Error::InvalidRepoString(
            "Model repository string contains illegal characters",
        ));
    }

    let (repo_id, revision) = match repo_string.split_once(':') {
        Some((repo_id, revision)) if !revision.is_empty() => (repo_id, revision),
        Some((repo_id, _)) => (repo_id, DEFAULT_REVISION),
        None => (repo_string, DEFAULT_REVISION),
    };

    if repo_id.is_empty() {
        return Err(Error::InvalidRepoString("Model repository id is empty"));
    }

    Ok((repo_id, revision))
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use candle_core::Device;

    #[test]
    fn test_parse_repo_string() -> Result<()> {
        let (repo_id, revision) =
            parse_repo_string("sentence-transformers/all-MiniLM-L6-v2:refs/pr/21")?;
        assert_eq!(repo_id, "sentence-transformers/all-MiniLM-L6-v2");
        assert_eq!(revision, "refs/pr/21");

        let (repo_id, revision) = parse_repo_string("sentence-transformers/all-MiniLM-L6-v2")?;
        assert_eq!(repo_id, "sentence-transformers/all-MiniLM-L6-v2");
        assert_eq!(revision, "main");

        let (repo_id, revision) = parse_repo_string("sentence-transformers/all-MiniLM-L6-v2:")?;
        assert_eq!(repo_id, "sentence-transformers/all-MiniLM-L6-v2");
        assert_eq!(revision, "main");

        Ok(())
    }

    #[test]
    fn test_parse_repo_string_rejects_bad_input() {
        assert!(parse_repo_string("").is_err());
        assert!(parse_repo_string(":main").is_err());
        assert!(parse_repo_string("jinaai/jina-embeddings-v2-base-en*").is_err());
        assert!(parse_repo_string("some<repo>").is_err());
    }

    #[test]
    fn test_normalize_l2() -> Result<()> {
        let v = Tensor::new(&[[3f32, 4.], [0., 2.]], &Device::Cpu)?;
        let normalized = normalize_l2(&v)?.to_vec2::<f32>()?;

        assert_relative_eq!(normalized[0][0], 0.6, epsilon = 1e-6);
        assert_relative_eq!(normalized[0][1], 0.8, epsilon = 1e-6);
        assert_relative_eq!(normalized[1][0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(normalized[1][1], 1.0, epsilon = 1e-6);

        Ok(())
    }
}
