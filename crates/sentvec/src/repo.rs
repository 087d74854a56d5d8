use hf_hub::api::sync::{Api, ApiRepo};
use hf_hub::{Repo, RepoType};
use std::path::{Path, PathBuf};

use crate::utils::parse_repo_string;
use crate::{Error, Result};

const SAFETENSORS_FILE: &str = "model.safetensors";
const PTH_FILE: &str = "pytorch_model.bin";
const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const POOLING_CONFIG_FILE: &str = "1_Pooling/config.json";

/// Where the model files live: a local folder laid out like a Hugging Face
/// repository, or a repository on the Hub.
pub enum ModelSource {
    Folder(PathBuf),
    Hub(Box<ApiRepo>),
}

impl ModelSource {
    pub fn from_path<P>(root: P) -> Self
    where
        P: AsRef<Path>,
    {
        Self::Folder(root.as_ref().to_owned())
    }

    /// Resolve a `<repo>[:<revision>]` string against the Hugging Face Hub.
    pub fn from_repo_string(repo_string: &str) -> Result<Self> {
        let (repo_id, revision) = parse_repo_string(repo_string)?;
        let repo = Repo::with_revision(repo_id.to_owned(), RepoType::Model, revision.to_owned());
        let api_repo = Api::new()?.repo(repo);

        Ok(Self::Hub(Box::new(api_repo)))
    }

    /// Get the relevant repository files.
    ///
    /// **Warning**: Hub sources download the weights into the local Hugging Face
    /// cache if they aren't there yet.
    pub(crate) fn resolve_files(&self) -> Result<ModelFiles> {
        let root = match self {
            ModelSource::Folder(root) => root.to_owned(),
            ModelSource::Hub(api_repo) => {
                let weights = api_repo
                    .get(SAFETENSORS_FILE)
                    .or_else(|_| api_repo.get(PTH_FILE))?;
                api_repo.get(CONFIG_FILE)?;
                api_repo.get(TOKENIZER_FILE)?;

                if api_repo.get(POOLING_CONFIG_FILE).is_err() {
                    tracing::info!("Repository has no pooling configuration");
                }

                weights
                    .parent()
                    .ok_or(Error::ModelLoad("Downloaded weights have no parent directory."))?
                    .to_owned()
            }
        };

        let config = root.join(CONFIG_FILE);
        let tokenizer = root.join(TOKENIZER_FILE);
        if !config.exists() || !tokenizer.exists() {
            return Err(Error::ModelLoad(
                "Repository misses `config.json` or `tokenizer.json`.",
            ));
        }

        // Safetensors get precedence over pth.
        let weights = if root.join(SAFETENSORS_FILE).exists() {
            WeightsPath::Safetensors(root.join(SAFETENSORS_FILE))
        } else if root.join(PTH_FILE).exists() {
            WeightsPath::Pth(root.join(PTH_FILE))
        } else {
            return Err(Error::ModelLoad("Repository doesn't contain model weights."));
        };

        let pooling_config = Some(root.join(POOLING_CONFIG_FILE)).filter(|p| p.exists());

        Ok(ModelFiles {
            config,
            tokenizer,
            weights,
            pooling_config,
        })
    }
}

pub(crate) struct ModelFiles {
    pub(crate) config: PathBuf,
    pub(crate) tokenizer: PathBuf,
    pub(crate) weights: WeightsPath,
    pub(crate) pooling_config: Option<PathBuf>,
}

#[derive(Debug)]
pub(crate) enum WeightsPath {
    Pth(PathBuf),
    Safetensors(PathBuf),
}
