use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use async_trait::async_trait;
use super::AccountRepository;
use crate::model::account::Account;
use crate::utils::errors::CredentialError;

///
/// Persists every account as a pretty-printed JSON array in a single file.
///
/// Writes go to a sibling temp file which is then renamed over the original, so a crash part-way
/// through a save leaves the previous file intact.
///
#[derive(Clone, Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        JsonFileRepository { path: path.as_ref().to_path_buf() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }
}

#[async_trait]
impl AccountRepository for JsonFileRepository {
    async fn load_all(&self) -> Result<Vec<Account>, CredentialError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::info!("No accounts file at {}, starting empty", self.path.display());
                return Ok(Vec::new())
            },
            Err(err) => return Err(err.into()),
        };

        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn save_all(&self, accounts: &[Account]) -> Result<(), CredentialError> {
        let json = serde_json::to_vec_pretty(accounts)?;
        let temp = self.temp_path();

        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        tracing::debug!("Saved {} accounts to {}", accounts.len(), self.path.display());
        Ok(())
    }
}
