use std::{io::ErrorKind, path::PathBuf};

use crate::{config, error::Result, types::Token};

/// On-disk cache for the OAuth credential.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl Default for TokenStore {
    fn default() -> Self {
        TokenStore::new(config::TOKEN_FILE)
    }
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenStore { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Reads the cached token. A missing file means "no token"; a file that
    /// exists but cannot be read or parsed is an error.
    pub async fn load(&self) -> Result<Option<Token>> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let token: Token = serde_json::from_str(&content)?;
        Ok(Some(token))
    }

    /// Writes the token as indented JSON, replacing any previous file.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Io`] when the file cannot be written.
    ///
    /// [`AppError::Io`]: crate::AppError::Io
    pub async fn save(&self, token: &Token) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(token)?;
        async_fs::write(&self.path, json).await?;
        tracing::debug!(path = %self.path.display(), "token saved");
        Ok(())
    }
}
