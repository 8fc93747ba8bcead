use directories::ProjectDirs;
use scoremark_core::MarkupStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const MARKUP_SCHEMA_VERSION: u32 = 1;
const PIECE_SUFFIX: &str = ".markup.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("invalid piece id '{0}': use letters, digits, '-' or '_'")]
    InvalidPieceId(String),
    #[error("unsupported markup schema version {0}")]
    UnsupportedVersion(u32),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Markup persisted for one piece, with the page count last reported for its score
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PieceMarkup {
    pub page_count: Option<u32>,
    pub markup: MarkupStore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkupEnvelope {
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    page_count: Option<u32>,
    markup: MarkupStore,
}

/// JSON sidecar store keyed by piece id
#[derive(Debug, Clone)]
pub struct MarkupStorage {
    root: PathBuf,
}

impl MarkupStorage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("dev", "Scoremark", "Scoremark")
            .ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load a piece's markup; a piece never saved loads as empty
    pub fn load_piece(&self, piece_id: &str) -> Result<PieceMarkup, StorageError> {
        let path = self.piece_path(piece_id)?;
        if !path.exists() {
            return Ok(PieceMarkup::default());
        }

        let bytes = fs::read(&path)?;
        let envelope: MarkupEnvelope = serde_json::from_slice(&bytes)?;
        if envelope.version != MARKUP_SCHEMA_VERSION {
            return Err(StorageError::UnsupportedVersion(envelope.version));
        }

        tracing::debug!(piece = piece_id, path = %path.display(), "loaded piece markup");
        Ok(PieceMarkup { page_count: envelope.page_count, markup: envelope.markup })
    }

    /// Write a piece's markup atomically via a temp file and rename
    pub fn save_piece(&self, piece_id: &str, piece: &PieceMarkup) -> Result<PathBuf, StorageError> {
        let path = self.piece_path(piece_id)?;
        fs::create_dir_all(self.pieces_dir())?;

        let envelope = MarkupEnvelope {
            version: MARKUP_SCHEMA_VERSION,
            page_count: piece.page_count,
            markup: piece.markup.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&envelope)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!(piece = piece_id, path = %path.display(), "saved piece markup");
        Ok(path)
    }

    /// Remove a piece's markup. Returns whether anything was deleted.
    pub fn delete_piece(&self, piece_id: &str) -> Result<bool, StorageError> {
        let path = self.piece_path(piece_id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    /// Ids of every stored piece, sorted
    pub fn list_pieces(&self) -> Result<Vec<String>, StorageError> {
        let dir = self.pieces_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let name = entry?.file_name();
            if let Some(id) = name.to_str().and_then(|n| n.strip_suffix(PIECE_SUFFIX)) {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    pub fn piece_path(&self, piece_id: &str) -> Result<PathBuf, StorageError> {
        let valid = !piece_id.is_empty()
            && piece_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidPieceId(piece_id.to_string()));
        }
        Ok(self.pieces_dir().join(format!("{piece_id}{PIECE_SUFFIX}")))
    }

    fn pieces_dir(&self) -> PathBuf {
        self.root.join("pieces")
    }
}
