use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value as JsonValue;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Append-only file sink recording every finalize invocation.
///
/// Strictly best-effort: a failed write is logged and swallowed, it must
/// never change the persistence outcome.
#[derive(Clone)]
pub struct AuditService {
    dir: PathBuf,
}

impl AuditService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Dump the raw finalize results to a timestamp-named file and return
    /// its path so failure notes can be appended later.
    pub async fn record_finalize(&self, role_id: i64, results: &JsonValue) -> Option<PathBuf> {
        let name = format!(
            "finalize_role{}_{}.jsonl",
            role_id,
            Utc::now().format("%Y%m%dT%H%M%S%3f")
        );
        let path = self.dir.join(name);

        let record = serde_json::json!({
            "recordedAt": Utc::now().to_rfc3339(),
            "roleId": role_id,
            "results": results,
        });

        if let Err(e) = fs::create_dir_all(&self.dir).await {
            tracing::warn!(dir = %self.dir.display(), error = %e, "Could not create audit directory");
            return None;
        }
        match fs::write(&path, format!("{record}\n")).await {
            Ok(()) => Some(path),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not write finalize audit dump");
                None
            }
        }
    }

    /// Append one failure note to an existing dump file.
    pub async fn append_failure(&self, path: Option<&Path>, note: &str) {
        let Some(path) = path else { return };
        let line = serde_json::json!({
            "recordedAt": Utc::now().to_rfc3339(),
            "failure": note,
        });

        let result = async {
            let mut file = fs::OpenOptions::new().append(true).open(path).await?;
            file.write_all(format!("{line}\n").as_bytes()).await?;
            file.flush().await
        }
        .await;

        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "Could not append finalize failure note");
        }
    }
}
