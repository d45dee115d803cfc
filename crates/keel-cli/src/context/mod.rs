mod project_root;

use std::path::PathBuf;

use anyhow::Context;
use keel_config::KeelConfig;
use keel_db::service::KeelService;
use keel_db::sync::SyncOutcome;

pub use project_root::{KEEL_DIR, detect_project_root};

/// Shared resources for one command invocation.
pub struct AppContext {
    pub service: KeelService,
    pub config: KeelConfig,
    pub project_root: PathBuf,
}

impl AppContext {
    /// Load configuration for `project_root` and open its journal and index.
    ///
    /// Opening reconciles the index with the journal, so every command sees
    /// current state.
    pub async fn init(project_root: PathBuf) -> anyhow::Result<Self> {
        let config = KeelConfig::load_with_dotenv(&project_root)
            .context("failed to load keel configuration")?;

        let journal_path = config.storage.journal_path(&project_root);
        let index_path = config.storage.index_path(&project_root);
        let index_path_str = index_path.to_string_lossy();

        let service = KeelService::open(journal_path, &index_path_str)
            .await
            .with_context(|| format!("failed to open index at {}", index_path.display()))?;

        if let SyncOutcome::Rebuilt(report) = service.opened_with() {
            tracing::debug!(
                decisions = report.decisions_indexed,
                orphans = report.orphans,
                "index was stale and has been rebuilt"
            );
        }

        Ok(Self {
            service,
            config,
            project_root,
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{AppContext, KEEL_DIR, detect_project_root};

    #[tokio::test]
    async fn init_creates_storage_dir_and_empty_index() {
        let temp = TempDir::new().expect("tempdir should create");
        let ctx = AppContext::init(temp.path().to_path_buf())
            .await
            .expect("context should open");

        assert!(temp.path().join(KEEL_DIR).is_dir());
        let status = ctx.service.status().await.expect("status");
        assert!(!status.journal_exists);
        assert_eq!(status.indexed_decisions, 0);
        assert_eq!(detect_project_root(temp.path()), temp.path());
    }
}
