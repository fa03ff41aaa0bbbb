use crate::config::ServerConfig;
use crate::traits::UiAssetProvider;
use std::sync::Arc;

/// Picks the UI asset provider selected at compile time.
pub fn create_frontend(config: &ServerConfig) -> Arc<dyn UiAssetProvider> {
    #[cfg(feature = "frontend_disk")]
    {
        tracing::info!("💿 Frontend: Disk Provider selected ({})", config.ui_dir.display());
        Arc::new(crate::frontends::provider_disk::DiskFrontend::new(&config.ui_dir))
    }
    #[cfg(not(feature = "frontend_disk"))]
    {
        let _ = config;
        tracing::info!("📦 Frontend: Embed Provider selected");
        Arc::new(crate::frontends::provider_embed::EmbedFrontend::new())
    }
}
