use portal_core::{
    backends::mock::MockScanner,
    client::JsonClient,
    config::PortalConfig,
    factory::create_frontend,
    page::{self, MarkupMode, MemoryDocument, PopulateOutcome, SSIDS_ELEMENT_ID},
    store::InMemoryStore,
    traits::Document,
    web_server::{self, AppState},
};
use std::sync::Arc;

/// 启动配网 Web 服务器，直到服务器退出
pub async fn run_server(config: &PortalConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        scanner: Arc::new(MockScanner::default()),
        store: Arc::new(InMemoryStore::new()),
        frontend: create_frontend(&config.server),
    });

    tracing::info!("📡 Runner: Starting portal server...");
    web_server::start_web_server(config.server.bind_addr, state).await??;
    Ok(())
}

/// 模拟一次页面加载：拉取网络列表并输出渲染后的 `ssids` 内容
pub async fn run_populate(
    config: &PortalConfig,
    url: Option<String>,
    escape: bool,
) -> anyhow::Result<()> {
    // 与页面行为一致：失败时不输出任何内容
    if let Some(markup) = populate_markup(config, url, escape).await? {
        println!("{}", markup);
    }
    Ok(())
}

/// The `ssids` markup after one page load, or `None` when the fetch failed.
///
/// `url` overrides `client.base_url`; `escape` forces `MarkupMode::Escaped`.
pub async fn populate_markup(
    config: &PortalConfig,
    url: Option<String>,
    escape: bool,
) -> anyhow::Result<Option<String>> {
    let base_url = url.unwrap_or_else(|| config.client.base_url.clone());
    let mode = if escape {
        MarkupMode::Escaped
    } else {
        config.client.markup
    };

    let client = JsonClient::new(&base_url)?;
    let document = Arc::new(MemoryDocument::new().with_element(SSIDS_ELEMENT_ID, ""));

    tracing::info!("📄 Loading page from {}", client.base_url());
    match page::on_page_load(client, document.clone(), mode).await?? {
        PopulateOutcome::Rendered { options } => {
            tracing::info!("✅ {} options rendered", options);
            Ok(document.inner_markup(SSIDS_ELEMENT_ID))
        }
        PopulateOutcome::Skipped(e) => {
            tracing::debug!("Nothing rendered: {}", e);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::frontends::provider_embed::EmbedFrontend;
    use portal_core::traits::ScannedNetwork;
    use tokio::net::TcpListener;

    /// Starts a portal on a loopback port and returns its base URL.
    async fn portal(networks: Vec<ScannedNetwork>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState {
            scanner: Arc::new(MockScanner::new(networks)),
            store: Arc::new(InMemoryStore::new()),
            frontend: Arc::new(EmbedFrontend::new()),
        });
        tokio::spawn(web_server::serve(listener, state));
        format!("http://{addr}/")
    }

    fn quoted() -> Vec<ScannedNetwork> {
        vec![ScannedNetwork {
            ssid: r#"a"b"#.to_string(),
            rssi: -45,
            encrypted: true,
        }]
    }

    #[tokio::test]
    async fn url_flag_overrides_config() {
        let base = portal(MockScanner::default_networks()).await;
        let config = PortalConfig::default();

        let markup = populate_markup(&config, Some(base), false).await.unwrap().unwrap();
        assert!(markup.starts_with(r#"<option value="MyHomeWiFi" />"#));
        assert_eq!(markup.matches("<option").count(), 5);
    }

    #[tokio::test]
    async fn configured_mode_is_verbatim_by_default() {
        let mut config = PortalConfig::default();
        config.client.base_url = portal(quoted()).await;

        let markup = populate_markup(&config, None, false).await.unwrap();
        assert_eq!(markup.as_deref(), Some(r#"<option value="a"b" />"#));
    }

    #[tokio::test]
    async fn escape_flag_overrides_configured_mode() {
        let mut config = PortalConfig::default();
        config.client.base_url = portal(quoted()).await;
        assert_eq!(config.client.markup, MarkupMode::Verbatim);

        let markup = populate_markup(&config, None, true).await.unwrap();
        assert_eq!(markup.as_deref(), Some(r#"<option value="a&quot;b" />"#));
    }

    #[tokio::test]
    async fn failed_fetch_renders_nothing() {
        // `networks` 解析到 /missing/networks，静态资源回退返回 404
        let base = format!("{}missing/", portal(quoted()).await);

        let markup = populate_markup(&PortalConfig::default(), Some(base), false)
            .await
            .unwrap();
        assert_eq!(markup, None);
    }

    #[tokio::test]
    async fn bad_url_is_an_error() {
        let err = populate_markup(&PortalConfig::default(), Some("not a url".into()), false).await;
        assert!(err.is_err());
    }
}
