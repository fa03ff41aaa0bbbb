use crate::page::MarkupMode;
use crate::Result;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// 顶层配置，每个字段都有默认值，空文件也是合法配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortalConfig {
    /// [server] 表
    pub server: ServerConfig,
    /// [client] 表
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Only read with the `frontend_disk` feature.
    pub ui_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([192, 168, 4, 1], 80)),
            ui_dir: PathBuf::from("portal-core/ui"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Page location that `networks` is resolved against.
    pub base_url: String,
    pub markup: MarkupMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.4.1/".to_string(),
            markup: MarkupMode::Verbatim,
        }
    }
}

/// 从 TOML 字符串加载配置
pub fn load_config_from_toml_str(s: &str) -> Result<PortalConfig> {
    Ok(toml::from_str(s)?)
}

/// 从文件加载配置
pub async fn load_config(path: &Path) -> Result<PortalConfig> {
    let text = tokio::fs::read_to_string(path).await?;
    load_config_from_toml_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn empty_file_gives_defaults() {
        let config = load_config_from_toml_str("").unwrap();
        assert_eq!(config.server.bind_addr, SocketAddr::from(([192, 168, 4, 1], 80)));
        assert_eq!(config.client.base_url, "http://192.168.4.1/");
        assert_eq!(config.client.markup, MarkupMode::Verbatim);
    }

    #[test]
    fn full_file_is_parsed() {
        let config = load_config_from_toml_str(
            r#"
            [server]
            bind_addr = "127.0.0.1:3000"
            ui_dir = "/srv/portal/ui"

            [client]
            base_url = "http://127.0.0.1:3000/"
            markup = "escaped"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.server.ui_dir, PathBuf::from("/srv/portal/ui"));
        assert_eq!(config.client.markup, MarkupMode::Escaped);
    }

    #[test]
    fn bad_bind_addr_is_rejected() {
        let err = load_config_from_toml_str("[server]\nbind_addr = \"nowhere\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn unknown_markup_mode_is_rejected() {
        let err = load_config_from_toml_str("[client]\nmarkup = \"sanitized\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/portal.toml")).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
