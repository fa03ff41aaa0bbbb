use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;

use crate::store::DeviceSettings;

// 在这里定义设备端与页面端共享的数据结构，以及各个可替换部件的 trait。

/// A single Wi-Fi network as reported by a scanner backend.
/// 扫描后端返回的单个网络。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedNetwork {
    pub ssid: String,
    pub rssi: i32, // dBm，例如 -42
    pub encrypted: bool,
}

/// One element of the `/networks` JSON array.
///
/// The wire shape follows the device firmware: `rssi` is a decimal string and
/// the encryption flag lives under the misspelt `encyrption` key. Only `ssid`
/// is required when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub ssid: String,
    #[serde(
        default,
        deserialize_with = "rssi_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub rssi: Option<String>,
    #[serde(
        default,
        rename = "encyrption",
        skip_serializing_if = "Option::is_none"
    )]
    pub encrypted: Option<bool>,
}

impl NetworkRecord {
    pub fn new(ssid: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            rssi: None,
            encrypted: None,
        }
    }
}

impl From<ScannedNetwork> for NetworkRecord {
    fn from(n: ScannedNetwork) -> Self {
        Self {
            ssid: n.ssid,
            rssi: Some(n.rssi.to_string()),
            encrypted: Some(n.encrypted),
        }
    }
}

// 固件发送字符串，其他实现可能发送数字，两者都接受
fn rssi_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Rssi {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Rssi>::deserialize(deserializer)?.map(|rssi| match rssi {
        Rssi::Text(s) => s,
        Rssi::Number(n) => n.to_string(),
    }))
}

/// 前端资源提供者接口。
#[async_trait]
pub trait UiAssetProvider: Send + Sync {
    /// Retrieves a single UI asset.
    ///
    /// # Arguments
    /// * `path` - The path to the asset (e.g., "index.html", "style.css").
    ///
    /// # Returns
    /// The asset's content and its MIME type, or `Error::AssetNotFound`.
    async fn get_asset(&self, path: &str) -> crate::Result<(Cow<'static, [u8]>, String)>;
}

/// 无线扫描后端：每次调用执行一次扫描。
#[async_trait]
pub trait NetworkScanner: Send + Sync {
    async fn scan(&self) -> crate::Result<Vec<ScannedNetwork>>;
}

/// 设备设置的持久化位置（名称、站点凭据、管理员凭据、静态 IPv4）。
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> crate::Result<DeviceSettings>;

    /// Replaces the stored settings as a whole.
    async fn save(&self, settings: DeviceSettings) -> crate::Result<()>;

    async fn clear(&self) -> crate::Result<()>;
}

/// The page the network list is rendered into.
///
/// Elements are addressed by id. Writes replace the element's inner markup.
pub trait Document: Send + Sync {
    fn inner_markup(&self, id: &str) -> Option<String>;

    /// Fails with `Error::ElementNotFound` when no element carries `id`.
    fn set_inner_markup(&self, id: &str, markup: String) -> crate::Result<()>;
}
