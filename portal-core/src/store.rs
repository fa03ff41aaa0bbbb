//! Device settings submitted through the portal's `/config` form.

use async_trait::async_trait;
use serde::Deserialize;
use std::net::Ipv4Addr;
use tokio::sync::RwLock;

use crate::traits::CredentialStore;
use crate::{Error, Result};

/// Slot size for names, SSIDs and passwords, in bytes.
pub const TEXT_FIELD_MAX: usize = 32;
/// Longest dotted-quad IPv4 string.
pub const IPV4_FIELD_MAX: usize = 15;

pub const DEFAULT_GATEWAY: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);
pub const DEFAULT_SUBNET: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub secret: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Settings {
    pub ip: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub subnet: Ipv4Addr,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSettings {
    pub name: Option<String>,
    /// SSID and passphrase of the network to join.
    pub station: Option<Credentials>,
    /// Web admin login.
    pub admin: Option<Credentials>,
    pub ipv4: Option<Ipv4Settings>,
}

/// The `/config` form. Absent fields decode as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigSubmission {
    pub ssid: String,
    pub pass: String,
    pub name: String,
    pub username: String,
    pub userpass: String,
    pub ip: String,
    pub gateway: String,
    pub subnet: String,
}

#[derive(Debug)]
pub enum ConfigOutcome {
    /// Station credentials were present; everything submitted was applied.
    Saved(DeviceSettings),
    /// No station credentials. Only the device name (if any) was applied.
    Incomplete(DeviceSettings),
    /// A field did not fit. `settings` still carries a valid submitted name.
    Rejected { settings: DeviceSettings, error: Error },
}

impl ConfigOutcome {
    /// The settings to persist, whatever the outcome.
    pub fn settings(&self) -> &DeviceSettings {
        match self {
            ConfigOutcome::Saved(settings)
            | ConfigOutcome::Incomplete(settings)
            | ConfigOutcome::Rejected { settings, .. } => settings,
        }
    }
}

impl ConfigSubmission {
    /// Merge this submission into `current`.
    ///
    /// A valid non-empty `name` always applies, even when another field is
    /// rejected. The rest only applies when both `ssid` and `pass` are given;
    /// admin credentials need both `username` and `userpass`, static
    /// addressing needs `ip`.
    pub fn apply(&self, mut current: DeviceSettings) -> ConfigOutcome {
        if !self.name.is_empty() {
            match text_field("name", &self.name) {
                Ok(name) => current.name = Some(name),
                Err(error) => {
                    return ConfigOutcome::Rejected {
                        settings: current,
                        error,
                    };
                }
            }
        }

        if self.ssid.is_empty() || self.pass.is_empty() {
            return ConfigOutcome::Incomplete(current);
        }

        match self.apply_network(current.clone()) {
            Ok(settings) => ConfigOutcome::Saved(settings),
            Err(error) => ConfigOutcome::Rejected {
                settings: current,
                error,
            },
        }
    }

    fn apply_network(&self, mut settings: DeviceSettings) -> Result<DeviceSettings> {
        settings.station = Some(Credentials {
            user: text_field("ssid", &self.ssid)?,
            secret: text_field("pass", &self.pass)?,
        });

        if !self.username.is_empty() && !self.userpass.is_empty() {
            settings.admin = Some(Credentials {
                user: text_field("username", &self.username)?,
                secret: text_field("userpass", &self.userpass)?,
            });
        }

        if !self.ip.is_empty() {
            settings.ipv4 = Some(Ipv4Settings {
                ip: ipv4_field("ip", &self.ip)?,
                gateway: optional_ipv4("gateway", &self.gateway, DEFAULT_GATEWAY)?,
                subnet: optional_ipv4("subnet", &self.subnet, DEFAULT_SUBNET)?,
            });
        }

        Ok(settings)
    }
}

fn text_field(field: &'static str, value: &str) -> Result<String> {
    if value.len() > TEXT_FIELD_MAX {
        return Err(Error::InvalidField {
            field,
            reason: format!("longer than {TEXT_FIELD_MAX} bytes"),
        });
    }
    Ok(value.to_string())
}

fn ipv4_field(field: &'static str, value: &str) -> Result<Ipv4Addr> {
    if value.len() > IPV4_FIELD_MAX {
        return Err(Error::InvalidField {
            field,
            reason: format!("longer than {IPV4_FIELD_MAX} bytes"),
        });
    }
    value.parse().map_err(|_| Error::InvalidField {
        field,
        reason: format!("'{value}' is not an IPv4 address"),
    })
}

fn optional_ipv4(field: &'static str, value: &str, default: Ipv4Addr) -> Result<Ipv4Addr> {
    if value.is_empty() {
        Ok(default)
    } else {
        ipv4_field(field, value)
    }
}

/// Keeps settings for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    settings: RwLock<DeviceSettings>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn load(&self) -> Result<DeviceSettings> {
        Ok(self.settings.read().await.clone())
    }

    async fn save(&self, settings: DeviceSettings) -> Result<()> {
        *self.settings.write().await = settings;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.settings.write().await = DeviceSettings::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(pairs: &[(&str, &str)]) -> ConfigSubmission {
        let fields = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
            .collect();
        serde_json::from_value(serde_json::Value::Object(fields)).unwrap()
    }

    #[test]
    fn station_credentials_are_saved() {
        let outcome = submission(&[("ssid", "Home"), ("pass", "secret123")])
            .apply(DeviceSettings::default());

        let ConfigOutcome::Saved(settings) = outcome else {
            panic!("expected Saved");
        };
        assert_eq!(
            settings.station,
            Some(Credentials {
                user: "Home".into(),
                secret: "secret123".into()
            })
        );
        assert_eq!(settings.admin, None);
        assert_eq!(settings.ipv4, None);
    }

    #[test]
    fn name_applies_without_credentials() {
        let outcome = submission(&[("name", "porch-sensor"), ("ssid", "Home")])
            .apply(DeviceSettings::default());

        let ConfigOutcome::Incomplete(settings) = outcome else {
            panic!("expected Incomplete");
        };
        assert_eq!(
            settings,
            DeviceSettings {
                name: Some("porch-sensor".into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn static_ip_gets_default_gateway_and_subnet() {
        let outcome = submission(&[("ssid", "Home"), ("pass", "pw"), ("ip", "192.168.1.50")])
            .apply(DeviceSettings::default());

        let ConfigOutcome::Saved(settings) = outcome else {
            panic!("expected Saved");
        };
        assert_eq!(
            settings.ipv4,
            Some(Ipv4Settings {
                ip: Ipv4Addr::new(192, 168, 1, 50),
                gateway: DEFAULT_GATEWAY,
                subnet: DEFAULT_SUBNET,
            })
        );
    }

    #[test]
    fn admin_needs_both_fields() {
        let outcome = submission(&[("ssid", "Home"), ("pass", "pw"), ("username", "admin")])
            .apply(DeviceSettings::default());

        let ConfigOutcome::Saved(settings) = outcome else {
            panic!("expected Saved");
        };
        assert_eq!(settings.admin, None);
    }

    #[test]
    fn oversized_ssid_is_rejected() {
        let long = "x".repeat(TEXT_FIELD_MAX + 1);
        let outcome = submission(&[("ssid", long.as_str()), ("pass", "pw")])
            .apply(DeviceSettings::default());

        assert!(matches!(
            outcome,
            ConfigOutcome::Rejected {
                error: Error::InvalidField { field: "ssid", .. },
                ..
            }
        ));
        assert_eq!(outcome.settings(), &DeviceSettings::default());
    }

    #[test]
    fn malformed_ip_is_rejected_without_partial_station() {
        let outcome = submission(&[("ssid", "Home"), ("pass", "pw"), ("ip", "10.0.0.256")])
            .apply(DeviceSettings::default());

        let ConfigOutcome::Rejected { settings, error } = outcome else {
            panic!("expected Rejected");
        };
        assert!(matches!(error, Error::InvalidField { field: "ip", .. }));
        assert_eq!(settings.station, None);
    }

    #[test]
    fn name_survives_rejected_password() {
        let long = "p".repeat(TEXT_FIELD_MAX + 1);
        let outcome = submission(&[("name", "porch"), ("ssid", "Home"), ("pass", long.as_str())])
            .apply(DeviceSettings::default());

        let ConfigOutcome::Rejected { settings, error } = outcome else {
            panic!("expected Rejected");
        };
        assert!(matches!(error, Error::InvalidField { field: "pass", .. }));
        assert_eq!(settings.name.as_deref(), Some("porch"));
        assert_eq!(settings.station, None);
    }

    #[test]
    fn oversized_name_keeps_previous_name() {
        let long = "n".repeat(TEXT_FIELD_MAX + 1);
        let previous = DeviceSettings {
            name: Some("old".into()),
            ..Default::default()
        };
        let outcome = submission(&[("name", long.as_str())]).apply(previous.clone());

        assert!(matches!(
            outcome,
            ConfigOutcome::Rejected {
                error: Error::InvalidField { field: "name", .. },
                ..
            }
        ));
        assert_eq!(outcome.settings(), &previous);
    }

    #[tokio::test]
    async fn clear_resets_store() {
        let store = InMemoryStore::new();
        store
            .save(DeviceSettings {
                name: Some("dev".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(store.load().await.unwrap().name.as_deref(), Some("dev"));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), DeviceSettings::default());
    }
}
