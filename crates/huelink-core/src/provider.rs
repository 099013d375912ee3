// ── Device group provider ──
//
// The capability the relay and the HTTP surface need from a lighting
// backend: list groups, switch them, dim them. `HueProvider` is the
// production implementation over the bridge REST client.

use std::future::Future;

use huelink_api::{GroupActionRequest, HueClient, TransportConfig};
use tracing::debug;

use crate::config::BridgeConfig;
use crate::error::CoreError;
use crate::model::DeviceGroup;

/// Source of truth for device group state.
///
/// Implementations must be shareable across tasks; the relay session and
/// the HTTP handlers call into the same provider concurrently.
pub trait DeviceGroupProvider: Send + Sync + 'static {
    /// Fetch every group, in provider order.
    fn list_groups(&self) -> impl Future<Output = Result<Vec<DeviceGroup>, CoreError>> + Send;

    /// Switch every device in `group` on or off.
    fn set_power(
        &self,
        group: &DeviceGroup,
        on: bool,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Set the brightness of every device in `group`.
    fn set_brightness(
        &self,
        group: &DeviceGroup,
        brightness: u8,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}

// ── Hue ──────────────────────────────────────────────────────────────

/// [`DeviceGroupProvider`] backed by a Philips Hue bridge.
pub struct HueProvider {
    client: HueClient,
}

impl HueProvider {
    pub fn new(config: &BridgeConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::with_timeout(config.timeout);
        let client = HueClient::new(config.address.clone(), config.app_key.clone(), &transport)?;
        Ok(Self { client })
    }

    pub fn with_client(client: HueClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &HueClient {
        &self.client
    }
}

impl DeviceGroupProvider for HueProvider {
    async fn list_groups(&self) -> Result<Vec<DeviceGroup>, CoreError> {
        let groups = self.client.list_groups().await?;
        Ok(groups
            .into_iter()
            .map(|(id, group)| DeviceGroup::from_hue(id, group))
            .collect())
    }

    async fn set_power(&self, group: &DeviceGroup, on: bool) -> Result<(), CoreError> {
        debug!(group = %group.name, id = %group.id, on, "set power");
        self.client
            .set_group_action(&group.id, &GroupActionRequest::power(on))
            .await?;
        Ok(())
    }

    async fn set_brightness(&self, group: &DeviceGroup, brightness: u8) -> Result<(), CoreError> {
        debug!(group = %group.name, id = %group.id, brightness, "set brightness");
        self.client
            .set_group_action(&group.id, &GroupActionRequest::brightness(brightness))
            .await?;
        Ok(())
    }
}
