// Group endpoints
//
// Listing and group-wide actions (on/off, brightness).

use std::collections::HashMap;

use tracing::debug;

use crate::error::Error;
use crate::hue::client::HueClient;
use crate::hue::models::{GroupActionRequest, HueGroup};

impl HueClient {
    /// List all groups.
    ///
    /// `GET /api/<key>/groups`
    ///
    /// The bridge returns an object keyed by group id. Results are ordered
    /// by numeric id so repeated listings come back in a stable order.
    pub async fn list_groups(&self) -> Result<Vec<(String, HueGroup)>, Error> {
        let map: HashMap<String, HueGroup> = self.get("groups").await?;
        let mut groups: Vec<(String, HueGroup)> = map.into_iter().collect();
        groups.sort_by(|(a, _), (b, _)| group_id_order(a, b));
        debug!(count = groups.len(), "listed groups");
        Ok(groups)
    }

    /// Fetch a single group by id.
    ///
    /// `GET /api/<key>/groups/<id>`
    pub async fn get_group(&self, id: &str) -> Result<HueGroup, Error> {
        self.get(&format!("groups/{id}")).await
    }

    /// Apply an action to every light in a group.
    ///
    /// `PUT /api/<key>/groups/<id>/action`
    pub async fn set_group_action(
        &self,
        id: &str,
        action: &GroupActionRequest,
    ) -> Result<(), Error> {
        debug!(group = id, ?action, "setting group action");
        let _: Vec<serde_json::Value> = self.put(&format!("groups/{id}/action"), action).await?;
        Ok(())
    }
}

/// Numeric ids sort numerically; anything else falls back to string order.
fn group_id_order(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::group_id_order;

    #[test]
    fn ids_sort_numerically() {
        let mut ids = vec!["10", "2", "1", "0"];
        ids.sort_by(|a, b| group_id_order(a, b));
        assert_eq!(ids, vec!["0", "1", "2", "10"]);
    }
}
