use super::{InstanceStore, StoreError, StoreResult};
use crate::models::{MediaTailor, Touchstream};
use crate::state_machine::{ManifestStatus, ProvisioningStatus};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// In-process instance store backed by concurrent maps.
///
/// Guarded transitions hold the entry's shard lock for the whole
/// check-then-set, so two steps racing on one record cannot both win.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInstanceStore {
    entities: Arc<DashMap<Uuid, Touchstream>>,
    manifests: Arc<DashMap<Uuid, MediaTailor>>,
}

impl InMemoryInstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn manifest_count(&self) -> usize {
        self.manifests.len()
    }
}

#[async_trait]
impl InstanceStore for InMemoryInstanceStore {
    async fn read_status(&self, instance_id: Uuid) -> StoreResult<ProvisioningStatus> {
        self.entities
            .get(&instance_id)
            .map(|entity| entity.status)
            .ok_or(StoreError::NotFound(instance_id))
    }

    async fn read_entity(&self, instance_id: Uuid) -> StoreResult<Touchstream> {
        self.entities
            .get(&instance_id)
            .map(|entity| entity.clone())
            .ok_or(StoreError::NotFound(instance_id))
    }

    async fn read_manifest(&self, instance_id: Uuid) -> StoreResult<MediaTailor> {
        self.manifests
            .get(&instance_id)
            .map(|manifest| manifest.clone())
            .ok_or(StoreError::NotFound(instance_id))
    }

    async fn transition_status(
        &self,
        instance_id: Uuid,
        from: &[ProvisioningStatus],
        to: ProvisioningStatus,
    ) -> StoreResult<ProvisioningStatus> {
        let mut entity = self
            .entities
            .get_mut(&instance_id)
            .ok_or(StoreError::NotFound(instance_id))?;

        let previous = entity.status;
        if !from.contains(&previous) {
            return Err(StoreError::rejected(previous, from));
        }

        entity.status = to;
        debug!(
            instance_id = %instance_id,
            from_status = %previous,
            to_status = %to,
            "Provisioning status updated"
        );
        Ok(previous)
    }

    async fn insert_entity(&self, entity: Touchstream) -> StoreResult<()> {
        self.entities.insert(entity.instance_id, entity);
        Ok(())
    }

    async fn insert_manifest(&self, manifest: MediaTailor) -> StoreResult<()> {
        self.manifests.insert(manifest.instance_id, manifest);
        Ok(())
    }

    async fn update_manifest_result_url(
        &self,
        instance_id: Uuid,
        result_url: String,
    ) -> StoreResult<()> {
        let mut manifest = self
            .manifests
            .get_mut(&instance_id)
            .ok_or(StoreError::NotFound(instance_id))?;
        manifest.result_url = result_url;
        Ok(())
    }

    async fn transition_manifest_status(
        &self,
        instance_id: Uuid,
        from: ManifestStatus,
        to: ManifestStatus,
    ) -> StoreResult<ManifestStatus> {
        let mut manifest = self
            .manifests
            .get_mut(&instance_id)
            .ok_or(StoreError::NotFound(instance_id))?;

        let previous = manifest.status;
        if previous != from {
            return Err(StoreError::rejected(previous, &[from]));
        }

        manifest.status = to;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entity(status: ProvisioningStatus) -> Touchstream {
        let now = Utc::now();
        let mut entity = Touchstream::new("TS", "E1", "Event", now, now);
        entity.status = status;
        entity
    }

    #[tokio::test]
    async fn test_missing_instance_is_not_found() {
        let store = InMemoryInstanceStore::new();
        let id = Uuid::new_v4();
        assert_eq!(store.read_status(id).await, Err(StoreError::NotFound(id)));
        assert_eq!(
            store.read_manifest(id).await.unwrap_err(),
            StoreError::NotFound(id)
        );
    }

    #[tokio::test]
    async fn test_guarded_transition() {
        let store = InMemoryInstanceStore::new();
        let record = entity(ProvisioningStatus::Ready);
        let id = record.instance_id;
        store.insert_entity(record).await.unwrap();

        let previous = store
            .transition_status(id, &[ProvisioningStatus::Ready], ProvisioningStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(previous, ProvisioningStatus::Ready);
        assert_eq!(
            store.read_status(id).await.unwrap(),
            ProvisioningStatus::InProgress
        );

        let rejected = store
            .transition_status(id, &[ProvisioningStatus::Ready], ProvisioningStatus::Error)
            .await
            .unwrap_err();
        assert!(matches!(rejected, StoreError::Rejected { ref current, .. } if current == "in_progress"));
        assert_eq!(
            store.read_status(id).await.unwrap(),
            ProvisioningStatus::InProgress
        );
    }

    #[tokio::test]
    async fn test_concurrent_transitions_have_one_winner() {
        let store = InMemoryInstanceStore::new();
        let record = entity(ProvisioningStatus::Deactivate);
        let id = record.instance_id;
        store.insert_entity(record).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .transition_status(
                        id,
                        &[ProvisioningStatus::Deactivate],
                        ProvisioningStatus::Deactivating,
                    )
                    .await
                    .is_ok()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_manifest_result_url_and_status() {
        let store = InMemoryInstanceStore::new();
        let manifest = MediaTailor::new("MT", "E1", "akamai", "hls");
        let id = manifest.instance_id;
        store.insert_manifest(manifest).await.unwrap();

        store
            .update_manifest_result_url(id, "https://cdn/E1.m3u8".to_string())
            .await
            .unwrap();
        assert_eq!(
            store.read_manifest(id).await.unwrap().result_url,
            "https://cdn/E1.m3u8"
        );

        store
            .transition_manifest_status(id, ManifestStatus::Ready, ManifestStatus::Complete)
            .await
            .unwrap();
        assert!(store
            .transition_manifest_status(id, ManifestStatus::Ready, ManifestStatus::Complete)
            .await
            .is_err());
    }
}
