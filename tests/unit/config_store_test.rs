//! Tests for tenant settings stores

use island_queue::config::TenantSettings;
use island_queue::core::ConfigStore;
use island_queue::infra::{InMemoryConfigStore, JsonFileConfigStore};
use island_queue::util::{ChannelId, TenantId};

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("island_queue_{name}_{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn test_in_memory_store_round_trip() {
    let store = InMemoryConfigStore::new();
    assert_eq!(store.load(TenantId(1)).await.unwrap(), None);

    let settings = TenantSettings::with_timeout(20);
    store.save(TenantId(1), &settings).await.unwrap();
    assert_eq!(store.load(TenantId(1)).await.unwrap(), Some(settings));
}

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let dir = scratch_dir("reopen");
    let store = JsonFileConfigStore::open(&dir, "guilds").unwrap();
    store
        .save(TenantId(1), &TenantSettings::with_timeout(20))
        .await
        .unwrap();
    let mut updated = TenantSettings::with_timeout(45);
    updated.turnip_channel = Some(ChannelId(9));
    store.save(TenantId(1), &updated).await.unwrap();
    assert!(store.path().ends_with("guilds_tenants.jsonl"));

    let reopened = JsonFileConfigStore::open(&dir, "guilds").unwrap();
    assert_eq!(reopened.load(TenantId(1)).await.unwrap(), Some(updated));
    assert_eq!(reopened.load(TenantId(2)).await.unwrap(), None);

    std::fs::remove_dir_all(dir).ok();
}
