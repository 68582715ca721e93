// Multi-region instance listing

mod common;

use cloud_insights::cloud_repo::demo::DemoProvider;
use cloud_insights::error::SourceError;
use cloud_insights::inventory::list_instances;
use cloud_insights::models::RegionInventory;
use common::ScriptedProvider;

fn region_with(ids: &[(&str, &str)], region: &str) -> RegionInventory {
    RegionInventory {
        compute: ids
            .iter()
            .map(|(id, state)| {
                let mut i = common::instance(id, region);
                i.state = state.to_string();
                i
            })
            .collect(),
        managed_db: vec![],
    }
}

#[tokio::test]
async fn failing_region_is_skipped() {
    let mut provider = ScriptedProvider::new(&["r1", "r2", "r3"]);
    provider
        .inventory
        .insert("r1".into(), region_with(&[("i-1", "running")], "r1"));
    provider
        .inventory
        .insert("r3".into(), region_with(&[("i-3", "stopped")], "r3"));
    provider.failing.insert("r2".into());

    let listing = list_instances(&provider, &common::credentials()).await.unwrap();
    let ids: Vec<&str> = listing
        .compute_instances
        .iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(ids, vec!["i-1", "i-3"]);
}

#[tokio::test]
async fn terminated_instances_are_filtered() {
    let mut provider = ScriptedProvider::new(&["r1"]);
    provider.inventory.insert(
        "r1".into(),
        region_with(&[("i-1", "running"), ("i-2", "terminated")], "r1"),
    );
    let listing = list_instances(&provider, &common::credentials()).await.unwrap();
    assert_eq!(listing.compute_instances.len(), 1);
    assert_eq!(listing.compute_instances[0].id, "i-1");
}

#[tokio::test]
async fn unreadable_region_list_is_an_error() {
    let provider = ScriptedProvider::new(&["r1"]);
    let mut credentials = common::credentials();
    credentials.secret_access_key.clear();
    let err = list_instances(&provider, &credentials).await.unwrap_err();
    assert!(matches!(err, SourceError::Unauthorized(_)));
}

#[tokio::test]
async fn demo_provider_lists_fixture_fleet() {
    let provider = DemoProvider::new(vec![
        "us-east-1".into(),
        "us-west-2".into(),
        "eu-west-1".into(),
        "ap-southeast-1".into(),
    ]);
    let listing = list_instances(&provider, &common::credentials()).await.unwrap();
    assert_eq!(listing.compute_instances.len(), 4);
    assert!(
        listing
            .compute_instances
            .iter()
            .all(|i| i.state != "terminated")
    );
    assert_eq!(listing.managed_db_instances.len(), 3);
}

#[tokio::test]
async fn demo_provider_only_lists_configured_regions() {
    let provider = DemoProvider::new(vec!["eu-west-1".into()]);
    let listing = list_instances(&provider, &common::credentials()).await.unwrap();
    assert_eq!(listing.compute_instances.len(), 1);
    assert_eq!(listing.compute_instances[0].region, "eu-west-1");
    assert_eq!(listing.managed_db_instances.len(), 1);
}
