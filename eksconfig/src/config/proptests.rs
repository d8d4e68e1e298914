//! Property-based tests for document merging and persistence.

use super::merger::ConfigMerger;
use super::schema::Config;
use proptest::prelude::*;
use serde_yaml::Value;

// Strategy for generating small YAML mappings of scalar values
fn mapping_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,6}", any::<i32>(), 0..6).prop_map(|m| {
        Value::Mapping(
            m.into_iter()
                .map(|(k, v)| (Value::String(k), Value::Number(v.into())))
                .collect(),
        )
    })
}

// Strategy for generating the root fields a document override usually names
fn overrides_strategy() -> impl Strategy<Value = (Option<String>, Option<String>, Option<u32>)> {
    (
        prop::option::of("[a-z][a-z0-9-]{0,20}"),
        prop::option::of(prop::sample::select(vec!["us-west-2", "us-east-1", "eu-west-1"]).prop_map(String::from)),
        prop::option::of(1u32..100),
    )
}

fn document(name: Option<&String>, region: Option<&String>, clients: Option<u32>) -> String {
    let mut doc = String::new();
    if let Some(name) = name {
        doc.push_str(&format!("name: {name}\n"));
    }
    if let Some(region) = region {
        doc.push_str(&format!("region: {region}\n"));
    }
    if let Some(clients) = clients {
        doc.push_str(&format!("clients: {clients}\n"));
    }
    if doc.is_empty() {
        doc.push_str("{}\n");
    }
    doc
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    // Keys named by the document win, every other key keeps its value
    #[test]
    fn merge_document_named_keys_win((name, region, clients) in overrides_strategy()) {
        let base = Config::new_default();
        let merged = ConfigMerger::merge_document(
            &base,
            &document(name.as_ref(), region.as_ref(), clients),
        ).unwrap();

        prop_assert_eq!(merged.name, name.unwrap_or_else(|| base.name.clone()));
        prop_assert_eq!(merged.region, region.unwrap_or_else(|| base.region.clone()));
        prop_assert_eq!(merged.clients, clients.unwrap_or(base.clients));
        prop_assert_eq!(merged.parameters, base.parameters);
        prop_assert_eq!(merged.add_on_node_groups, base.add_on_node_groups);
    }

    // An empty document is the identity
    #[test]
    fn merge_empty_document_is_identity(seed in any::<u64>()) {
        use rand::{rngs::StdRng, SeedableRng};

        let base = Config::new_default_with(&mut StdRng::seed_from_u64(seed));
        let merged = ConfigMerger::merge_document(&base, "{}\n").unwrap();
        prop_assert_eq!(merged, base);
    }

    // Merging mappings keeps every target key and takes every source value
    #[test]
    fn merge_values_is_a_union(target in mapping_strategy(), source in mapping_strategy()) {
        let mut merged = target.clone();
        ConfigMerger::merge_values(&mut merged, source.clone());

        let (Value::Mapping(merged), Value::Mapping(target), Value::Mapping(source)) =
            (merged, target, source) else {
            unreachable!("strategies only produce mappings");
        };
        for (key, value) in &source {
            prop_assert_eq!(merged.get(key), Some(value));
        }
        for key in target.keys() {
            prop_assert!(merged.contains_key(key));
        }
        prop_assert!(merged.len() <= target.len() + source.len());
    }

    // Merging the same source twice changes nothing the second time
    #[test]
    fn merge_values_is_idempotent(target in mapping_strategy(), source in mapping_strategy()) {
        let mut once = target;
        ConfigMerger::merge_values(&mut once, source.clone());
        let mut twice = once.clone();
        ConfigMerger::merge_values(&mut twice, source);
        prop_assert_eq!(once, twice);
    }

    // A synced document loads back unchanged
    #[test]
    fn sync_then_load_round_trips(seed in any::<u64>(), clients in 1u32..100) {
        use rand::{rngs::StdRng, SeedableRng};

        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::new_default_with(&mut StdRng::seed_from_u64(seed));
        cfg.clients = clients;
        cfg.config_path = dir.path().join("c.yaml").display().to_string();
        cfg.sync().unwrap();

        let back = Config::load(&cfg.config_path).unwrap();
        prop_assert_eq!(back, cfg);
    }
}
