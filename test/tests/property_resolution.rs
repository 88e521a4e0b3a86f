//! PROPERTY-BASED TESTS: resource resolution across groups
//!
//! Key invariants:
//! 1. resolve_all(excluding G) never returns a resource of G
//! 2. Every resource of every other local group is returned

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;

use interlink_server::{GroupRegistry, ResourceResolver, WorkerGroup};
use interlink_shared::{GroupId, ResourceId};

fn groups_strategy() -> impl Strategy<Value = BTreeMap<String, Vec<String>>> {
    prop::collection::btree_map(
        "g[0-9]",
        prop::collection::vec("[a-c]{1,2}", 0..5),
        1..6,
    )
}

proptest! {
    #[test]
    fn prop_resolve_all_excludes_the_caller(
        groups in groups_strategy(),
        excluded_index in 0usize..6,
    ) {
        let registry = GroupRegistry::new();
        for (id, names) in &groups {
            let group = WorkerGroup::local(id.as_str());
            for name in names {
                group.pool().put(name, name.as_bytes().to_vec());
            }
            registry.insert(Arc::new(group));
        }
        let ids: Vec<&String> = groups.keys().collect();
        let excluding = GroupId::from(ids[excluded_index % ids.len()].as_str());

        let resolved = ResourceResolver::new(registry).resolve_all(&excluding);

        prop_assert!(resolved.iter().all(|resource| resource.id.pool_id != excluding));
        for (id, names) in &groups {
            if id.as_str() == excluding.as_str() {
                continue;
            }
            for name in names {
                let resource_id = ResourceId::new(id.as_str(), name.as_str());
                prop_assert!(resolved.contains(&resource_id));
            }
        }
    }
}
