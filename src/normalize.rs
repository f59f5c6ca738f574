//! Record normalizer: flattens the layered survey into a client profile and
//! a single attribute bag.
//!
//! Layers merge in a fixed order (site, load, infra, design) and a later
//! layer overwrites an earlier one on key collision. The list-valued fields
//! are resolved separately: each takes the latest layer that holds a
//! non-empty list, so a scalar written under a list key never replaces one.

use crate::config::SizingConfig;
use crate::types::{AttributeBag, ClientInfo, ClientProfile, RawAuditRecord};
use crate::util::list_from_values;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Keys owned by the explicit list resolution, never by the generic merge.
const LIST_KEYS: [&str; 6] = [
    "items",
    "cameras",
    "machinery",
    "hazards",
    "sitePhotos",
    "roofPhotos",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub client_profile: ClientProfile,
    pub attribute_bag: AttributeBag,
}

pub fn normalize(record: &RawAuditRecord, config: &SizingConfig) -> Normalized {
    let layers = [
        layer_fields("site", record.site.as_ref()),
        layer_fields("load", record.load.as_ref()),
        layer_fields("infra", record.infra.as_ref()),
        layer_fields("design", record.design.as_ref()),
    ];

    let mut fields = Map::new();
    for layer in &layers {
        fields.extend(layer.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    for key in LIST_KEYS {
        fields.remove(key);
    }

    let attribute_bag = AttributeBag {
        items: latest_list(&layers, "items"),
        // Only the site and load steps record cameras; load wins when both do.
        cameras: latest_list(&layers[..2], "cameras"),
        machinery: latest_list(&layers, "machinery"),
        hazards: latest_list(&layers, "hazards"),
        site_photos: latest_list(&layers, "sitePhotos"),
        roof_photos: latest_list(&layers, "roofPhotos"),
        fields,
    };

    debug!(
        items = attribute_bag.items.len(),
        cameras = attribute_bag.cameras.len(),
        hazards = attribute_bag.hazards.len(),
        keys = attribute_bag.fields.len(),
        "normalized audit record"
    );

    Normalized {
        client_profile: client_profile(record.client.as_ref(), &attribute_bag.site_photos, config),
        attribute_bag,
    }
}

/// The list under `key` from the latest layer that recorded a non-empty one.
/// Empty lists count as absent, the same as the typed survey fields that are
/// skipped when empty.
fn latest_list<T: DeserializeOwned>(layers: &[Map<String, Value>], key: &str) -> Vec<T> {
    layers
        .iter()
        .rev()
        .find_map(|layer| match layer.get(key) {
            Some(Value::Array(items)) if !items.is_empty() => Some(items.clone()),
            _ => None,
        })
        .map(list_from_values::<T>)
        .unwrap_or_default()
}

fn client_profile(client: Option<&ClientInfo>, site_photos: &[Value], config: &SizingConfig) -> ClientProfile {
    let client = client.cloned().unwrap_or_default();
    let engineer_name = client
        .engineer_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| config.engineer_placeholder.clone());

    ClientProfile {
        name: client.name,
        phone: client.phone,
        email: client.email,
        address: client.address,
        gps: client.gps,
        building_type: client.building_type,
        ownership: client.ownership,
        floor_count: client.floor_count,
        landlord_contact: client.landlord_contact,
        photos: client.photos,
        audit_date: client.audit_date,
        site_photos: site_photos.to_vec(),
        engineer_name,
    }
}

fn layer_fields<T: Serialize>(name: &str, layer: Option<&T>) -> Map<String, Value> {
    let Some(layer) = layer else {
        return Map::new();
    };
    match serde_json::to_value(layer) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => {
            warn!(layer = name, error = %e, "survey layer could not be flattened; treating as empty");
            Map::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawAuditRecord {
        serde_json::from_value(value).unwrap()
    }

    fn bag(value: Value) -> AttributeBag {
        normalize(&record(value), SizingConfig::standard()).attribute_bag
    }

    #[test]
    fn empty_record_has_empty_lists_and_placeholder_engineer() {
        let out = normalize(&RawAuditRecord::default(), SizingConfig::standard());
        let b = &out.attribute_bag;
        assert!(b.items.is_empty() && b.cameras.is_empty() && b.machinery.is_empty());
        assert!(b.hazards.is_empty() && b.site_photos.is_empty() && b.roof_photos.is_empty());
        assert!(b.fields.is_empty());
        assert_eq!(out.client_profile.engineer_name, "Field Engineer");
    }

    #[test]
    fn design_layer_wins_over_site() {
        let b = bag(json!({
            "site": {"dbType": "Old"},
            "design": {"dbType": "New"}
        }));
        assert_eq!(b.get("dbType"), Some(&json!("New")));
    }

    #[test]
    fn infra_wins_over_load_and_loses_to_design() {
        let b = bag(json!({
            "load": {"conduitType": "PVC", "cableNote": "load"},
            "infra": {"conduitType": "Steel", "cableNote": "infra"},
            "design": {"cableNote": "design"}
        }));
        assert_eq!(b.get("conduitType"), Some(&json!("Steel")));
        assert_eq!(b.get("cableNote"), Some(&json!("design")));
    }

    #[test]
    fn absent_values_do_not_erase_earlier_layers() {
        let b = bag(json!({
            "site": {"soilType": "Clay"},
            "design": {"batteryType": "Lithium"}
        }));
        assert_eq!(b.get("soilType"), Some(&json!("Clay")));
        assert_eq!(b.get("batteryType"), Some(&json!("Lithium")));
    }

    #[test]
    fn list_fields_come_from_their_owning_layer() {
        let b = bag(json!({
            "site": {"hazards": ["Exposed wiring"], "sitePhotos": ["a.jpg"], "roofPhotos": "broken"},
            "load": {"machinery": [{"name": "Lathe"}], "items": [{"name": "Pump"}]},
            "design": {"hazards": "overwritten", "items": 4}
        }));
        assert_eq!(b.hazards, vec![json!("Exposed wiring")]);
        assert_eq!(b.site_photos, vec![json!("a.jpg")]);
        assert!(b.roof_photos.is_empty());
        assert_eq!(b.machinery.len(), 1);
        assert_eq!(b.items.len(), 1);
        assert!(b.get("hazards").is_none());
        assert!(b.get("items").is_none());

        let b = bag(json!({"design": {"hazards": ["Asbestos roof"]}}));
        assert_eq!(b.hazards, vec![json!("Asbestos roof")]);
    }

    #[test]
    fn later_layer_lists_win() {
        let b = bag(json!({
            "site": {"hazards": ["Exposed wiring"], "roofPhotos": ["old.jpg"]},
            "load": {"hazards": ["Overloaded DB"]},
            "infra": {"hazards": []},
            "design": {"roofPhotos": ["new.jpg"], "machinery": "none"}
        }));
        assert_eq!(b.hazards, vec![json!("Overloaded DB")]);
        assert_eq!(b.roof_photos, vec![json!("new.jpg")]);
        assert!(b.machinery.is_empty());
    }

    #[test]
    fn serialized_bag_has_single_list_keys() {
        let b = bag(json!({"site": {"hazards": ["Flooding"]}, "design": {"hazards": "x"}}));
        let v = serde_json::to_value(&b).unwrap();
        assert_eq!(v["hazards"], json!(["Flooding"]));
        assert_eq!(v["items"], json!([]));
    }

    #[test]
    fn cameras_fall_back_to_site() {
        let b = bag(json!({"load": {"cameras": []}, "site": {"cameras": [{"qty": 3}]}}));
        assert_eq!(b.cameras.len(), 1);
        let b = bag(json!({
            "load": {"cameras": [{}, {}]},
            "site": {"cameras": [{}, {}, {}, {}, {}]}
        }));
        assert_eq!(b.cameras.len(), 2);
        let b = bag(json!({"site": {"cameras": [{}]}, "design": {"cameras": [{}, {}, {}]}}));
        assert_eq!(b.cameras.len(), 1);
    }

    #[test]
    fn client_fields_pass_through() {
        let out = normalize(
            &record(json!({
                "client": {
                    "name": "Ade Stores",
                    "gps": {"lat": 6.45, "lng": 3.39},
                    "photos": ["front.jpg"],
                    "engineerName": "Chidi Okafor"
                },
                "site": {"sitePhotos": ["yard.jpg"]}
            })),
            SizingConfig::standard(),
        );
        let p = out.client_profile;
        assert_eq!(p.name.as_deref(), Some("Ade Stores"));
        assert_eq!(p.gps, Some(json!({"lat": 6.45, "lng": 3.39})));
        assert_eq!(p.photos, Some(json!(["front.jpg"])));
        assert_eq!(p.site_photos, vec![json!("yard.jpg")]);
        assert_eq!(p.engineer_name, "Chidi Okafor");
    }

    #[test]
    fn blank_engineer_uses_configured_placeholder() {
        let cfg = SizingConfig {
            engineer_placeholder: "Unassigned".to_string(),
            ..SizingConfig::default()
        };
        let out = normalize(&record(json!({"client": {"engineerName": "  "}})), &cfg);
        assert_eq!(out.client_profile.engineer_name, "Unassigned");
    }
}
