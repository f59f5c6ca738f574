//! Single entry point shared by every consumer of an audit.
//!
//! The review summary, the JSON export and the quote draft all go through
//! [`adapt`], so they can never disagree about a derived figure.

use crate::config::SizingConfig;
use crate::normalize::{normalize, Normalized};
use crate::sizing::derive;
use crate::types::{AdaptedView, RawAuditRecord, ServiceRoute};

pub fn adapt(record: &RawAuditRecord, config: &SizingConfig) -> AdaptedView {
    let Normalized {
        client_profile,
        attribute_bag,
    } = normalize(record, config);

    let load = record.load.as_ref();
    let derived_results = derive(
        &attribute_bag,
        load.and_then(|l| l.stats.as_ref()),
        record.design.as_ref(),
        config,
    );

    AdaptedView {
        client_profile,
        attribute_bag,
        derived_results,
    }
}

pub fn route(record: &RawAuditRecord) -> ServiceRoute {
    ServiceRoute::from_services(&record.services)
}

/// Identifies a record in exported rows: its id, else the client name.
pub fn audit_label(record: &RawAuditRecord) -> Option<String> {
    let non_blank = |s: &Option<String>| s.clone().filter(|s| !s.trim().is_empty());
    non_blank(&record.id).or_else(|| record.client.as_ref().and_then(|c| non_blank(&c.name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServiceKind;
    use serde_json::json;

    #[test]
    fn empty_record_adapts_without_panicking() {
        let view = adapt(&RawAuditRecord::default(), SizingConfig::standard());
        assert_eq!(view.derived_results.total_cameras, 0);
        assert_eq!(view.client_profile.engineer_name, "Field Engineer");
        assert_eq!(route(&RawAuditRecord::default()), ServiceRoute::Generic);
    }

    #[test]
    fn camera_count_uses_site_fallback() {
        let rec: RawAuditRecord = serde_json::from_value(json!({
            "site": {"cameras": [{"qty": 3}]},
            "load": {"cameras": []},
            "services": ["cctv"]
        }))
        .unwrap();
        let view = adapt(&rec, SizingConfig::standard());
        assert_eq!(view.derived_results.total_cameras, 1);
        assert_eq!(route(&rec), ServiceRoute::Vertical(ServiceKind::Cctv));
    }

    #[test]
    fn audit_label_prefers_id_over_client_name() {
        let rec: RawAuditRecord =
            serde_json::from_value(json!({"id": "AUD-7", "client": {"name": "Ade Stores"}})).unwrap();
        assert_eq!(audit_label(&rec).as_deref(), Some("AUD-7"));

        let rec: RawAuditRecord =
            serde_json::from_value(json!({"id": " ", "client": {"name": "Ade Stores"}})).unwrap();
        assert_eq!(audit_label(&rec).as_deref(), Some("Ade Stores"));
        assert_eq!(audit_label(&RawAuditRecord::default()), None);
    }

    #[test]
    fn stats_feed_shared_load_figures() {
        let rec: RawAuditRecord = serde_json::from_value(json!({
            "load": {"stats": {
                "totalLoad": 12.5,
                "totalDailyEnergy": 48,
                "criticalLoad": "4.5",
                "peakSimultaneousLoad": 9.1,
                "surgePower": 18
            }}
        }))
        .unwrap();
        let r = adapt(&rec, SizingConfig::standard()).derived_results;
        assert_eq!(r.total_load, 12.5);
        assert_eq!(r.daily_energy, 48.0);
        assert_eq!(r.critical_load, 4.5);
        assert_eq!(r.peak_load, 9.1);
        assert_eq!(r.surge_power, 18.0);
        assert_eq!(r.recommended_cable_size, "16mm²");
    }
}
