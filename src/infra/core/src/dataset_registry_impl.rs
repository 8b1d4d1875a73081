// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::BTreeMap;

use indoc::indoc;
use strix_bronze_core::*;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// In-memory catalog of extraction specifications, initialized once at
/// process start
pub struct DatasetRegistryImpl {
    specs: BTreeMap<DatasetName, DatasetSpec>,
}

impl DatasetRegistryImpl {
    pub fn new(specs: impl IntoIterator<Item = DatasetSpec>) -> Self {
        Self {
            specs: specs
                .into_iter()
                .map(|spec| (spec.name.clone(), spec))
                .collect(),
        }
    }

    /// The datasets landed from the `magenta` source
    pub fn builtin() -> Self {
        Self::new(builtin_specs())
    }
}

impl DatasetRegistry for DatasetRegistryImpl {
    fn resolve(&self, name: &DatasetName) -> Result<&DatasetSpec, UnknownDatasetError> {
        self.specs.get(name).ok_or_else(|| UnknownDatasetError {
            dataset_name: name.clone(),
            valid_names: self.names(),
        })
    }

    fn names(&self) -> Vec<DatasetName> {
        self.specs.keys().cloned().collect()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

fn builtin_specs() -> Vec<DatasetSpec> {
    vec![
        DatasetSpec::snapshot(
            "vehicles",
            QueryTemplate::new(
                indoc!(
                    r#"id, account_id, make, "year", color, "label", model, "domain", subtype,
                    engine_number, chassis_number, mileage, latitude, longitude, things,
                    location_datetime, created_datetime"#
                ),
                "strix.vvehicle",
            ),
        ),
        DatasetSpec::snapshot(
            "accounts",
            QueryTemplate::new(
                indoc!(
                    r#"id, identification_type, identification_number, "name", active,
                    country_id, created_datetime, services, last_update_datetime"#
                ),
                "strix.vaccount",
            ),
        ),
        // Device records keep their attributes in a JSONB document; the
        // projection flattens it into typed columns
        DatasetSpec::incremental(
            "devices",
            QueryTemplate::new(
                indoc!(
                    r"id::text AS id,
                    account_id::text AS account_id,
                    user_id::text AS user_id,
                    data ->> 'app_installation_id' AS app_installation_id,
                    data ->> 'app_version_id'      AS app_version_id,
                    (data ->> 'battery_level')::float AS battery_level,
                    data ->> 'created_by'          AS created_by,
                    to_timestamp((data ->> 'created_timestamp')::bigint / 1000) AS created_timestamp,
                    data ->> 'identifier'          AS identifier,
                    data ->> 'last_modified_by'    AS last_modified_by,
                    to_timestamp((data ->> 'last_modified_timestamp')::bigint / 1000) AS last_modified_timestamp,
                    (data ->> 'location_accuracy')::float AS location_accuracy,
                    data ->> 'location_coordinates' AS location_coordinates,
                    data ->> 'location_type'        AS location_type,
                    to_timestamp((data ->> 'location_timestamp')::bigint / 1000) AS location_timestamp,
                    data ->> 'make'                AS make,
                    data ->> 'model'               AS model,
                    data ->> 'name'                AS name,
                    (data ->> 'push_notifications_enabled')::boolean AS push_notifications_enabled,
                    data ->> 'system_name'         AS system_name,
                    data ->> 'system_version'      AS system_version,
                    data ->> 'token'               AS token,
                    (data ->> 'tracking_enabled')::boolean AS tracking_enabled,
                    last_update_datetime"
                ),
                "strix.device",
            ),
            "last_update_datetime",
        ),
        DatasetSpec::incremental(
            "flexes",
            QueryTemplate::new(
                indoc!(
                    r"thing.id::text AS id,
                    thing.account_id::text AS account_id,
                    thing.data -> 'info' ->> 'label' AS label,
                    ((((thing.data -> 'state') -> 'location') -> 'coordinates') ->> 0)::double precision AS latitude,
                    ((((thing.data -> 'state') -> 'location') -> 'coordinates') ->> 1)::double precision AS longitude,
                    (thing.data -> 'state' ->> 'battery_level')::float AS battery_level,
                    (thing.data -> 'things' ->> 0) AS things,
                    (thing.data -> 'state' -> 'location' -> 'coordinates')::text AS location,
                    to_timestamp(((thing.data #>> '{metadata,state,location,timestamp}')::bigint / 1000)) AS location_recorded_at,
                    to_timestamp(((thing.data ->> 'created_timestamp')::bigint / 1000)) AS created_datetime"
                ),
                "strix.thing",
            )
            .with_filter("(thing.data ->> 'type') = 'mrn:things:flex'"),
            "thing.last_update_datetime",
        ),
        DatasetSpec::snapshot(
            "gpses",
            QueryTemplate::new(
                "id, account_id, make, model, serial_number, parent_id, template_id, \
                 created_datetime",
                "strix.vgps",
            ),
        ),
        DatasetSpec::snapshot(
            "homes",
            QueryTemplate::new(
                indoc!(
                    r#"id, account_id, "label", address_line1, city, state, latitude, longitude,
                    things, status_datetime, created_datetime"#
                ),
                "strix.vhome",
            ),
        ),
        DatasetSpec::snapshot(
            "users",
            QueryTemplate::new(
                "id, account_id, username, first_name, last_name, signup_completed, has_ios, \
                 has_android, has_device, last_device_login",
                "strix.vuser",
            ),
        ),
    ]
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    const BUILTIN_NAMES: [&str; 7] = [
        "accounts", "devices", "flexes", "gpses", "homes", "users", "vehicles",
    ];

    #[test]
    fn resolves_every_builtin_dataset() {
        let registry = DatasetRegistryImpl::builtin();
        for name in BUILTIN_NAMES {
            let spec = registry
                .resolve(&DatasetName::new_unchecked(name))
                .unwrap();
            assert_eq!(spec.name.as_str(), name);
        }
    }

    #[test]
    fn unknown_dataset_reports_full_name_set() {
        let registry = DatasetRegistryImpl::builtin();
        let err = registry
            .resolve(&DatasetName::new_unchecked("boats"))
            .unwrap_err();

        assert_eq!(err.dataset_name.as_str(), "boats");
        assert_eq!(
            err.valid_names
                .iter()
                .map(DatasetName::as_str)
                .collect::<Vec<_>>(),
            BUILTIN_NAMES,
        );
        assert!(err.to_string().contains("vehicles"));
    }

    #[test]
    fn names_are_sorted_and_complete() {
        let registry = DatasetRegistryImpl::builtin();
        assert_eq!(
            registry
                .names()
                .iter()
                .map(DatasetName::as_str)
                .collect::<Vec<_>>(),
            BUILTIN_NAMES,
        );
    }

    #[test]
    fn incremental_specs_carry_watermark_columns() {
        let registry = DatasetRegistryImpl::builtin();
        for (name, expected) in [
            ("devices", Some("last_update_datetime")),
            ("flexes", Some("thing.last_update_datetime")),
            ("vehicles", None),
        ] {
            let spec = registry
                .resolve(&DatasetName::new_unchecked(name))
                .unwrap();
            assert_eq!(spec.watermark_column.as_deref(), expected);
        }
    }
}
