use super::*;

#[cfg(test)]
mod classification_tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_classify_started_and_completed() {
        let started = Marker::classify("manifests/8F0TPCmdNQ6JTRpiLj2TmW.started.manifest").unwrap();
        let completed = Marker::classify("manifests/8F0TPCmdNQ6JTRpiLj2TmW.completed.manifest").unwrap();

        assert_eq!(started.kind, MarkerKind::Started);
        assert_eq!(completed.kind, MarkerKind::Completed);
        assert_eq!(started.group.as_str(), "manifests/8F0TPCmdNQ6JTRpiLj2TmW");
        assert_eq!(started.group, completed.group);
    }

    #[test]
    fn test_classify_ignores_other_objects() {
        assert!(Marker::classify("manifests/").is_none());
        assert!(Marker::classify("manifests/2023/01/01/00/journal.ion").is_none());
        assert!(Marker::classify("manifests/README").is_none());
    }

    #[test]
    fn test_group_ids_do_not_match_by_containment() {
        let short = Marker::classify("manifests/abc.started.manifest").unwrap();
        let long = Marker::classify("manifests/abcdef.completed.manifest").unwrap();

        assert_ne!(short.group, long.group);
    }

    #[test]
    fn test_classify_uses_file_name_only() {
        let marker = Marker::classify("started.manifest.d/run1.completed.manifest").unwrap();

        assert_eq!(marker.kind, MarkerKind::Completed);
        assert_eq!(marker.group.as_str(), "started.manifest.d/run1");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(parse_timestamp("2023-01-01T00:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-01T00:00:00.000Z"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-01T01:00:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-01T00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-01T00:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-01T01:00+01:00"), Some(expected));
        assert_eq!(parse_timestamp("2023-01-01T00:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_started_manifest_from_json() {
        let body = br#"{
            "exportId": "8F0TPCmdNQ6JTRpiLj2TmW",
            "bucket": "ledger-exports",
            "prefix": "manifests/",
            "objectEncryptionType": "NO_ENCRYPTION",
            "inclusiveStartTime": "2022-12-31T00:00Z",
            "exclusiveEndTime": "2023-01-01T00:00Z"
        }"#;

        let manifest = StartedManifest::from_slice(body).unwrap();

        assert_eq!(manifest.export_id, "8F0TPCmdNQ6JTRpiLj2TmW");
        assert_eq!(
            manifest.exclusive_end_time,
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            manifest.inclusive_start_time,
            Some(Utc.with_ymd_and_hms(2022, 12, 31, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_started_manifest_from_ion_text() {
        let body = br#"{exportId:"8F0TPCmdNQ6JTRpiLj2TmW",bucket:"ledger-exports",prefix:"manifests/",objectEncryptionType:"NO_ENCRYPTION",outputFormat:"ION_TEXT",inclusiveStartTime:2022-12-31T00:00:00.000Z,exclusiveEndTime:2023-01-01T00:00:00.000Z}"#;

        let manifest = StartedManifest::from_slice(body).unwrap();

        assert_eq!(manifest.export_id, "8F0TPCmdNQ6JTRpiLj2TmW");
        assert_eq!(
            manifest.exclusive_end_time,
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            manifest.inclusive_start_time,
            Some(Utc.with_ymd_and_hms(2022, 12, 31, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_ion_timestamp_offsets_are_normalised() {
        let body = b"{exportId:\"abc\", exclusiveEndTime:2023-01-01T01:00+01:00}";

        let manifest = StartedManifest::from_slice(body).unwrap();

        assert_eq!(
            manifest.exclusive_end_time,
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(manifest.inclusive_start_time, None);
    }

    #[test]
    fn test_started_manifest_requires_end_time() {
        assert_eq!(
            StartedManifest::from_slice(br#"{"exportId": "abc"}"#),
            Err(ManifestError::MissingField("exclusiveEndTime"))
        );
        assert!(matches!(
            StartedManifest::from_slice(br#"{"exportId": "abc", "exclusiveEndTime": "soon"}"#),
            Err(ManifestError::InvalidField { field: "exclusiveEndTime", .. })
        ));
        assert!(matches!(
            StartedManifest::from_slice(br#"{exportId: 7, exclusiveEndTime: 2023-01-01T00:00Z}"#),
            Err(ManifestError::InvalidField { field: "exportId", .. })
        ));
    }

    #[test]
    fn test_started_manifest_rejects_non_struct_bodies() {
        assert_eq!(
            StartedManifest::from_slice(br#""just a string""#),
            Err(ManifestError::NotAStruct)
        );
        assert!(matches!(
            StartedManifest::from_slice(b"not a manifest"),
            Err(ManifestError::Decode(_))
        ));
        assert!(matches!(StartedManifest::from_slice(b"{ not json"), Err(ManifestError::Decode(_))));
    }
}

#[cfg(test)]
mod scanner_tests {
    use super::*;
    use crate::modules::error::ExportError;
    use crate::modules::store::{MemoryObjectStore, StoreOp};
    use std::sync::Arc;

    const BUCKET: &str = "ledger-exports";
    const PREFIX: &str = "manifests/";

    fn manifest(export_id: &str, end: &str) -> String {
        format!(r#"{{"exportId": "{}", "exclusiveEndTime": "{}"}}"#, export_id, end)
    }

    fn scanner(store: &MemoryObjectStore) -> MarkerScanner {
        MarkerScanner::new(Arc::new(store.clone()), BUCKET.to_string(), PREFIX.to_string())
    }

    #[tokio::test]
    async fn test_empty_listing_is_not_an_error() {
        let store = MemoryObjectStore::new();

        let scan = scanner(&store).scan().await.unwrap();

        assert!(scan.is_empty());
    }

    #[tokio::test]
    async fn test_scan_classifies_and_sorts() {
        let store = MemoryObjectStore::new();
        store.put(BUCKET, "manifests/b.started.manifest", manifest("b", "2023-01-02T00:00Z")).await;
        store.put(BUCKET, "manifests/a.started.manifest", manifest("a", "2023-01-01T00:00Z")).await;
        store.put(BUCKET, "manifests/a.completed.manifest", "opaque body").await;
        store.put(BUCKET, "manifests/notes.txt", "ignored").await;

        let scan = scanner(&store).scan().await.unwrap();

        let started: Vec<_> = scan.started.iter().map(|s| s.export_id()).collect();
        assert_eq!(started, vec!["a", "b"]);
        assert_eq!(scan.completed.len(), 1);
        assert!(scan.has_completed(scan.started[0].group()));
        assert!(!scan.has_completed(scan.started[1].group()));
    }

    #[tokio::test]
    async fn test_scan_does_not_descend_into_archive() {
        let store = MemoryObjectStore::new();
        store
            .put(
                BUCKET,
                "manifests/completed/2023/01/01/00/a.started.manifest",
                manifest("a", "2023-01-01T00:00Z"),
            )
            .await;
        store
            .put(BUCKET, "manifests/failed/manifests/x.started.manifest", manifest("x", "2023-01-01T00:00Z"))
            .await;

        let scan = scanner(&store).scan().await.unwrap();

        assert!(scan.is_empty());
    }

    #[tokio::test]
    async fn test_completed_bodies_are_not_read() {
        let store = MemoryObjectStore::new();
        store.put(BUCKET, "manifests/a.completed.manifest", "opaque").await;
        store.fail_on(StoreOp::Get, "manifests/a.completed.manifest").await;

        let scan = scanner(&store).scan().await.unwrap();

        assert_eq!(scan.completed.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_marker_is_skipped() {
        let store = MemoryObjectStore::new();
        store.put(BUCKET, "manifests/a.started.manifest", manifest("a", "2023-01-01T00:00Z")).await;
        store.put(BUCKET, "manifests/bad.started.manifest", "{ not json").await;

        let scan = scanner(&store).scan().await.unwrap();

        assert_eq!(scan.started.len(), 1);
        assert_eq!(scan.started[0].export_id(), "a");
        let malformed: Vec<_> = scan.malformed_started.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(malformed, vec!["manifests/bad.started.manifest"]);
        assert!(!scan.is_empty());
    }

    #[tokio::test]
    async fn test_scan_reads_ion_text_manifests() {
        let store = MemoryObjectStore::new();
        store
            .put(
                BUCKET,
                "manifests/ABC.started.manifest",
                "{exportId:\"ABC\",exclusiveEndTime:2023-01-01T00:00:00.000Z}",
            )
            .await;

        let scan = scanner(&store).scan().await.unwrap();

        assert_eq!(scan.started.len(), 1);
        assert_eq!(scan.started[0].export_id(), "ABC");
        assert!(scan.malformed_started.is_empty());
    }

    #[tokio::test]
    async fn test_all_markers_malformed_is_an_error() {
        let store = MemoryObjectStore::new();
        store.put(BUCKET, "manifests/bad.started.manifest", "{ not json").await;
        store.put(BUCKET, "manifests/worse.started.manifest", r#"{"exportId": 7}"#).await;

        let err = scanner(&store).scan().await.unwrap_err();

        assert!(matches!(err, ExportError::AllMarkersMalformed { count: 2, .. }));
    }

    #[tokio::test]
    async fn test_read_failure_aborts_scan() {
        let store = MemoryObjectStore::new();
        store.put(BUCKET, "manifests/a.started.manifest", manifest("a", "2023-01-01T00:00Z")).await;
        store.fail_on(StoreOp::Get, "manifests/a.started.manifest").await;

        let err = scanner(&store).scan().await.unwrap_err();

        assert!(matches!(err, ExportError::Store(_)));
    }
}
