#[cfg(test)]
mod tests {
    use mnemo_core::{EventType, Lifecycle, MemoryKind, MemoryScope, MemoryUnit, MnemoError};
    use mnemo_memory::MemoryStore;

    fn unit(kind: MemoryKind, content: &str, scope: MemoryScope, session: &str) -> MemoryUnit {
        MemoryUnit::new(kind, content, scope, session)
    }

    fn store() -> MemoryStore {
        MemoryStore::open_in_memory(3).unwrap()
    }

    // ── Working Memory ─────────────────────────────────────────

    mod working {
        use super::*;
        use mnemo_memory::WorkingStore;

        #[test]
        fn test_put_and_get_active() {
            let mem = WorkingStore::new();
            mem.put(unit(MemoryKind::Fact, "a", MemoryScope::Session, "s1"), 3600);
            mem.put(unit(MemoryKind::Fact, "b", MemoryScope::Session, "s1"), 3600);
            mem.put(unit(MemoryKind::Fact, "c", MemoryScope::Session, "s2"), 3600);
            let active = mem.get_active("s1");
            assert_eq!(active.len(), 2);
            assert!(active.iter().all(|u| u.source_session == "s1"));
        }

        #[test]
        fn test_put_overwrites_by_id() {
            let mem = WorkingStore::new();
            let mut u = unit(MemoryKind::Fact, "first", MemoryScope::Session, "s1");
            mem.put(u.clone(), 60);
            u.content = "second".into();
            mem.put(u.clone(), 60);
            assert_eq!(mem.len(), 1);
            assert_eq!(mem.get_by_id(u.id).unwrap().content, "second");
        }

        #[test]
        fn test_expired_entries_are_never_returned() {
            let mem = WorkingStore::new();
            let expired = unit(MemoryKind::Fact, "gone", MemoryScope::Session, "s1");
            let expired_id = expired.id;
            mem.put(expired, 0);
            mem.put(unit(MemoryKind::Fact, "kept", MemoryScope::Session, "s1"), 3600);

            let active = mem.get_active("s1");
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].content, "kept");
            assert!(mem.get_by_id(expired_id).is_none());
            assert!(mem.entry(expired_id).is_none());
        }

        #[test]
        fn test_get_active_skips_non_active_lifecycle() {
            let mem = WorkingStore::new();
            let mut u = unit(MemoryKind::Fact, "old", MemoryScope::Session, "s1");
            u.lifecycle = Lifecycle::Deprecated;
            mem.put(u.clone(), 3600);
            assert!(mem.get_active("s1").is_empty());
            // Still reachable by id.
            assert!(mem.get_by_id(u.id).is_some());
        }

        #[test]
        fn test_sweep_counts_evictions() {
            let mem = WorkingStore::new();
            mem.put(unit(MemoryKind::Fact, "a", MemoryScope::Session, "s1"), 0);
            mem.put(unit(MemoryKind::Fact, "b", MemoryScope::Session, "s2"), 0);
            mem.put(unit(MemoryKind::Fact, "c", MemoryScope::Session, "s2"), 3600);
            assert_eq!(mem.sweep(), 2);
            assert_eq!(mem.len(), 1);
            assert_eq!(mem.sweep(), 0);
        }

        #[test]
        fn test_entry_records_ttl() {
            let mem = WorkingStore::new();
            let u = unit(MemoryKind::Assumption, "x", MemoryScope::Project, "s1");
            let entry = mem.put(u.clone(), 86_400);
            assert_eq!(entry.ttl_seconds, 86_400);
            assert!(entry.expires_at > u.created_at);
            assert_eq!(mem.entry(u.id).unwrap().ttl_seconds, 86_400);
        }

        #[test]
        fn test_huge_ttl_does_not_overflow() {
            let mem = WorkingStore::new();
            let u = unit(MemoryKind::Fact, "forever", MemoryScope::Global, "s1");
            mem.put(u.clone(), u64::MAX);
            assert_eq!(mem.get_active("s1").len(), 1);
        }

        #[test]
        fn test_clear_session() {
            let mem = WorkingStore::new();
            mem.put(unit(MemoryKind::Fact, "a", MemoryScope::Session, "s1"), 60);
            mem.put(unit(MemoryKind::Fact, "b", MemoryScope::Session, "s2"), 60);
            assert_eq!(mem.clear_session("s1"), 1);
            assert!(mem.get_active("s1").is_empty());
            assert_eq!(mem.get_active("s2").len(), 1);
        }

        #[test]
        fn test_concurrent_puts() {
            use std::sync::Arc;
            let mem = Arc::new(WorkingStore::new());
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let mem = Arc::clone(&mem);
                    std::thread::spawn(move || {
                        for i in 0..50 {
                            mem.put(
                                unit(MemoryKind::Fact, &format!("{t}-{i}"), MemoryScope::Session, "s1"),
                                3600,
                            );
                            let _ = mem.get_active("s1");
                        }
                    })
                })
                .collect();
            for h in handles {
                h.join().unwrap();
            }
            assert_eq!(mem.get_active("s1").len(), 400);
        }
    }

    // ── Episodic Memory ────────────────────────────────────────

    mod episodic {
        use super::*;
        use chrono::{Duration, Utc};

        #[test]
        fn test_sequence_numbers_strictly_increase_across_sessions() {
            let store = store();
            let mut last = 0;
            for i in 0..10 {
                let session = if i % 2 == 0 { "s1" } else { "s2" };
                let event = store
                    .episodic
                    .append(
                        &unit(MemoryKind::Decision, &format!("d{i}"), MemoryScope::Project, session),
                        EventType::Decision,
                    )
                    .unwrap();
                assert!(event.sequence_number > last);
                last = event.sequence_number;
            }
            assert_eq!(store.episodic.last_sequence().unwrap(), last);
            assert_eq!(store.episodic.count().unwrap(), 10);
        }

        #[test]
        fn test_timeline_is_ordered_and_session_scoped() {
            let store = store();
            for content in ["first", "second", "third"] {
                store
                    .episodic
                    .append(&unit(MemoryKind::Decision, content, MemoryScope::Project, "s1"), EventType::Decision)
                    .unwrap();
                store
                    .episodic
                    .append(&unit(MemoryKind::Fact, "noise", MemoryScope::Project, "s2"), EventType::Change)
                    .unwrap();
            }
            let timeline = store.episodic.timeline("s1").unwrap();
            let contents: Vec<_> = timeline.iter().map(|e| e.unit.content.as_str()).collect();
            assert_eq!(contents, vec!["first", "second", "third"]);
            assert!(timeline.windows(2).all(|w| w[0].sequence_number < w[1].sequence_number));
            assert_eq!(store.episodic.count_for_session("s1").unwrap(), 3);
        }

        #[test]
        fn test_recent_returns_last_n_ascending() {
            let store = store();
            for i in 0..5 {
                store
                    .episodic
                    .append(&unit(MemoryKind::Decision, &format!("e{i}"), MemoryScope::Project, "s1"), EventType::Decision)
                    .unwrap();
            }
            let recent = store.episodic.recent(3).unwrap();
            let contents: Vec<_> = recent.iter().map(|e| e.unit.content.as_str()).collect();
            assert_eq!(contents, vec!["e2", "e3", "e4"]);
            assert_eq!(store.episodic.recent(100).unwrap().len(), 5);
        }

        #[test]
        fn test_timeline_tail_returns_last_n_not_one() {
            let store = store();
            for i in 0..6 {
                store
                    .episodic
                    .append(&unit(MemoryKind::Decision, &format!("e{i}"), MemoryScope::Project, "s1"), EventType::Decision)
                    .unwrap();
            }
            let tail = store.episodic.timeline_tail("s1", 4).unwrap();
            let contents: Vec<_> = tail.iter().map(|e| e.unit.content.as_str()).collect();
            assert_eq!(contents, vec!["e2", "e3", "e4", "e5"]);
        }

        #[test]
        fn test_by_type_newest_first() {
            let store = store();
            store.episodic.append(&unit(MemoryKind::Decision, "d1", MemoryScope::Project, "s1"), EventType::Decision).unwrap();
            store.episodic.append(&unit(MemoryKind::Fact, "c1", MemoryScope::Project, "s1"), EventType::Change).unwrap();
            store.episodic.append(&unit(MemoryKind::Decision, "d2", MemoryScope::Project, "s1"), EventType::Decision).unwrap();
            let decisions = store.episodic.by_type(EventType::Decision, 10).unwrap();
            let contents: Vec<_> = decisions.iter().map(|e| e.unit.content.as_str()).collect();
            assert_eq!(contents, vec!["d2", "d1"]);
            assert_eq!(store.episodic.by_type(EventType::Transition, 10).unwrap().len(), 0);
        }

        #[test]
        fn test_by_date_range() {
            let store = store();
            let mut old = unit(MemoryKind::Decision, "old", MemoryScope::Project, "s1");
            old.created_at = Utc::now() - Duration::days(10);
            store.episodic.append(&old, EventType::Decision).unwrap();
            store.episodic.append(&unit(MemoryKind::Decision, "new", MemoryScope::Project, "s1"), EventType::Decision).unwrap();

            let events = store
                .episodic
                .by_date_range(Utc::now() - Duration::days(1), Utc::now() + Duration::days(1))
                .unwrap();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].unit.content, "new");
        }

        #[test]
        fn test_same_unit_can_be_logged_twice() {
            let store = store();
            let u = unit(MemoryKind::Decision, "d", MemoryScope::Project, "s1");
            let a = store.episodic.append(&u, EventType::Decision).unwrap();
            let b = store.episodic.append(&u, EventType::Transition).unwrap();
            assert!(b.sequence_number > a.sequence_number);
            assert_eq!(store.episodic.timeline("s1").unwrap().len(), 2);
        }

        #[test]
        fn test_round_trip_preserves_fields() {
            let store = store();
            let mut u = unit(MemoryKind::Constraint, "must be offline", MemoryScope::Global, "s1").with_confidence(0.42);
            u.metadata.insert("source".into(), serde_json::json!("chat"));
            store.episodic.append(&u, EventType::Change).unwrap();
            let event = &store.episodic.timeline("s1").unwrap()[0];
            assert_eq!(event.unit.id, u.id);
            assert_eq!(event.unit.kind, MemoryKind::Constraint);
            assert_eq!(event.unit.scope, MemoryScope::Global);
            assert_eq!(event.unit.confidence, 0.42);
            assert_eq!(event.unit.metadata["source"], "chat");
            assert_eq!(event.event_type, EventType::Change);
        }

        #[test]
        fn test_concurrent_appends_get_unique_sequence_numbers() {
            use std::collections::HashSet;
            use std::sync::Arc;

            let store = Arc::new(store());
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let store = Arc::clone(&store);
                    std::thread::spawn(move || {
                        (0..25)
                            .map(|i| {
                                store
                                    .episodic
                                    .append(
                                        &unit(MemoryKind::Decision, &format!("{t}-{i}"), MemoryScope::Project, &format!("s{t}")),
                                        EventType::Decision,
                                    )
                                    .unwrap()
                                    .sequence_number
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            let mut seen = HashSet::new();
            for h in handles {
                for seq in h.join().unwrap() {
                    assert!(seen.insert(seq), "sequence number {seq} handed out twice");
                }
            }
            assert_eq!(seen.len(), 200);
        }

        #[test]
        fn test_log_survives_reopen() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("mnemo.db");
            let first = {
                let store = MemoryStore::open(&path, 3).unwrap();
                store.episodic.append(&unit(MemoryKind::Decision, "persist me", MemoryScope::Project, "s1"), EventType::Decision).unwrap().sequence_number
            };
            let store = MemoryStore::open(&path, 3).unwrap();
            let timeline = store.episodic.timeline("s1").unwrap();
            assert_eq!(timeline.len(), 1);
            assert_eq!(timeline[0].unit.content, "persist me");
            let next = store.episodic.append(&unit(MemoryKind::Decision, "after restart", MemoryScope::Project, "s1"), EventType::Decision).unwrap();
            assert!(next.sequence_number > first);
        }
    }

    // ── Semantic Memory ────────────────────────────────────────

    mod semantic {
        use super::*;
        use mnemo_memory::cosine_similarity;

        #[test]
        fn test_search_ranks_by_similarity() {
            let store = store();
            let near = unit(MemoryKind::Fact, "near", MemoryScope::Project, "s1").with_confidence(0.9);
            let far = unit(MemoryKind::Fact, "far", MemoryScope::Project, "s1").with_confidence(0.9);
            store.semantic.upsert(&far, &[0.0, 1.0, 0.0]).unwrap();
            store.semantic.upsert(&near, &[1.0, 0.1, 0.0]).unwrap();

            let hits = store.semantic.search(&[1.0, 0.0, 0.0], 10, None, None, 0.5).unwrap();
            assert_eq!(hits.len(), 2);
            assert_eq!(hits[0].0.id, near.id);
            assert!(hits[0].1 > hits[1].1);
            assert!(hits[0].0.embedding.is_some());
        }

        #[test]
        fn test_search_respects_top_k_and_min_confidence() {
            let store = store();
            for i in 0..5 {
                let u = unit(MemoryKind::Fact, &format!("f{i}"), MemoryScope::Project, "s1")
                    .with_confidence(0.2 * i as f64);
                store.semantic.upsert(&u, &[1.0, i as f32, 0.0]).unwrap();
            }
            let hits = store.semantic.search(&[1.0, 0.0, 0.0], 10, None, None, 0.5).unwrap();
            assert_eq!(hits.len(), 2);
            assert!(hits.iter().all(|(u, _)| u.confidence >= 0.5));
            assert_eq!(store.semantic.search(&[1.0, 0.0, 0.0], 1, None, None, 0.0).unwrap().len(), 1);
            assert!(store.semantic.search(&[1.0, 0.0, 0.0], 0, None, None, 0.0).unwrap().is_empty());
        }

        #[test]
        fn test_search_filters() {
            let store = store();
            let fact = unit(MemoryKind::Fact, "f", MemoryScope::Project, "s1").with_confidence(0.9);
            let constraint = unit(MemoryKind::Constraint, "c", MemoryScope::Global, "s1").with_confidence(0.9);
            store.semantic.upsert(&fact, &[1.0, 0.0, 0.0]).unwrap();
            store.semantic.upsert(&constraint, &[1.0, 0.0, 0.0]).unwrap();

            let hits = store.semantic.search(&[1.0, 0.0, 0.0], 10, Some(&[MemoryScope::Global]), None, 0.0).unwrap();
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].0.id, constraint.id);

            let hits = store.semantic.search(&[1.0, 0.0, 0.0], 10, None, Some(&[MemoryKind::Fact]), 0.0).unwrap();
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].0.id, fact.id);

            // An empty allow-list restricts nothing.
            let hits = store.semantic.search(&[1.0, 0.0, 0.0], 10, Some(&[]), Some(&[]), 0.0).unwrap();
            assert_eq!(hits.len(), 2);
        }

        #[test]
        fn test_search_updates_retrieval_stats() {
            let store = store();
            let u = unit(MemoryKind::Fact, "f", MemoryScope::Project, "s1").with_confidence(0.9);
            store.semantic.upsert(&u, &[1.0, 0.0, 0.0]).unwrap();
            assert_eq!(store.semantic.get(u.id).unwrap().unwrap().retrieval_count, 0);

            store.semantic.search(&[1.0, 0.0, 0.0], 5, None, None, 0.0).unwrap();
            store.semantic.search(&[1.0, 0.0, 0.0], 5, None, None, 0.0).unwrap();
            let record = store.semantic.get(u.id).unwrap().unwrap();
            assert_eq!(record.retrieval_count, 2);
            assert!(record.last_retrieved.is_some());
        }

        #[test]
        fn test_deprecated_never_returned_by_search() {
            let store = store();
            let u = unit(MemoryKind::Decision, "use postgres", MemoryScope::Project, "s1").with_confidence(0.9);
            store.semantic.upsert(&u, &[1.0, 0.0, 0.0]).unwrap();
            store.semantic.deprecate(u.id).unwrap();

            for (scopes, kinds) in [
                (None, None),
                (Some(&[MemoryScope::Project][..]), None),
                (None, Some(&[MemoryKind::Decision][..])),
            ] {
                let hits = store.semantic.search(&[1.0, 0.0, 0.0], 10, scopes, kinds, 0.0).unwrap();
                assert!(hits.iter().all(|(h, _)| h.id != u.id));
            }
            let record = store.semantic.get(u.id).unwrap().unwrap();
            assert_eq!(record.unit.lifecycle, Lifecycle::Deprecated);
            assert!(store.semantic.by_scope(MemoryScope::Project).unwrap().is_empty());
        }

        #[test]
        fn test_deprecate_records_provenance() {
            let store = store();
            let u = unit(MemoryKind::Decision, "d", MemoryScope::Project, "s1");
            store.semantic.upsert(&u, &[1.0, 0.0, 0.0]).unwrap();
            let mut provenance = serde_json::Map::new();
            provenance.insert("deprecated_reason".into(), serde_json::json!("superseded"));
            store.semantic.deprecate_with_provenance(u.id, provenance).unwrap();
            let record = store.semantic.get(u.id).unwrap().unwrap();
            assert_eq!(record.unit.metadata["deprecated_reason"], "superseded");
        }

        #[test]
        fn test_deprecate_and_reinforce_unknown_id_fail() {
            let store = store();
            let id = uuid::Uuid::new_v4();
            assert!(matches!(store.semantic.deprecate(id), Err(MnemoError::NotFound { .. })));
            assert!(matches!(store.semantic.reinforce(id, 0.1), Err(MnemoError::NotFound { .. })));
        }

        #[test]
        fn test_reinforce_caps_at_one() {
            let store = store();
            let u = unit(MemoryKind::Fact, "f", MemoryScope::Project, "s1").with_confidence(0.95);
            store.semantic.upsert(&u, &[1.0, 0.0, 0.0]).unwrap();
            let confidence = store.semantic.reinforce(u.id, 0.1).unwrap();
            assert_eq!(confidence, 1.0);
            let record = store.semantic.get(u.id).unwrap().unwrap();
            assert_eq!(record.unit.confidence, 1.0);
            assert_eq!(record.unit.lifecycle, Lifecycle::Reinforced);

            // Idempotent in lifecycle, still capped.
            assert_eq!(store.semantic.reinforce(u.id, 0.1).unwrap(), 1.0);
            assert_eq!(store.semantic.get(u.id).unwrap().unwrap().unit.lifecycle, Lifecycle::Reinforced);
        }

        #[test]
        fn test_reinforce_adds_boost() {
            let store = store();
            let u = unit(MemoryKind::Fact, "f", MemoryScope::Project, "s1").with_confidence(0.5);
            store.semantic.upsert(&u, &[1.0, 0.0, 0.0]).unwrap();
            let confidence = store.semantic.reinforce(u.id, 0.25).unwrap();
            assert!((confidence - 0.75).abs() < 1e-12);
            assert!(store.semantic.reinforce(u.id, -0.1).is_err());
        }

        #[test]
        fn test_reinforce_deprecated_is_rejected() {
            let store = store();
            let u = unit(MemoryKind::Fact, "f", MemoryScope::Project, "s1");
            store.semantic.upsert(&u, &[1.0, 0.0, 0.0]).unwrap();
            store.semantic.deprecate(u.id).unwrap();
            assert!(matches!(
                store.semantic.reinforce(u.id, 0.1),
                Err(MnemoError::InvalidTransition { .. })
            ));
        }

        #[test]
        fn test_upsert_is_idempotent_by_id() {
            let store = store();
            let mut u = unit(MemoryKind::Fact, "v1", MemoryScope::Project, "s1");
            store.semantic.upsert(&u, &[1.0, 0.0, 0.0]).unwrap();
            u.content = "v2".into();
            store.semantic.upsert(&u, &[0.0, 1.0, 0.0]).unwrap();
            assert_eq!(store.semantic.count().unwrap(), 1);
            let record = store.semantic.get(u.id).unwrap().unwrap();
            assert_eq!(record.unit.content, "v2");
            assert_eq!(record.embedding, vec![0.0, 1.0, 0.0]);
        }

        #[test]
        fn test_upsert_never_revives_deprecated_unit() {
            let store = store();
            let u = unit(MemoryKind::Decision, "use postgres", MemoryScope::Project, "s1").with_confidence(0.9);
            store.semantic.upsert(&u, &[1.0, 0.0, 0.0]).unwrap();
            store.semantic.deprecate(u.id).unwrap();

            let err = store.semantic.upsert(&u, &[1.0, 0.0, 0.0]).unwrap_err();
            assert!(matches!(
                err,
                MnemoError::InvalidTransition { from: Lifecycle::Deprecated, to: Lifecycle::Active, .. }
            ));

            let record = store.semantic.get(u.id).unwrap().unwrap();
            assert_eq!(record.unit.lifecycle, Lifecycle::Deprecated);
            let hits = store.semantic.search(&[1.0, 0.0, 0.0], 10, None, None, 0.0).unwrap();
            assert!(hits.is_empty());
        }

        #[test]
        fn test_upsert_keeps_lifecycle_and_never_raises_confidence() {
            let store = store();
            let u = unit(MemoryKind::Fact, "f", MemoryScope::Project, "s1").with_confidence(0.5);
            store.semantic.upsert(&u, &[1.0, 0.0, 0.0]).unwrap();
            store.semantic.reinforce(u.id, 0.1).unwrap();

            store.semantic.upsert(&u.clone().with_confidence(0.9), &[1.0, 0.0, 0.0]).unwrap();
            let record = store.semantic.get(u.id).unwrap().unwrap();
            assert_eq!(record.unit.lifecycle, Lifecycle::Reinforced);
            assert!((record.unit.confidence - 0.6).abs() < 1e-12);

            store.semantic.upsert(&u.clone().with_confidence(0.4), &[1.0, 0.0, 0.0]).unwrap();
            let record = store.semantic.get(u.id).unwrap().unwrap();
            assert_eq!(record.unit.confidence, 0.4);
            assert_eq!(record.unit.lifecycle, Lifecycle::Reinforced);
        }

        #[test]
        fn test_dimension_mismatch_rejected() {
            let store = store();
            let u = unit(MemoryKind::Fact, "f", MemoryScope::Project, "s1");
            assert!(matches!(store.semantic.upsert(&u, &[1.0, 0.0]), Err(MnemoError::Validation { .. })));
            assert!(matches!(
                store.semantic.search(&[1.0], 5, None, None, 0.0),
                Err(MnemoError::Embedding(_))
            ));
        }

        #[test]
        fn test_by_scope_round_trip() {
            let store = store();
            let original = unit(MemoryKind::Constraint, "latency under 200ms", MemoryScope::Project, "s1");
            store.semantic.upsert(&original, &[0.3, 0.3, 0.3]).unwrap();
            let units = store.semantic.by_scope(MemoryScope::Project).unwrap();
            assert_eq!(units.len(), 1);
            assert_eq!(units[0].content, original.content);
            assert_eq!(units[0].kind, original.kind);
            assert_eq!(units[0].scope, original.scope);
            assert!(store.semantic.by_scope(MemoryScope::Global).unwrap().is_empty());
        }

        #[test]
        fn test_index_survives_reopen() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("mnemo.db");
            let u = unit(MemoryKind::Fact, "durable", MemoryScope::Global, "s1").with_confidence(0.8);
            {
                let store = MemoryStore::open(&path, 3).unwrap();
                store.semantic.upsert(&u, &[0.5, 0.5, 0.0]).unwrap();
            }
            let store = MemoryStore::open(&path, 3).unwrap();
            let hits = store.semantic.search(&[0.5, 0.5, 0.0], 1, None, None, 0.5).unwrap();
            assert_eq!(hits[0].0.id, u.id);
        }

        #[test]
        fn test_cosine_similarity() {
            assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
            assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
            assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
            assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        }
    }

    // ── Unified store ──────────────────────────────────────────

    mod store {
        use super::*;

        #[test]
        fn test_visible_units_union() {
            let store = store();
            store.working.put(unit(MemoryKind::Fact, "w", MemoryScope::Session, "s1"), 3600);
            store.episodic.append(&unit(MemoryKind::Decision, "e", MemoryScope::Project, "s1"), EventType::Decision).unwrap();
            store.semantic.upsert(&unit(MemoryKind::Fact, "sem-mine", MemoryScope::Session, "s1"), &[1.0, 0.0, 0.0]).unwrap();
            store.semantic.upsert(&unit(MemoryKind::Fact, "sem-other", MemoryScope::Session, "s2"), &[1.0, 0.0, 0.0]).unwrap();
            store.semantic.upsert(&unit(MemoryKind::Fact, "sem-project", MemoryScope::Project, "s1"), &[1.0, 0.0, 0.0]).unwrap();

            let mut contents: Vec<_> = store
                .visible_units("s1")
                .unwrap()
                .into_iter()
                .map(|u| u.content)
                .collect();
            contents.sort();
            assert_eq!(contents, vec!["e", "sem-mine", "w"]);
        }
    }
}
