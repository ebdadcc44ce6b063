//! Backend Shard Tests
//!
//! Validates the availability loader and the query answering path.
//!
//! ## Test Scopes
//! - **Loader**: legacy file format tolerance, configuration errors.
//! - **Answering**: fold-intersection over matched users, the no-data
//!   versus zero-overlap distinction, registry/table mismatch handling.
//! - **Serving loop**: register-then-answer over a real UDP socket.

#[cfg(test)]
mod tests {
    use crate::backend::loader::parse_availability;
    use crate::backend::service::{BackendService, MAX_DATAGRAM};
    use crate::config::BackendConfig;
    use crate::error::Error;
    use crate::interval::types::IntervalSet;
    use crate::registry::types::{BackendId, QueryId, ShardMessage};
    use std::collections::HashMap;
    use std::io::Write;
    use tokio::net::UdpSocket;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn table(entries: &[(&str, &str)]) -> HashMap<String, IntervalSet> {
        entries
            .iter()
            .map(|(name, wire)| (name.to_string(), IntervalSet::from_wire(wire).unwrap()))
            .collect()
    }

    fn config(id: &str, coordinator: &str) -> BackendConfig {
        BackendConfig {
            id: BackendId::new(id),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            coordinator_addr: coordinator.parse().unwrap(),
            data_path: "unused.txt".into(),
        }
    }

    // ============================================================
    // LOADER TESTS
    // ============================================================

    #[test]
    fn test_parse_availability_basic() {
        let table = parse_availability("alice;[9,12] [14,18]\nbob;[10,16]\n").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table["alice"].to_wire(), "[9,12] [14,18]");
        assert_eq!(table["bob"].to_wire(), "[10,16]");
    }

    #[test]
    fn test_parse_availability_legacy_spacing() {
        let table = parse_availability("alice ; [1,5], [7, 9]\n\ncarol;[13,20]\n").unwrap();

        assert_eq!(table["alice"].to_wire(), "[1,5] [7,9]");
        assert_eq!(table["carol"].to_wire(), "[13,20]");
    }

    #[test]
    fn test_parse_availability_empty_set() {
        let table = parse_availability("ghost;[]\n").unwrap();

        assert!(table["ghost"].is_empty());
    }

    #[test]
    fn test_parse_availability_rejects_missing_separator() {
        let err = parse_availability("alice [9,12]\n").unwrap_err();

        match err {
            Error::MalformedAvailability { line, .. } => assert_eq!(line, 1),
            other => panic!("expected MalformedAvailability, got {other}"),
        }
    }

    #[test]
    fn test_parse_availability_rejects_username_with_embedded_whitespace() {
        // "ali ce" must not be silently fused into "alice"
        let err = parse_availability("ali ce;[1,2]\n").unwrap_err();

        match err {
            Error::MalformedAvailability { line, reason } => {
                assert_eq!(line, 1);
                assert!(reason.contains("whitespace"));
            }
            other => panic!("expected MalformedAvailability, got {other}"),
        }
    }

    #[test]
    fn test_parse_availability_rejects_duplicate_username() {
        let err = parse_availability("alice;[1,2]\nalice;[3,4]\n").unwrap_err();

        match err {
            Error::MalformedAvailability { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("duplicate"));
            }
            other => panic!("expected MalformedAvailability, got {other}"),
        }
    }

    #[test]
    fn test_load_availability_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alice;[9,12] [14,18]").unwrap();
        writeln!(file, "bob;[10,16]").unwrap();
        file.flush().unwrap();

        let table = crate::backend::loader::load_availability(file.path()).unwrap();
        assert_eq!(table.len(), 2);
    }

    // ============================================================
    // ANSWERING TESTS
    // ============================================================

    #[test]
    fn test_answer_intersects_matched_users() {
        let service = BackendService::with_table(
            config("A", "127.0.0.1:1"),
            table(&[("alice", "[9,12] [14,18]"), ("bob", "[10,16]")]),
        );

        let reply = service.answer(QueryId::new(), &names(&["alice", "bob"]));
        match reply {
            ShardMessage::Reply {
                matched, intervals, ..
            } => {
                assert_eq!(matched, names(&["alice", "bob"]));
                assert_eq!(intervals, "[10,12] [14,16]");
            }
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    #[test]
    fn test_answer_single_user_returns_own_availability() {
        let service = BackendService::with_table(
            config("A", "127.0.0.1:1"),
            table(&[("alice", "[9,12] [14,18]")]),
        );

        let reply = service.answer(QueryId::new(), &names(&["alice"]));
        match reply {
            ShardMessage::Reply { intervals, .. } => assert_eq!(intervals, "[9,12] [14,18]"),
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    #[test]
    fn test_answer_disjoint_users_is_empty_not_absent() {
        let service = BackendService::with_table(
            config("A", "127.0.0.1:1"),
            table(&[("early", "[1,5]"), ("late", "[10,20]")]),
        );

        let reply = service.answer(QueryId::new(), &names(&["early", "late"]));
        match reply {
            ShardMessage::Reply {
                matched, intervals, ..
            } => {
                // both users matched, so "[]" is a genuine zero-overlap answer
                assert_eq!(matched.len(), 2);
                assert_eq!(intervals, "[]");
            }
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    #[test]
    fn test_answer_skips_unknown_users() {
        let service = BackendService::with_table(
            config("A", "127.0.0.1:1"),
            table(&[("alice", "[9,12]")]),
        );

        let reply = service.answer(QueryId::new(), &names(&["alice", "stranger"]));
        match reply {
            ShardMessage::Reply {
                matched, intervals, ..
            } => {
                assert_eq!(matched, names(&["alice"]));
                assert_eq!(intervals, "[9,12]");
            }
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    #[test]
    fn test_answer_no_matched_users_signals_no_data() {
        let service =
            BackendService::with_table(config("A", "127.0.0.1:1"), table(&[("alice", "[9,12]")]));

        let reply = service.answer(QueryId::new(), &names(&["stranger"]));
        match reply {
            ShardMessage::Reply {
                matched, intervals, ..
            } => {
                assert!(matched.is_empty());
                assert_eq!(intervals, "[]");
            }
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    // ============================================================
    // SERVING LOOP TESTS
    // ============================================================

    #[tokio::test]
    async fn test_serve_registers_then_answers_queries() {
        // stand-in coordinator socket
        let coordinator = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let coordinator_addr = coordinator.local_addr().unwrap();

        let service = BackendService::with_table(
            config("A", &coordinator_addr.to_string()),
            table(&[("alice", "[9,12] [14,18]"), ("bob", "[10,16]")]),
        );
        let _handle = tokio::spawn(service.serve());

        let mut buf = vec![0u8; MAX_DATAGRAM];

        // registration arrives first
        let (len, backend_addr) = coordinator.recv_from(&mut buf).await.unwrap();
        match ShardMessage::decode(&buf[..len]).unwrap() {
            ShardMessage::Register { backend, usernames } => {
                assert_eq!(backend, BackendId::new("A"));
                assert_eq!(usernames.len(), 2);
            }
            other => panic!("expected Register, got {other:?}"),
        }

        // query round trip, correlated by id and addressed to us
        let id = QueryId::new();
        let query = ShardMessage::Query {
            id: id.clone(),
            usernames: names(&["alice", "bob"]),
        };
        coordinator
            .send_to(&query.encode().unwrap(), backend_addr)
            .await
            .unwrap();

        let (len, _) = coordinator.recv_from(&mut buf).await.unwrap();
        match ShardMessage::decode(&buf[..len]).unwrap() {
            ShardMessage::Reply {
                id: reply_id,
                intervals,
                ..
            } => {
                assert_eq!(reply_id, id);
                assert_eq!(intervals, "[10,12] [14,16]");
            }
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_serve_drops_malformed_datagrams() {
        let coordinator = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let coordinator_addr = coordinator.local_addr().unwrap();

        let service = BackendService::with_table(
            config("A", &coordinator_addr.to_string()),
            table(&[("alice", "[9,12]")]),
        );
        let _handle = tokio::spawn(service.serve());

        let mut buf = vec![0u8; MAX_DATAGRAM];
        let (_, backend_addr) = coordinator.recv_from(&mut buf).await.unwrap();

        // garbage must not kill the loop
        coordinator
            .send_to(&[0xff, 0xff, 0xff, 0xff], backend_addr)
            .await
            .unwrap();

        let id = QueryId::new();
        let query = ShardMessage::Query {
            id: id.clone(),
            usernames: names(&["alice"]),
        };
        coordinator
            .send_to(&query.encode().unwrap(), backend_addr)
            .await
            .unwrap();

        let (len, _) = coordinator.recv_from(&mut buf).await.unwrap();
        match ShardMessage::decode(&buf[..len]).unwrap() {
            ShardMessage::Reply { id: reply_id, .. } => assert_eq!(reply_id, id),
            other => panic!("expected Reply, got {other:?}"),
        }
    }
}
