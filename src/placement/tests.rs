//! Placement Module Tests
//!
//! Validates the bucketing hash, chunk boundary math, the ring replica
//! schedule, and put admissibility. Everything here is pure logic; the
//! network-facing behavior is covered by the node and client tests.

use super::chunk::{ChunkName, chunk_spans};
use super::ring::{bucket, put_admissible, replica_schedule};

// ============================================================
// BUCKETING
// ============================================================

#[test]
fn test_bucket_is_deterministic_and_in_range() {
    for n in 2..=8 {
        for i in 0..100 {
            let name = format!("file_{}.txt", i);
            let b1 = bucket(&name, n);
            let b2 = bucket(&name, n);
            assert_eq!(b1, b2, "same name must map to the same bucket");
            assert!(b1 < n, "bucket {} out of range for n={}", b1, n);
        }
    }
}

#[test]
fn test_bucket_matches_djb2_reference_values() {
    // djb2("") = 5381, djb2("a") = 5381 * 33 + 97 = 177670
    assert_eq!(bucket("a", 4), 177670 % 4);
    assert_eq!(bucket("a", 7), 177670 % 7);
}

// ============================================================
// CHUNK SPANS
// ============================================================

#[test]
fn test_spans_ten_bytes_four_nodes() {
    let spans = chunk_spans(10, 4);
    let sizes: Vec<u64> = spans.iter().map(|s| s.size).collect();
    let offsets: Vec<u64> = spans.iter().map(|s| s.offset).collect();
    assert_eq!(sizes, vec![2, 2, 2, 4]);
    assert_eq!(offsets, vec![0, 2, 4, 6]);
}

#[test]
fn test_spans_smaller_than_cluster() {
    // 3 bytes over 4 nodes: the first three chunks are empty.
    let spans = chunk_spans(3, 4);
    let sizes: Vec<u64> = spans.iter().map(|s| s.size).collect();
    assert_eq!(sizes, vec![0, 0, 0, 3]);
}

#[test]
fn test_spans_cover_the_file_exactly() {
    for total in [0u64, 1, 7, 64, 1023, 4096] {
        for n in 2..=6 {
            let spans = chunk_spans(total, n);
            assert_eq!(spans.len(), n);
            assert_eq!(spans.iter().map(|s| s.size).sum::<u64>(), total);
            // Spans are contiguous up to the remainder chunk.
            for pair in spans.windows(2) {
                assert_eq!(pair[1].offset, pair[0].offset + pair[0].size);
            }
        }
    }
}

// ============================================================
// REPLICA SCHEDULE
// ============================================================

#[test]
fn test_schedule_places_primary_and_secondary_on_distinct_nodes() {
    for n in 2..=8 {
        for bucket in 0..n {
            let schedule = replica_schedule(bucket, n);
            for (i, assignment) in schedule.iter().enumerate() {
                assert_eq!(assignment.node, (bucket + i) % n);
                assert_eq!(assignment.primary_chunk, i as u32);
                assert_eq!(assignment.secondary_chunk, ((i + 1) % n) as u32);
            }
            // Every chunk's two copies land on adjacent, distinct nodes.
            for chunk in 0..n as u32 {
                let primary = schedule.iter().find(|a| a.primary_chunk == chunk).unwrap();
                let secondary = schedule
                    .iter()
                    .find(|a| a.secondary_chunk == chunk)
                    .unwrap();
                assert_ne!(
                    primary.node, secondary.node,
                    "chunk {} replicated twice on node {} (bucket={}, n={})",
                    chunk, primary.node, bucket, n
                );
            }
        }
    }
}

#[test]
fn test_schedule_gives_every_node_exactly_two_chunks() {
    let schedule = replica_schedule(2, 4);
    let mut per_node = vec![0usize; 4];
    for assignment in &schedule {
        per_node[assignment.node] += 2;
    }
    assert_eq!(per_node, vec![2, 2, 2, 2]);
}

// ============================================================
// PUT ADMISSIBILITY
// ============================================================

#[test]
fn test_adjacent_pair_down_rejects_put() {
    assert!(!put_admissible(&[true, false, false, true]));
    assert!(!put_admissible(&[false, true, true, false])); // ring wraps
}

#[test]
fn test_single_node_down_allows_put() {
    assert!(put_admissible(&[true, false, true, true]));
    assert!(put_admissible(&[true, true, true, true]));
}

#[test]
fn test_non_adjacent_pair_down_allows_put() {
    assert!(put_admissible(&[false, true, false, true]));
}

// ============================================================
// CHUNK NAMES
// ============================================================

#[test]
fn test_chunk_name_round_trip() {
    let name = ChunkName {
        timestamp: 1700000000123,
        index: 3,
        filename: "report.pdf".to_string(),
    };
    assert_eq!(name.to_string(), "1700000000123_3_report.pdf");
    assert_eq!(ChunkName::parse(&name.to_string()), Some(name));
}

#[test]
fn test_chunk_name_keeps_underscores_in_filename() {
    let parsed = ChunkName::parse("42_1_my_archive_v2.tar").unwrap();
    assert_eq!(parsed.timestamp, 42);
    assert_eq!(parsed.index, 1);
    assert_eq!(parsed.filename, "my_archive_v2.tar");
}

#[test]
fn test_chunk_name_does_not_suffix_match() {
    // A chunk of "b_a.txt" must never be mistaken for one of "a.txt".
    let parsed = ChunkName::parse("100_0_b_a.txt").unwrap();
    assert_eq!(parsed.filename, "b_a.txt");
    assert_ne!(parsed.filename, "a.txt");
}

#[test]
fn test_chunk_name_rejects_garbage() {
    assert_eq!(ChunkName::parse("not-a-chunk"), None);
    assert_eq!(ChunkName::parse("abc_0_file.txt"), None);
    assert_eq!(ChunkName::parse("100_x_file.txt"), None);
    assert_eq!(ChunkName::parse("100_0_"), None);
    assert_eq!(ChunkName::parse(""), None);
}
