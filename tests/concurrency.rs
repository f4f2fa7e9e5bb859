//! Concurrent queries racing a reload.

use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use ip_watchlist::{IpList, Shutdown};

mod common;
use common::{ip, write_atomically};

fn addresses(second_octet: u8, count: u16) -> String {
    (0..count)
        .map(|i| format!("10.{}.{}.{}\n", second_octet, i / 256, i % 256))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_queries_see_whole_snapshots() {
    const OLD: usize = 500;
    const NEW: usize = 1000;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.txt");
    std::fs::write(&path, addresses(1, OLD as u16)).unwrap();

    let shutdown = Shutdown::new();
    let list = IpList::new(&path, shutdown.token()).unwrap();
    list.start_monitoring();
    assert!(list.is_matched(ip("10.1.0.0")));

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let list = list.clone();
            tokio::task::spawn_blocking(move || {
                let deadline = Instant::now() + Duration::from_secs(10);
                loop {
                    let matched_new = list.is_matched(ip("10.2.0.0"));
                    let snapshot = list.snapshot();
                    match snapshot.len() {
                        OLD => assert!(snapshot.iter().all(|a| second_octet(a) == 1)),
                        NEW => {
                            assert!(snapshot.iter().all(|a| second_octet(a) == 2));
                            return true;
                        }
                        len => panic!("torn snapshot with {len} addresses"),
                    }
                    if matched_new || Instant::now() > deadline {
                        return matched_new;
                    }
                }
            })
        })
        .collect();

    write_atomically(&path, &addresses(2, NEW as u16));

    for reader in readers {
        assert!(reader.await.unwrap(), "reader never saw the new list");
    }
    assert!(list.is_matched(ip("10.2.3.231")));
    assert!(!list.is_matched(ip("10.1.0.0")));

    shutdown.trigger();
}

fn second_octet(addr: &IpAddr) -> u8 {
    match addr {
        IpAddr::V4(v4) => v4.octets()[1],
        IpAddr::V6(_) => 0,
    }
}

#[test]
fn test_racing_queries_parse_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("list.txt");
    std::fs::write(&path, addresses(3, 200)).unwrap();

    let list = IpList::new(&path, Shutdown::new().token()).unwrap();
    let probe = IpAddr::V4(Ipv4Addr::new(10, 3, 0, 199));

    std::thread::scope(|scope| {
        for _ in 0..16 {
            scope.spawn(|| assert!(list.is_matched(probe)));
        }
    });

    assert_eq!(list.reload_count(), 1);
}
