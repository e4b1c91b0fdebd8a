//! Service facade and simulation driver tests

use std::thread;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use traffic_grid::config::{SignalMode, SimulationConfig};
use traffic_grid::network::{
    sample_network, NetworkError, SharedNetwork, SignalStatus, TrafficLevel,
};
use traffic_grid::service::{SimulationDriver, SnapshotBroadcaster, SnapshotStore, TrafficService};

fn sample_service() -> TrafficService {
    TrafficService::new(
        SharedNetwork::new(sample_network()),
        SnapshotBroadcaster::new(),
        None,
    )
}

fn test_config(signal_mode: SignalMode) -> SimulationConfig {
    SimulationConfig {
        tick_interval: Duration::from_millis(1),
        jitter_probability: 1.0,
        max_jitter: 0.5,
        signal_mode,
        green_dwell: TimeDelta::seconds(1),
        seed: Some(42),
        data_file: None,
        ..SimulationConfig::default()
    }
}

fn green_count(network: &SharedNetwork) -> usize {
    network
        .read()
        .intersections()
        .filter(|intersection| intersection.signal_status.is_green())
        .count()
}

#[test]
fn test_add_intersection_validates_input() {
    let service = sample_service();

    assert!(matches!(
        service.add_intersection("", "Nowhere"),
        Err(NetworkError::InvalidArgument(_))
    ));
    assert!(matches!(
        service.add_intersection("E", "  "),
        Err(NetworkError::InvalidArgument(_))
    ));
    assert_eq!(
        service.add_intersection("A", "Again"),
        Err(NetworkError::AlreadyExists("A".into()))
    );

    let added = service.add_intersection("E", "Harbor").unwrap();
    assert_eq!(added.signal_status, SignalStatus::Red);
    assert_eq!(service.intersection("E").unwrap().name, "Harbor");
}

#[test]
fn test_add_road_validates_input() {
    let service = sample_service();

    let rejected = [
        ("", "B", 1.0),
        ("A", "A", 1.0),
        ("A", "D", 0.0),
        ("A", "D", -3.0),
        ("A", "D", f64::NAN),
    ];
    for (from, to, distance) in rejected {
        assert!(
            matches!(
                service.add_road(from, to, distance),
                Err(NetworkError::InvalidArgument(_))
            ),
            "{:?} -> {:?} ({}) should be rejected",
            from,
            to,
            distance
        );
    }
    assert_eq!(
        service.add_road("A", "Z", 2.0),
        Err(NetworkError::IntersectionNotFound("Z".into()))
    );

    let record = service.add_road("A", "D", 9.7).unwrap();
    assert_eq!(record.distance, 9);
    assert_eq!(record.traffic_density, 0.0);
    assert_eq!(service.road("D", "A").unwrap().distance, 9);
}

#[test]
fn test_update_traffic_rejects_out_of_range() {
    let service = sample_service();

    for density in [-0.1, 1.5, f64::NAN] {
        assert!(matches!(
            service.update_traffic("A", "B", density),
            Err(NetworkError::InvalidArgument(_))
        ));
    }
    assert!(matches!(
        service.update_traffic("A", "D", 0.5),
        Err(NetworkError::RoadNotFound { .. })
    ));

    service.update_traffic("A", "B", 0.8).unwrap();
    assert_eq!(service.road("B", "A").unwrap().traffic_density, 0.8);
}

#[test]
fn test_remove_operations_report_missing_targets() {
    let service = sample_service();

    assert_eq!(
        service.remove_intersection("Z"),
        Err(NetworkError::IntersectionNotFound("Z".into()))
    );
    assert!(matches!(
        service.remove_road("A", "D"),
        Err(NetworkError::RoadNotFound { .. })
    ));

    service.remove_road("A", "B").unwrap();
    assert!(service.road("A", "B").is_err());

    let removed = service.remove_intersection("D").unwrap();
    assert_eq!(removed.name, "Suburb");
    assert!(service.roads_at("B").unwrap().iter().all(|road| road.to.as_str() != "D"));
    assert!(service.roads_at("D").is_err());
}

#[test]
fn test_update_intersection_overrides_signal() {
    let service = sample_service();

    let updated = service
        .update_intersection("B", Some("Midtown North"), Some(SignalStatus::Yellow))
        .unwrap();

    assert_eq!(updated.name, "Midtown North");
    assert_eq!(updated.signal_status, SignalStatus::Yellow);
    assert!(service.update_intersection("Z", None, None).is_err());
}

#[test]
fn test_subscribers_see_every_mutation() {
    let service = sample_service();
    let updates = service.subscribe();

    service.add_intersection("E", "Harbor").unwrap();
    service.add_road("D", "E", 3.0).unwrap();
    service.update_traffic("D", "E", 0.9).unwrap();
    // Rejected changes are not broadcast
    assert!(service.add_road("E", "E", 3.0).is_err());

    let snapshots: Vec<_> = updates.try_iter().collect();
    assert_eq!(snapshots.len(), 4);
    assert_eq!(snapshots[0].intersections.len(), 4);
    assert_eq!(snapshots[1].intersections.len(), 5);
    assert!(snapshots[2].has_road_between("E", "D"));
    assert!(snapshots[3]
        .roads
        .iter()
        .any(|road| road.traffic_density == 0.9));
}

#[test]
fn test_mutations_are_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    let service = TrafficService::new(
        SharedNetwork::new(sample_network()),
        SnapshotBroadcaster::new(),
        Some(SnapshotStore::new(&path)),
    );

    service.add_intersection("E", "Harbor").unwrap();
    service.add_road("C", "E", 6.0).unwrap();

    let saved = SnapshotStore::new(&path).load().unwrap().expect("snapshot on disk");
    assert_eq!(saved.intersections.len(), 5);
    assert_eq!(saved.roads.len(), 6);
    assert!(saved.has_road_between("C", "E"));
}

#[test]
fn test_route_through_service() {
    let service = sample_service();

    let route = service.route("A", "D").unwrap();
    let path: Vec<&str> = route.path.iter().map(|id| id.as_str()).collect();
    assert_eq!(path, ["A", "B", "D"]);
    assert_eq!(route.total_distance, 6);
    assert!(route
        .segments
        .iter()
        .all(|segment| segment.traffic_status == TrafficLevel::Light));

    assert!(matches!(service.route("", "D"), Err(NetworkError::InvalidArgument(_))));
    assert_eq!(
        service.route("A", "Z"),
        Err(NetworkError::IntersectionNotFound("Z".into()))
    );
}

#[test]
fn test_route_reports_unreachable() {
    let service = sample_service();
    service.add_intersection("E", "Island").unwrap();

    assert!(matches!(
        service.route("A", "E"),
        Err(NetworkError::Unreachable { .. })
    ));
}

#[test]
fn test_driver_keeps_densities_in_range() {
    let network = SharedNetwork::new(sample_network());
    let mut driver = SimulationDriver::new(
        network.clone(),
        &test_config(SignalMode::Density),
        SnapshotBroadcaster::new(),
    );

    let start = Utc::now();
    let mut perturbed = 0;
    for step in 0..200 {
        let summary = driver.step(start + TimeDelta::milliseconds(step * 250));
        perturbed += summary.roads_perturbed;

        let network = network.read();
        for road in network.directed_roads() {
            assert!((0.0..=1.0).contains(&road.traffic_density));
            let reverse = network.road(&road.to, &road.from).expect("reverse road");
            assert_eq!(reverse.traffic_density, road.traffic_density);
        }
    }

    assert_eq!(driver.steps(), 200);
    assert_eq!(perturbed, 200 * 5);
}

#[test]
fn test_round_robin_driver_keeps_one_green() {
    let network = SharedNetwork::new(sample_network());
    let mut driver = SimulationDriver::new(
        network.clone(),
        &test_config(SignalMode::RoundRobin),
        SnapshotBroadcaster::new(),
    );

    let start = Utc::now();
    for step in 0..20 {
        driver.step(start + TimeDelta::seconds(step * 2));
        assert_eq!(green_count(&network), 1, "step {}", step);
    }
}

#[test]
fn test_driver_publishes_each_step() {
    let network = SharedNetwork::new(sample_network());
    let broadcaster = SnapshotBroadcaster::new();
    let updates = broadcaster.subscribe(&network);
    let mut driver = SimulationDriver::new(
        network,
        &test_config(SignalMode::Density),
        broadcaster,
    );

    let mut seen = Vec::new();
    driver.run(Some(3), |driver, summary| {
        seen.push((driver.steps(), summary.delivered));
    });

    assert_eq!(driver.steps(), 3);
    assert_eq!(seen, vec![(1, 1), (2, 1), (3, 1)]);
    assert_eq!(updates.try_iter().count(), 4);
}

#[test]
fn test_driver_persists_each_step() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    let config = SimulationConfig {
        data_file: Some(path.clone()),
        ..test_config(SignalMode::Density)
    };
    let network = SharedNetwork::new(sample_network());
    let mut driver = SimulationDriver::new(network.clone(), &config, SnapshotBroadcaster::new());

    driver.step(Utc::now());

    let saved = SnapshotStore::new(&path).load().unwrap().expect("snapshot on disk");
    let current = network.snapshot();
    assert_eq!(saved.intersections.len(), current.intersections.len());
    assert_eq!(saved.roads.len(), current.roads.len());
    for (saved, current) in saved.roads.iter().zip(&current.roads) {
        assert_eq!((&saved.from, &saved.to), (&current.from, &current.to));
        assert!((saved.traffic_density - current.traffic_density).abs() < 1e-9);
    }
}

#[test]
fn test_concurrent_mutations_keep_roads_paired() {
    let service = sample_service();
    for (id, name) in [("E", "Harbor"), ("F", "Airport")] {
        service.add_intersection(id, name).unwrap();
    }

    let writers: Vec<_> = (0..4)
        .map(|worker| {
            let service = service.clone();
            thread::spawn(move || {
                let (from, to) = if worker % 2 == 0 { ("E", "F") } else { ("A", "F") };
                for round in 0..50 {
                    let _ = service.add_road(from, to, 1.0 + round as f64);
                    let _ = service.update_traffic(from, to, (round % 10) as f64 / 10.0);
                    let _ = service.remove_road(from, to);
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let network = service.network().clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    let network = network.read();
                    for road in network.directed_roads() {
                        let reverse = network.road(&road.to, &road.from);
                        assert!(reverse.is_some(), "{} -> {} has no reverse", road.from, road.to);
                        assert_eq!(reverse.unwrap().traffic_density, road.traffic_density);
                    }
                    let snapshot = network.export_snapshot();
                    assert_eq!(snapshot.roads.len(), network.road_count());
                }
            })
        })
        .collect();

    for handle in writers.into_iter().chain(readers) {
        handle.join().unwrap();
    }

    assert_eq!(service.network().read().road_count(), 5);
}

#[test]
fn test_concurrent_mutations_broadcast_their_own_state() {
    let service = sample_service();
    let updates = service.subscribe();

    let writers: Vec<_> = (0..4)
        .map(|worker| {
            let service = service.clone();
            thread::spawn(move || {
                for round in 0..10 {
                    let id = format!("W{}-{}", worker, round);
                    service.add_intersection(&id, "Worker").unwrap();
                }
            })
        })
        .collect();
    for handle in writers {
        handle.join().unwrap();
    }

    // Every add publishes the state right after itself, so no two
    // snapshots can show the same intersection count
    let mut counts: Vec<usize> = updates
        .try_iter()
        .skip(1)
        .map(|snapshot| snapshot.intersections.len())
        .collect();
    counts.sort_unstable();
    assert_eq!(counts, (5..=44).collect::<Vec<_>>());
}
