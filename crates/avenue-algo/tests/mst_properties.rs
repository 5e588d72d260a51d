//! Optimality and structure of the synthesized spanning tree.

use avenue_algo::mst::{complete_edges, filter_kruskal, minimum_spanning_edges};
use avenue_algo::synthesis::{build_mst_grid, SiteLayout};
use avenue_algo::UnionFind;
use avenue_core::graph_utils::{is_connected, is_spanning_tree, total_active_length};
use avenue_core::{ElectricalParams, Megawatts, Site, SiteId};
use proptest::prelude::*;

fn sites(coords: &[(f64, f64)]) -> Vec<Site> {
    coords
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| Site::new(SiteId::new(i), x, y, Megawatts(1.0)))
        .collect()
}

/// Decode a Prüfer sequence into the edge list of a labelled tree on
/// `seq.len() + 2` vertices.
fn prufer_tree(seq: &[usize]) -> Vec<(usize, usize)> {
    let n = seq.len() + 2;
    let mut degree = vec![1usize; n];
    for &v in seq {
        degree[v] += 1;
    }
    let mut edges = Vec::with_capacity(n - 1);
    for &v in seq {
        let leaf = (0..n).find(|&u| degree[u] == 1).unwrap();
        edges.push((leaf, v));
        degree[leaf] -= 1;
        degree[v] -= 1;
    }
    let rest: Vec<usize> = (0..n).filter(|&u| degree[u] == 1).collect();
    edges.push((rest[0], rest[1]));
    edges
}

/// Minimum total length over every one of the n^(n-2) labelled spanning trees.
fn brute_force_minimum(sites: &[Site]) -> f64 {
    let n = sites.len();
    if n < 2 {
        return 0.0;
    }
    let len = n - 2;
    let mut seq = vec![0usize; len];
    let mut best = f64::INFINITY;
    loop {
        let total: f64 = prufer_tree(&seq)
            .iter()
            .map(|&(a, b)| sites[a].distance_to(&sites[b]))
            .sum();
        best = best.min(total);

        // Odometer increment over [0, n)^len.
        let mut pos = 0;
        while pos < len {
            seq[pos] += 1;
            if seq[pos] < n {
                break;
            }
            seq[pos] = 0;
            pos += 1;
        }
        if pos == len {
            return best;
        }
    }
}

fn coords_strategy(max: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
    proptest::collection::vec((0.0..100.0f64, 0.0..100.0f64), 2..=max)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_mst_matches_brute_force(coords in coords_strategy(7)) {
        let s = sites(&coords);
        let tree = minimum_spanning_edges(&s);
        prop_assert_eq!(tree.len(), s.len() - 1);

        let total: f64 = tree.iter().map(|e| e.length).sum();
        let best = brute_force_minimum(&s);
        prop_assert!((total - best).abs() < 1e-9, "kruskal {} vs brute force {}", total, best);
    }

    #[test]
    fn prop_mst_grid_is_spanning_tree(coords in coords_strategy(40)) {
        let s = sites(&coords);
        let n = s.len();
        let layout = SiteLayout { count: n, group_by: 10, ..SiteLayout::default() };
        let grid = build_mst_grid(s, &layout, ElectricalParams::default()).unwrap();
        prop_assert_eq!(grid.active_line_count(), n - 1);
        prop_assert!(is_connected(&grid));
        prop_assert!(is_spanning_tree(&grid));
    }

    #[test]
    fn prop_mst_is_deterministic(coords in coords_strategy(30)) {
        let s = sites(&coords);
        let a: Vec<usize> = minimum_spanning_edges(&s).iter().map(|e| e.index).collect();
        let b: Vec<usize> = filter_kruskal(s.len(), complete_edges(&s)).iter().map(|e| e.index).collect();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_union_find_matches_labels(
        n in 1..40usize,
        unions in proptest::collection::vec((0..40usize, 0..40usize), 0..80)
    ) {
        let mut uf = UnionFind::new(n);
        let mut label: Vec<usize> = (0..n).collect();
        for (a, b) in unions.into_iter().filter(|&(a, b)| a < n && b < n) {
            let (la, lb) = (label[a], label[b]);
            let merged = uf.union(a, b);
            prop_assert_eq!(merged, la != lb);
            for l in label.iter_mut() {
                if *l == lb {
                    *l = la;
                }
            }
        }
        let mut distinct = label.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(uf.set_count(), distinct.len());
        for a in 0..n {
            for b in 0..n {
                prop_assert_eq!(uf.connected(a, b), label[a] == label[b]);
            }
        }
    }
}

#[test]
fn test_eight_sites_against_brute_force() {
    let s = sites(&[
        (3.0, 91.0),
        (47.0, 12.0),
        (88.0, 60.0),
        (15.0, 33.0),
        (62.0, 77.0),
        (29.0, 58.0),
        (94.0, 8.0),
        (51.0, 44.0),
    ]);
    let total: f64 = minimum_spanning_edges(&s).iter().map(|e| e.length).sum();
    assert!((total - brute_force_minimum(&s)).abs() < 1e-9);
}

#[test]
fn test_square_grid_total_length() {
    let s = sites(&[(0.0, 0.0), (0.0, 10.0), (10.0, 0.0), (10.0, 10.0)]);
    let grid = build_mst_grid(s, &SiteLayout::default(), ElectricalParams::default()).unwrap();
    assert_eq!(grid.active_line_count(), 3);
    assert!((total_active_length(&grid) - 30.0).abs() < 1e-9);
}
