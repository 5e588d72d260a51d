use crate::{Grid, LineId, SiteId};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;

/// Build a petgraph view of the active topology.
///
/// Node `i` of the returned graph is site `i`; edge weights are line ids.
pub fn active_graph(grid: &Grid) -> UnGraph<SiteId, LineId> {
    let mut graph =
        UnGraph::with_capacity(grid.sites().len(), grid.active_line_count());
    for site in grid.sites() {
        graph.add_node(site.id);
    }
    for line in grid.active_lines() {
        graph.add_edge(
            NodeIndex::new(line.from.value()),
            NodeIndex::new(line.to.value()),
            line.id,
        );
    }
    graph
}

/// Number of islands in the active topology. An empty grid has none.
pub fn component_count(grid: &Grid) -> usize {
    if grid.sites().is_empty() {
        return 0;
    }
    connected_components(&active_graph(grid))
}

/// Every site reachable from every other over active lines.
pub fn is_connected(grid: &Grid) -> bool {
    component_count(grid) <= 1
}

/// Active lines form a spanning tree: connected with exactly |sites| - 1 lines.
pub fn is_spanning_tree(grid: &Grid) -> bool {
    let n = grid.sites().len();
    if n == 0 {
        return grid.active_line_count() == 0;
    }
    grid.active_line_count() == n - 1 && is_connected(grid)
}

pub fn total_active_length(grid: &Grid) -> f64 {
    grid.active_lines().map(|line| line.length).sum()
}

/// Breadth-first visit order over active lines starting at `start`.
///
/// Sites unreachable from `start` are not included.
pub fn bfs_order(grid: &Grid, start: SiteId) -> Vec<SiteId> {
    if start.value() >= grid.sites().len() {
        return Vec::new();
    }
    let graph = active_graph(grid);
    let mut bfs = Bfs::new(&graph, NodeIndex::new(start.value()));
    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(node) = bfs.next(&graph) {
        order.push(graph[node]);
    }
    order
}
