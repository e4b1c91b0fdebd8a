//! Traffic-aware shortest paths

use ordered_float::OrderedFloat;
use petgraph::algo::astar;

use super::road_network::RoadNetwork;
use super::types::IntersectionId;

impl RoadNetwork {
    /// Finds the cheapest path between two intersections, where each road
    /// costs `distance * (1 + 2 * density)`.
    ///
    /// The returned path includes both endpoints; `start == end` yields
    /// `[start]`. Returns None if either endpoint is missing or `end` cannot be
    /// reached. Among equally cheap paths, any one may be returned.
    pub fn shortest_path(&self, start: &str, end: &str) -> Option<Vec<IntersectionId>> {
        self.shortest_path_with_cost(start, end)
            .map(|(_, path)| path)
    }

    /// Same as [`RoadNetwork::shortest_path`], also returning the
    /// congestion-weighted cost of the path
    pub fn shortest_path_with_cost(
        &self,
        start: &str,
        end: &str,
    ) -> Option<(f64, Vec<IntersectionId>)> {
        let start_node = self.node_index(start)?;
        let end_node = self.node_index(end)?;
        let graph = self.graph();

        // A* with a null heuristic is Dijkstra that stops once `end` is settled
        let (cost, node_path) = astar(
            graph,
            start_node,
            |node| node == end_node,
            |edge| OrderedFloat(edge.weight().effective_weight()),
            |_| OrderedFloat(0.0),
        )?;

        let path = node_path
            .into_iter()
            .map(|node| graph[node].id().clone())
            .collect();

        Some((cost.into_inner(), path))
    }
}
