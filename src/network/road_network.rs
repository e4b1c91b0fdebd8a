//! Road network store
//!
//! Owns the intersections and the directed adjacency between them. Every road
//! is stored as two directed edges that are created and removed together.

use chrono::Utc;
use log::debug;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap};

use super::error::NetworkError;
use super::intersection::Intersection;
use super::road::{Road, RoadRecord};
use super::types::{clamp_density, IntersectionId, SignalStatus};

/// In-memory road network
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    /// Directed graph; node weights are the intersection records themselves
    graph: StableDiGraph<Intersection, Road>,

    /// Maps intersection IDs to their node indices in the graph
    intersection_to_node: HashMap<IntersectionId, NodeIndex>,

    /// Insertion order of intersections, used for enumeration
    order: Vec<IntersectionId>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an intersection showing red. Fails if the id is taken.
    pub fn add_intersection(
        &mut self,
        id: impl Into<IntersectionId>,
        name: impl Into<String>,
    ) -> Result<(), NetworkError> {
        let id = id.into();
        if self.intersection_to_node.contains_key(&id) {
            return Err(NetworkError::AlreadyExists(id));
        }

        let node_index = self
            .graph
            .add_node(Intersection::new(id.clone(), name, Utc::now()));
        self.intersection_to_node.insert(id.clone(), node_index);
        debug!("Added intersection {}", id);
        self.order.push(id);
        Ok(())
    }

    /// Adds a two-way road between existing intersections.
    ///
    /// The distance is truncated to whole units and must be at least 1. Any
    /// existing road between the pair is replaced, which also resets its
    /// traffic density.
    pub fn add_road(&mut self, from: &str, to: &str, distance: f64) -> Result<(), NetworkError> {
        let from_node = self.node_or_err(from)?;
        let to_node = self.node_or_err(to)?;

        if from_node == to_node {
            return Err(NetworkError::invalid(
                "Cannot create a road from an intersection to itself",
            ));
        }
        let distance = road_distance(distance)?;

        let now = Utc::now();
        self.upsert_edge(from_node, to_node, Road::new(distance, now));
        self.upsert_edge(to_node, from_node, Road::new(distance, now));

        debug!("Added road {} <-> {} (distance {})", from, to, distance);
        Ok(())
    }

    fn upsert_edge(&mut self, from: NodeIndex, to: NodeIndex, road: Road) {
        match self.graph.find_edge(from, to) {
            Some(edge) => self.graph[edge] = road,
            None => {
                self.graph.add_edge(from, to, road);
            }
        }
    }

    /// Sets the traffic density of a road in both directions.
    ///
    /// The density is clamped into [0, 1]. Fails if there is no road from
    /// `from` to `to`.
    pub fn update_traffic_density(
        &mut self,
        from: &str,
        to: &str,
        density: f64,
    ) -> Result<(), NetworkError> {
        self.update_directed_traffic_density(from, to, density)?;
        // The reverse edge always exists alongside the forward one
        self.update_directed_traffic_density(to, from, density)
    }

    /// Sets the traffic density of one direction of a road only
    pub fn update_directed_traffic_density(
        &mut self,
        from: &str,
        to: &str,
        density: f64,
    ) -> Result<(), NetworkError> {
        let edge = self
            .edge_between(from, to)
            .ok_or_else(|| road_not_found(from, to))?;

        self.graph[edge].set_density(density, Utc::now());
        debug!(
            "Traffic density {} -> {} set to {:.2}",
            from,
            to,
            clamp_density(density)
        );
        Ok(())
    }

    /// Removes an intersection together with every road touching it.
    /// Returns the removed record, or None if there was no such intersection.
    pub fn remove_intersection(&mut self, id: &str) -> Option<Intersection> {
        let node_index = self.intersection_to_node.remove(id)?;
        self.order.retain(|existing| existing.as_str() != id);

        // Removing the node also removes all incoming and outgoing edges
        let removed = self.graph.remove_node(node_index);
        debug!("Removed intersection {}", id);
        removed
    }

    /// Removes both directions of a road
    pub fn remove_road(&mut self, from: &str, to: &str) -> Result<(), NetworkError> {
        self.node_or_err(from)?;
        self.node_or_err(to)?;

        let (Some(forward), Some(backward)) =
            (self.edge_between(from, to), self.edge_between(to, from))
        else {
            return Err(road_not_found(from, to));
        };

        self.graph.remove_edge(forward);
        self.graph.remove_edge(backward);
        debug!("Removed road {} <-> {}", from, to);
        Ok(())
    }

    /// Renames an intersection and/or overrides its signal.
    /// A signal override stamps the change time even if the signal is unchanged.
    pub fn update_intersection(
        &mut self,
        id: &str,
        name: Option<String>,
        signal: Option<SignalStatus>,
    ) -> Result<&Intersection, NetworkError> {
        let intersection = self
            .intersection_mut(id)
            .ok_or_else(|| NetworkError::IntersectionNotFound(id.into()))?;

        if let Some(name) = name {
            intersection.name = name;
        }
        if let Some(signal) = signal {
            intersection.signal_status = signal;
            intersection.last_change = Utc::now();
        }

        Ok(intersection)
    }

    /// Gets an intersection by ID
    pub fn intersection(&self, id: &str) -> Option<&Intersection> {
        let node = self.intersection_to_node.get(id)?;
        self.graph.node_weight(*node)
    }

    /// Direct mutable access to an intersection record
    pub fn intersection_mut(&mut self, id: &str) -> Option<&mut Intersection> {
        let node = self.intersection_to_node.get(id)?;
        self.graph.node_weight_mut(*node)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.intersection_to_node.contains_key(id)
    }

    /// Gets the directed road record from `from` to `to`
    pub fn road(&self, from: &str, to: &str) -> Option<&Road> {
        let edge = self.edge_between(from, to)?;
        self.graph.edge_weight(edge)
    }

    /// All intersections, in the order they were added
    pub fn intersections(&self) -> impl Iterator<Item = &Intersection> + '_ {
        self.order.iter().filter_map(|id| self.intersection(id))
    }

    /// All intersection IDs, in the order they were added
    pub fn intersection_ids(&self) -> impl Iterator<Item = &IntersectionId> + '_ {
        self.order.iter()
    }

    /// Every directed road, grouped by source intersection
    pub fn directed_roads(&self) -> impl Iterator<Item = RoadRecord> + '_ {
        self.order.iter().flat_map(move |id| {
            let node = self.intersection_to_node[id];
            self.graph.edges(node).map(move |edge| {
                RoadRecord::new(id.clone(), self.graph[edge.target()].id().clone(), edge.weight())
            })
        })
    }

    /// Gets all roads leaving a specific intersection
    pub fn connected_roads(&self, id: &str) -> Option<Vec<RoadRecord>> {
        let node = self.intersection_to_node.get(id)?;
        let from = self.graph[*node].id().clone();

        let connections = self
            .graph
            .edges(*node)
            .map(|edge| {
                RoadRecord::new(from.clone(), self.graph[edge.target()].id().clone(), edge.weight())
            })
            .collect();

        Some(connections)
    }

    /// Intersections reachable over a single road from `id`
    pub fn neighbors(&self, id: &str) -> Vec<&IntersectionId> {
        self.intersection_to_node
            .get(id)
            .map(|node| {
                self.graph
                    .neighbors_directed(*node, Direction::Outgoing)
                    .map(|neighbor| self.graph[neighbor].id())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Intersections connected to `id` in either direction, excluding itself
    pub fn adjacent_intersections(&self, id: &str) -> BTreeSet<IntersectionId> {
        let Some(node) = self.intersection_to_node.get(id) else {
            return BTreeSet::new();
        };

        self.graph
            .neighbors_directed(*node, Direction::Outgoing)
            .chain(self.graph.neighbors_directed(*node, Direction::Incoming))
            .filter(|neighbor| neighbor != node)
            .map(|neighbor| self.graph[neighbor].id().clone())
            .collect()
    }

    /// Roads whose head is `id`
    pub fn incoming_roads(&self, id: &str) -> Vec<&Road> {
        self.intersection_to_node
            .get(id)
            .map(|node| {
                self.graph
                    .edges_directed(*node, Direction::Incoming)
                    .map(|edge| edge.weight())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Mean density of the roads arriving at `id`, or 0 if none arrive
    pub fn average_incoming_density(&self, id: &str) -> f64 {
        let incoming = self.incoming_roads(id);
        if incoming.is_empty() {
            return 0.0;
        }
        let total: f64 = incoming.iter().map(|road| road.traffic_density).sum();
        total / incoming.len() as f64
    }

    /// Get number of intersections
    pub fn intersection_count(&self) -> usize {
        self.intersection_to_node.len()
    }

    /// Get number of two-way roads
    pub fn road_count(&self) -> usize {
        self.graph.edge_count() / 2
    }

    /// Get number of directed road records
    pub fn directed_road_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.intersection_to_node.is_empty()
    }

    pub(crate) fn graph(&self) -> &StableDiGraph<Intersection, Road> {
        &self.graph
    }

    pub(crate) fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.intersection_to_node.get(id).copied()
    }

    fn node_or_err(&self, id: &str) -> Result<NodeIndex, NetworkError> {
        self.node_index(id)
            .ok_or_else(|| NetworkError::IntersectionNotFound(id.into()))
    }

    fn edge_between(&self, from: &str, to: &str) -> Option<EdgeIndex> {
        let from_node = self.intersection_to_node.get(from)?;
        let to_node = self.intersection_to_node.get(to)?;
        self.graph.find_edge(*from_node, *to_node)
    }
}

/// Truncate a distance to whole units, rejecting anything below 1
fn road_distance(distance: f64) -> Result<u32, NetworkError> {
    if !distance.is_finite() || distance < 1.0 {
        return Err(NetworkError::invalid(format!(
            "Distance must be greater than 0, got {}",
            distance
        )));
    }
    Ok(distance.trunc().min(f64::from(u32::MAX)) as u32)
}

fn road_not_found(from: &str, to: &str) -> NetworkError {
    NetworkError::RoadNotFound {
        from: from.into(),
        to: to.into(),
    }
}
