//! Scale-free account graphs and their degree distributions.

use crate::utils::error::{Result, SimError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Write;

/// Kronecker initiator probabilities (Graph500 reference values).
const INITIATOR_A: f64 = 0.57;
const INITIATOR_B: f64 = 0.19;
const INITIATOR_C: f64 = 0.19;

/// Directed graph without parallel edges. Self-loops are allowed.
#[derive(Debug, Clone, Default)]
pub struct DiGraph {
    nodes: BTreeSet<usize>,
    edges: Vec<(usize, usize)>,
    seen: HashSet<(usize, usize)>,
}

impl DiGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: usize) {
        self.nodes.insert(node);
    }

    /// Returns false when the edge was already present.
    pub fn add_edge(&mut self, from: usize, to: usize) -> bool {
        if !self.seen.insert((from, to)) {
            return false;
        }
        self.nodes.insert(from);
        self.nodes.insert(to);
        self.edges.push((from, to));
        true
    }

    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().copied()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn contains_edge(&self, from: usize, to: usize) -> bool {
        self.seen.contains(&(from, to))
    }

    pub fn in_degrees(&self) -> BTreeMap<usize, usize> {
        let mut degrees: BTreeMap<usize, usize> = self.nodes.iter().map(|&n| (n, 0)).collect();
        for &(_, to) in &self.edges {
            *degrees.entry(to).or_default() += 1;
        }
        degrees
    }

    pub fn out_degrees(&self) -> BTreeMap<usize, usize> {
        let mut degrees: BTreeMap<usize, usize> = self.nodes.iter().map(|&n| (n, 0)).collect();
        for &(from, _) in &self.edges {
            *degrees.entry(from).or_default() += 1;
        }
        degrees
    }
}

/// Barabási–Albert preferential attachment over `n` vertices, `m` edges per
/// new vertex, with every second edge reversed so in- and out-degree both
/// follow the power law.
pub fn powerlaw_cluster<R: Rng + ?Sized>(n: usize, m: usize, rng: &mut R) -> Result<DiGraph> {
    if m < 1 || m >= n {
        return Err(SimError::InvalidConfigValueError {
            field: "edge_factor".to_string(),
            value: m.to_string(),
            reason: format!("Barabási–Albert needs 1 <= m < n (n = {})", n),
        });
    }

    let mut graph = DiGraph::new();
    for node in 0..n {
        graph.add_node(node);
    }

    let mut targets: Vec<usize> = (0..m).collect();
    let mut repeated_nodes: Vec<usize> = Vec::with_capacity(2 * m * n);
    let mut edge_index = 0usize;

    for source in m..n {
        for &target in &targets {
            if edge_index % 2 == 0 {
                graph.add_edge(source, target);
            } else {
                graph.add_edge(target, source);
            }
            edge_index += 1;
        }
        repeated_nodes.extend_from_slice(&targets);
        repeated_nodes.extend(std::iter::repeat(source).take(m));
        targets = random_subset(&repeated_nodes, m, rng);
    }

    Ok(graph)
}

/// `m` distinct elements drawn with weight proportional to multiplicity.
fn random_subset<R: Rng + ?Sized>(seq: &[usize], m: usize, rng: &mut R) -> Vec<usize> {
    let mut picked = BTreeSet::new();
    while picked.len() < m {
        if let Some(&node) = seq.choose(rng) {
            picked.insert(node);
        } else {
            break;
        }
    }
    picked.into_iter().collect()
}

/// Graph500 Kronecker generator: `2^scale` vertices, `2^scale * edge_factor`
/// sampled edges. Duplicate samples collapse, so the edge count is an upper bound.
pub fn kronecker<R: Rng + ?Sized>(scale: u32, edge_factor: usize, rng: &mut R) -> Result<DiGraph> {
    if scale == 0 || scale > 30 {
        return Err(SimError::InvalidConfigValueError {
            field: "scale".to_string(),
            value: scale.to_string(),
            reason: "Scale must be between 1 and 30".to_string(),
        });
    }

    let n = 1usize << scale;
    let m = n * edge_factor;
    let ab = INITIATOR_A + INITIATOR_B;
    let c_norm = INITIATOR_C / (1.0 - ab);
    let a_norm = INITIATOR_A / ab;

    let mut sampled: Vec<(usize, usize)> = (0..m)
        .map(|_| {
            let (mut i, mut j) = (0usize, 0usize);
            for bit in 0..scale {
                let ii_bit = rng.gen::<f64>() > ab;
                let ac = if ii_bit { c_norm } else { a_norm };
                let jj_bit = rng.gen::<f64>() > ac;
                i += usize::from(ii_bit) << bit;
                j += usize::from(jj_bit) << bit;
            }
            (i, j)
        })
        .collect();
    sampled.shuffle(rng);

    let mut graph = DiGraph::new();
    for (i, j) in sampled {
        graph.add_edge(i, j);
    }
    Ok(graph)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DegreeRow {
    #[serde(rename = "Count")]
    pub degree: usize,
    #[serde(rename = "In-degree")]
    pub in_degree_nodes: usize,
    #[serde(rename = "Out-degree")]
    pub out_degree_nodes: usize,
}

/// How many vertices have each in-degree and out-degree value.
#[derive(Debug, Clone, Default)]
pub struct DegreeDistribution {
    rows: Vec<DegreeRow>,
}

impl DegreeDistribution {
    pub fn from_graph(graph: &DiGraph) -> Self {
        let in_hist = histogram(graph.in_degrees().into_values());
        let out_hist = histogram(graph.out_degrees().into_values());

        let degrees: BTreeSet<usize> = in_hist.keys().chain(out_hist.keys()).copied().collect();
        let rows = degrees
            .into_iter()
            .map(|degree| DegreeRow {
                degree,
                in_degree_nodes: in_hist.get(&degree).copied().unwrap_or(0),
                out_degree_nodes: out_hist.get(&degree).copied().unwrap_or(0),
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[DegreeRow] {
        &self.rows
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn histogram(values: impl Iterator<Item = usize>) -> BTreeMap<usize, usize> {
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_powerlaw_cluster_edge_count() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let graph = powerlaw_cluster(100, 3, &mut rng).unwrap();

        assert_eq!(graph.number_of_nodes(), 100);
        assert_eq!(graph.number_of_edges(), 3 * (100 - 3));
        assert!(graph.edges().iter().all(|&(u, v)| u != v));
    }

    #[test]
    fn test_powerlaw_cluster_alternates_direction() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let graph = powerlaw_cluster(10, 1, &mut rng).unwrap();

        // first edge keeps its direction, the second is reversed
        assert_eq!(graph.edges()[0], (1, 0));
        let (from, to) = graph.edges()[1];
        assert_eq!(to, 2);
        assert!(from < 2);
    }

    #[test]
    fn test_powerlaw_cluster_rejects_bad_edge_factor() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        assert!(powerlaw_cluster(5, 0, &mut rng).is_err());
        assert!(powerlaw_cluster(5, 5, &mut rng).is_err());
    }

    #[test]
    fn test_powerlaw_cluster_is_reproducible() {
        let a = powerlaw_cluster(50, 2, &mut Xoshiro256PlusPlus::seed_from_u64(9)).unwrap();
        let b = powerlaw_cluster(50, 2, &mut Xoshiro256PlusPlus::seed_from_u64(9)).unwrap();
        assert_eq!(a.edges(), b.edges());
    }

    #[test]
    fn test_kronecker_bounds() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let graph = kronecker(6, 4, &mut rng).unwrap();

        assert!(graph.number_of_edges() <= 64 * 4);
        assert!(graph.number_of_edges() > 0);
        assert!(graph.nodes().all(|n| n < 64));
    }

    #[test]
    fn test_degree_distribution_sums_to_node_count() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let graph = powerlaw_cluster(200, 2, &mut rng).unwrap();
        let dist = DegreeDistribution::from_graph(&graph);

        let in_total: usize = dist.rows().iter().map(|r| r.in_degree_nodes).sum();
        let out_total: usize = dist.rows().iter().map(|r| r.out_degree_nodes).sum();
        assert_eq!(in_total, 200);
        assert_eq!(out_total, 200);
        assert!(dist.rows().windows(2).all(|w| w[0].degree < w[1].degree));
    }

    #[test]
    fn test_degree_distribution_csv() {
        let mut graph = DiGraph::new();
        graph.add_edge(0, 1);
        graph.add_edge(0, 2);
        graph.add_edge(1, 2);
        assert!(!graph.add_edge(1, 2));
        assert!(graph.contains_edge(0, 1));
        assert!(!graph.contains_edge(1, 0));

        let mut out = Vec::new();
        DegreeDistribution::from_graph(&graph).write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Count,In-degree,Out-degree\n0,1,1\n1,1,1\n2,1,1\n"
        );
    }
}
