use super::*;
use crate::*;
use algograph::graph::{QueryableGraph, VertexId};
use std::collections::HashMap;

/// Deterministic PageRank by synchronous fixed-point iteration.
///
/// Every round recomputes the whole rank mapping from a snapshot of the
/// previous round. Rank held by dangling pages is redistributed uniformly
/// over the corpus each round, so the total mass stays at 1.
pub struct IteratedPageRank<'a, G>
where
    G: QueryableGraph,
{
    graph: &'a G,
    damping: f64,
    epsilon: f64,
    out_links: HashMap<VertexId, Vec<VertexId>, ahash::RandomState>,
    dangling: Vec<VertexId>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub damping: f64,
    pub epsilon: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            damping: 0.85,
            epsilon: 0.001,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Result {
    pub page_rank: HashMap<VertexId, f64, ahash::RandomState>,
    /// Per-page change of the final round.
    pub delta: HashMap<VertexId, f64, ahash::RandomState>,
    pub rounds: usize,
}

impl<'a, G: QueryableGraph> IteratedPageRank<'a, G> {
    pub fn new(g: &'a G, config: &Config) -> crate::Result<Self> {
        let damping = config.damping;
        // d < 1 strictly, otherwise the update is no contraction and the
        // loop in `calc` may never terminate
        if !(damping > 0.0 && damping < 1.0) {
            return Err(Error::InvalidDamping(damping));
        }
        let epsilon = config.epsilon;
        assert!(epsilon > 0.0, "epsilon={epsilon}");
        if g.vertex_size() == 0 {
            return Err(Error::EmptyGraph);
        }
        let mut out_links = HashMap::with_hasher(ahash::RandomState::new());
        let mut dangling = vec![];
        for u in g.iter_vertices() {
            let sinks: Vec<_> = g.out_edges(&u).map(|e| e.sink).collect();
            if sinks.is_empty() {
                dangling.push(u);
            }
            out_links.insert(u, sinks);
        }
        Ok(Self {
            graph: g,
            damping,
            epsilon,
            out_links,
            dangling,
        })
    }
}

impl<G: QueryableGraph> PageRank for IteratedPageRank<'_, G> {
    type Result = self::Result;

    fn calc(&self) -> Self::Result {
        let damping = self.damping;
        let n = self.graph.vertex_size() as f64;
        let mut p: HashMap<_, _, ahash::RandomState> = self
            .graph
            .iter_vertices()
            .map(|v| (v, 1.0 / n))
            .collect();
        let mut r = HashMap::with_hasher(ahash::RandomState::new());
        let mut delta = HashMap::with_hasher(ahash::RandomState::new());
        let mut rounds = 0;
        loop {
            rounds += 1;
            let dangling_mass: f64 = self.dangling.iter().map(|v| *p.get(v).unwrap()).sum();
            let base = (1.0 - damping) / n + damping * dangling_mass / n;
            for v in self.graph.iter_vertices() {
                r.insert(v, base);
            }
            for (u, sinks) in self.out_links.iter() {
                if sinks.is_empty() {
                    continue;
                }
                let share = damping * p.get(u).unwrap() / (sinks.len() as f64);
                for v in sinks.iter() {
                    *r.get_mut(v).unwrap() += share;
                }
            }

            delta.clear();
            for v in self.graph.iter_vertices() {
                let a = p.get(&v).unwrap();
                let b = r.get(&v).unwrap();
                delta.insert(v, a - b);
            }

            if norm_inf(&delta) <= self.epsilon {
                return Self::Result {
                    page_rank: r,
                    delta,
                    rounds,
                };
            }

            std::mem::swap(&mut p, &mut r);
            r.clear();
        }
    }
}

impl PageRankResult for self::Result {
    fn page_rank(&self) -> &HashMap<VertexId, f64, ahash::RandomState> {
        &self.page_rank
    }

    fn debug<'a, G: QueryableGraph>(&'a self, graph: &'a G) -> impl std::fmt::Debug + 'a {
        ResultDebug {
            graph,
            result: self,
        }
    }
}

pub struct ResultDebug<'a, G: QueryableGraph> {
    graph: &'a G,
    result: &'a self::Result,
}

impl<G: QueryableGraph> std::fmt::Debug for ResultDebug<'_, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for v in self.graph.iter_vertices() {
            let p = self.result.page_rank.get(&v).unwrap();
            let d = self.result.delta.get(&v).unwrap();
            writeln!(f, "{v:?}: {p:?}, {d:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algograph::graph::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn single_page_converges_in_one_round() {
        let mut g = directed::TreeBackedGraph::new();
        let a = g.add_vertex();

        let res = IteratedPageRank::new(&g, &Config::default()).unwrap().calc();
        assert_eq!(res.rounds, 1);
        assert!((res.page_rank.get(&a).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn two_page_cycle_splits_evenly() {
        let mut g = directed::TreeBackedGraph::new();
        let a = g.add_vertex();
        let b = g.add_vertex();
        g.add_edge(a, b);
        g.add_edge(b, a);

        let res = IteratedPageRank::new(&g, &Config::default()).unwrap().calc();
        assert!((res.page_rank.get(&a).unwrap() - 0.5).abs() < 1e-12);
        assert!((res.page_rank.get(&b).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn dangling_pages_leak_no_mass() {
        // a -> {b, c}, both b and c dangling
        let mut g = directed::TreeBackedGraph::new();
        let a = g.add_vertex();
        let b = g.add_vertex();
        let c = g.add_vertex();
        g.add_edge(a, b);
        g.add_edge(a, c);

        let res = IteratedPageRank::new(&g, &Config::default()).unwrap().calc();
        assert!((norm_1(&res.page_rank) - 1.0).abs() < 1e-9, "{:?}", res.page_rank);
        assert!(res.page_rank.get(&b).unwrap() > res.page_rank.get(&a).unwrap());
    }

    #[test]
    fn all_dangling_is_uniform_immediately() {
        let mut g = directed::TreeBackedGraph::new();
        let vs: Vec<_> = (0..5).map(|_| g.add_vertex()).collect();

        let res = IteratedPageRank::new(&g, &Config::default()).unwrap().calc();
        assert_eq!(res.rounds, 1);
        for v in vs.iter() {
            assert!((res.page_rank.get(v).unwrap() - 0.2).abs() < 1e-12);
        }
    }

    #[test]
    fn small_cycle_reaches_fixed_point() {
        // a -> b, b -> {a, c}, c -> a
        let mut g = directed::TreeBackedGraph::new();
        let a = g.add_vertex();
        let b = g.add_vertex();
        let c = g.add_vertex();
        g.add_edge(a, b);
        g.add_edge(b, a);
        g.add_edge(b, c);
        g.add_edge(c, a);

        let res = IteratedPageRank::new(&g, &Config::default()).unwrap().calc();
        assert!(res.rounds < 100, "rounds={}", res.rounds);
        assert!(norm_inf(&res.delta) <= 0.001, "{:?}", res.delta);
        assert!((norm_1(&res.page_rank) - 1.0).abs() < 1e-9);
        let ra = res.page_rank.get(&a).unwrap();
        let rb = res.page_rank.get(&b).unwrap();
        let rc = res.page_rank.get(&c).unwrap();
        assert!(ra > rc && rb > rc, "a={ra} b={rb} c={rc}");
    }

    #[test]
    fn calc_is_deterministic() {
        let mut g = directed::TreeBackedGraph::new();
        let a = g.add_vertex();
        let b = g.add_vertex();
        let c = g.add_vertex();
        g.add_edge(a, b);
        g.add_edge(b, c);

        let pr = IteratedPageRank::new(&g, &Config::default()).unwrap();
        let r0 = pr.calc();
        let r1 = pr.calc();
        assert_eq!(r0.rounds, r1.rounds);
        for (v, w) in r0.page_rank.iter() {
            assert_eq!(w, r1.page_rank.get(v).unwrap());
        }
    }

    #[test]
    fn bad_damping_is_rejected() {
        let mut g = directed::TreeBackedGraph::new();
        let _ = g.add_vertex();
        for damping in [0.0, 1.0, 1.5] {
            let cfg = Config {
                damping,
                ..Config::default()
            };
            assert!(matches!(
                IteratedPageRank::new(&g, &cfg),
                Err(Error::InvalidDamping(_))
            ));
        }
    }

    #[test]
    fn empty_graph_is_rejected() {
        let g = directed::TreeBackedGraph::new();
        assert!(matches!(
            IteratedPageRank::new(&g, &Config::default()),
            Err(Error::EmptyGraph)
        ));
    }

    #[quickcheck]
    fn random_graph_sums_to_one(g: RandomGraph) {
        let res = IteratedPageRank::new(&g.graph, &Config::default())
            .unwrap()
            .calc();
        assert!((norm_1(&res.page_rank) - 1.0).abs() < 1e-6, "{:?}", res.page_rank);
        for w in res.page_rank.values() {
            assert!((0.0..=1.0).contains(w), "{w}");
        }
    }

    #[derive(Debug, Clone)]
    struct RandomGraph {
        graph: directed::TreeBackedGraph,
    }

    impl quickcheck::Arbitrary for RandomGraph {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            const N: usize = 10;

            let n: usize = usize::arbitrary(g) % N + 1;
            let mut graph = directed::TreeBackedGraph::new();
            let vertices: Vec<_> = (0..n).map(|_| graph.add_vertex()).collect();
            for _ in 0..(n * 2) {
                let v0 = vertices[usize::arbitrary(g) % vertices.len()];
                let v1 = vertices[usize::arbitrary(g) % vertices.len()];
                if v0 != v1 {
                    graph.add_edge(v0, v1);
                }
            }
            Self { graph }
        }
    }
}
