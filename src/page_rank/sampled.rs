use super::transition::TransitionModel;
use super::*;
use crate::*;
use algograph::graph::{QueryableGraph, VertexId};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::{cell::RefCell, collections::HashMap};

/// PageRank estimated by a long random walk.
///
/// The walk starts at a uniformly chosen page and advances by drawing from
/// the current page's transition distribution; each page's rank is its
/// visitation frequency over exactly `samples` steps. The generator is
/// injected at construction, so a seeded run is reproducible.
pub struct SamplingPageRank<'a, G, R>
where
    G: QueryableGraph,
    R: Rng,
{
    graph: &'a G,
    samples: usize,
    vertices: Vec<VertexId>,
    choosers: HashMap<VertexId, WeightedIndex<f64>, ahash::RandomState>,
    rng: RefCell<R>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub damping: f64,
    pub samples: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            damping: 0.85,
            samples: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Result {
    pub page_rank: HashMap<VertexId, f64, ahash::RandomState>,
    pub visits: HashMap<VertexId, u64, ahash::RandomState>,
}

impl<'a, G: QueryableGraph, R: Rng> SamplingPageRank<'a, G, R> {
    pub fn new(g: &'a G, config: &Config, rng: R) -> crate::Result<Self> {
        if config.samples < 1 {
            return Err(Error::DegenerateSample(config.samples));
        }
        let model = TransitionModel::new(g, config.damping)?;
        let vertices: Vec<_> = g.iter_vertices().collect();
        let choosers = {
            let mut choosers = HashMap::with_hasher(ahash::RandomState::new());
            for u in vertices.iter() {
                let dist = model.distribution(*u)?;
                let weights: Vec<f64> = vertices.iter().map(|v| *dist.get(v).unwrap()).collect();
                // all weights carry at least the jump term, hence > 0
                choosers.insert(*u, WeightedIndex::new(weights).unwrap());
            }
            choosers
        };
        Ok(Self {
            graph: g,
            samples: config.samples,
            vertices,
            choosers,
            rng: RefCell::new(rng),
        })
    }
}

impl<G: QueryableGraph, R: Rng> PageRank for SamplingPageRank<'_, G, R> {
    type Result = self::Result;

    fn calc(&self) -> Self::Result {
        let mut rng = self.rng.borrow_mut();
        let mut visits: HashMap<_, _, ahash::RandomState> =
            self.graph.iter_vertices().map(|v| (v, 0u64)).collect();
        let mut cur = *self.vertices.choose(&mut *rng).unwrap();
        *visits.get_mut(&cur).unwrap() += 1;
        for _ in 1..self.samples {
            let chooser = self.choosers.get(&cur).unwrap();
            cur = self.vertices[chooser.sample(&mut *rng)];
            *visits.get_mut(&cur).unwrap() += 1;
        }

        let n = self.samples as f64;
        let page_rank = visits.iter().map(|(v, c)| (*v, *c as f64 / n)).collect();
        Self::Result { page_rank, visits }
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
            let c = self.result.visits.get(&v).unwrap();
            writeln!(f, "{v:?}: {p:?}, {c:?}")?;
        }
        Ok(())
    }
}
