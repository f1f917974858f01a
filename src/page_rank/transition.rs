use crate::*;
use algograph::graph::{QueryableGraph, VertexId};
use std::collections::HashMap;

/// One-step random-surfer distribution over a directed page graph.
///
/// From a page with `k > 0` out-links, the surfer follows one of them with
/// probability `damping / k` each, and jumps to a uniformly random page with
/// probability `1 - damping`. A dangling page (`k == 0`) is treated as
/// linking to the whole corpus uniformly, so its distribution is exactly
/// `1 / n` everywhere and no probability mass leaks out of the graph.
pub struct TransitionModel<'a, G>
where
    G: QueryableGraph,
{
    graph: &'a G,
    damping: f64,
}

impl<'a, G: QueryableGraph> TransitionModel<'a, G> {
    pub fn new(g: &'a G, damping: f64) -> crate::Result<Self> {
        if !(damping > 0.0 && damping < 1.0) {
            return Err(Error::InvalidDamping(damping));
        }
        if g.vertex_size() == 0 {
            return Err(Error::EmptyGraph);
        }
        Ok(Self { graph: g, damping })
    }

    /// The distribution of the next page, given the surfer sits on `page`.
    ///
    /// Every page of the graph appears as a key and the values sum to 1.
    pub fn distribution(
        &self,
        page: VertexId,
    ) -> crate::Result<HashMap<VertexId, f64, ahash::RandomState>> {
        if !self.graph.contains_vertex(&page) {
            return Err(Error::InvalidPage(page));
        }
        let n = self.graph.vertex_size() as f64;
        let mut dist: HashMap<_, _, ahash::RandomState> = self
            .graph
            .iter_vertices()
            .map(|v| (v, (1.0 - self.damping) / n))
            .collect();
        let k = self.graph.out_edges(&page).count();
        if k > 0 {
            // parallel edges stack
            let unit = self.damping / (k as f64);
            for v in self.graph.out_edges(&page).map(|e| e.sink) {
                *dist.get_mut(&v).unwrap() += unit;
            }
        } else {
            for w in dist.values_mut() {
                *w += self.damping / n;
            }
        }
        Ok(dist)
    }
}
