mod common;
pub use self::common::*;

pub mod page_rank;
pub use self::page_rank::{PageRank, PageRankResult};

use algograph::graph::VertexId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("page {0:?} is not in the graph")]
    InvalidPage(VertexId),
    #[error("damping factor must be in (0, 1): {0}")]
    InvalidDamping(f64),
    #[error("graph has no pages")]
    EmptyGraph,
    #[error("sample count must be at least 1: {0}")]
    DegenerateSample(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
