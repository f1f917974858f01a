pub mod iterated;
pub mod sampled;
pub mod transition;

mod traits;
pub use self::traits::*;
