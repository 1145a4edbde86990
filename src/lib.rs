pub mod pair;
pub mod search;
pub mod travel;
pub mod volcano;

pub use pair::{best_pairing, Pairing};
pub use search::{Action, Plan, Searcher, Step};
pub use volcano::Volcano;
