pub mod buckets;
pub mod resolvers;
pub mod service;
pub mod types;

pub use buckets::{CompetitionPerCategoryMutation, CompetitionPerCategoryQuery};
pub use resolvers::{CompetitionMutation, CompetitionQuery};
