use async_graphql::dataloader::DataLoader;
use async_graphql::Schema;

use super::loaders::{
    AgeCategoryLoader, ClubLoader, CompetitionLoader, CompetitionPerCategoryLoader, PersonLoader,
    ProfileLoader, RegistrationLoader,
};
use super::{MutationRoot, QueryRoot, SubscriptionRoot};
use crate::config::env_flag;
use crate::state::AppState;

pub type AppSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// Build the GraphQL schema and inject shared state (AppState) into the context.
pub fn build_schema(state: AppState) -> AppSchema {
    let db = state.db.clone();

    let mut builder = Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        SubscriptionRoot,
    )
    .data(state)
    .data(DataLoader::new(ClubLoader::new(db.clone()), tokio::spawn))
    .data(DataLoader::new(PersonLoader::new(db.clone()), tokio::spawn))
    .data(DataLoader::new(CompetitionLoader::new(db.clone()), tokio::spawn))
    .data(DataLoader::new(AgeCategoryLoader::new(db.clone()), tokio::spawn))
    .data(DataLoader::new(
        CompetitionPerCategoryLoader::new(db.clone()),
        tokio::spawn,
    ))
    .data(DataLoader::new(RegistrationLoader::new(db.clone()), tokio::spawn))
    .data(DataLoader::new(ProfileLoader::new(db), tokio::spawn))
    .limit_depth(12)
    .limit_complexity(300);

    if !env_flag("GQL_INTROSPECTION", false) {
        builder = builder.disable_introspection();
    }

    builder.finish()
}
