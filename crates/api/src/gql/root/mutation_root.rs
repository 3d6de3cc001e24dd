use async_graphql::MergedObject;

use crate::gql::domains::age_categories::AgeCategoryMutation;
use crate::gql::domains::clubs::ClubMutation;
use crate::gql::domains::competitions::{CompetitionMutation, CompetitionPerCategoryMutation};
use crate::gql::domains::persons::PersonMutation;
use crate::gql::domains::registrations::RegistrationMutation;
use crate::gql::domains::results::ResultMutation;

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    AgeCategoryMutation,
    ClubMutation,
    CompetitionMutation,
    CompetitionPerCategoryMutation,
    PersonMutation,
    RegistrationMutation,
    ResultMutation,
);
