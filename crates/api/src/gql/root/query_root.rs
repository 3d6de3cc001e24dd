use async_graphql::MergedObject;

use crate::gql::domains::age_categories::AgeCategoryQuery;
use crate::gql::domains::clubs::ClubQuery;
use crate::gql::domains::competitions::{CompetitionPerCategoryQuery, CompetitionQuery};
use crate::gql::domains::persons::PersonQuery;
use crate::gql::domains::registrations::RegistrationQuery;
use crate::gql::domains::results::ResultQuery;

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    AgeCategoryQuery,
    ClubQuery,
    CompetitionQuery,
    CompetitionPerCategoryQuery,
    PersonQuery,
    RegistrationQuery,
    ResultQuery,
);
