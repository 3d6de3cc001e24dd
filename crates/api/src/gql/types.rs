// Shared GraphQL types live in `common`; domain types live next to their resolvers.
// This module re-exports both so resolvers can import from one place.

pub use crate::gql::common::types::{Gender, PaginatedResponse, PaginationInput, Role};
pub use crate::gql::scalars::RunTime;

pub use crate::gql::domains::age_categories::types::{AgeCategory, CreateAgeCategoryInput};
pub use crate::gql::domains::clubs::types::{
    Club, ClubWithMembers, CreateClubInput, UpdateClubInput,
};
pub use crate::gql::domains::competitions::types::{
    Competition, CompetitionFilterInput, CompetitionPerCategory, CreateCompetitionInput, Distance,
    DistanceInput, UpdateCompetitionInput,
};
pub use crate::gql::domains::persons::types::{
    CreatePersonInput, Person, Profile, UpdatePersonInput,
};
pub use crate::gql::domains::registrations::types::{
    Registration, RegistrationFilterInput, SignInToContestInput, UpdateRegistrationInput,
};
pub use crate::gql::domains::results::types::{
    ResultEntry, ResultRecordedEvent, RunTimeEntryInput,
};
