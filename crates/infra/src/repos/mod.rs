pub mod age_categories;
pub mod clubs;
pub mod competition_per_categories;
pub mod competitions;
pub mod persons;
pub mod profiles;
pub mod registrations;
pub mod results;
pub mod revoked_tokens;

pub use competitions::{CompetitionFilter, CreateCompetitionData, UpdateCompetitionData};
pub use persons::{CreatePersonData, PersonFilter, UpdatePersonData};
pub use registrations::{CreateRegistrationData, RegistrationFilter, RunNumberChange};
