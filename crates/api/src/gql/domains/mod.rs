// Each domain contains: mod.rs, resolvers.rs, types.rs and, where the rules
// outgrow a resolver, service.rs

pub mod age_categories;
pub mod clubs;
pub mod competitions;
pub mod persons;
pub mod registrations;
pub mod results;
