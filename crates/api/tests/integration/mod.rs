mod auth;
mod club;
mod competition;
mod person;
mod registration;
