use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use crate::run_time::RunTime;

/// Gender as persisted in `char(1)` columns: `M` (male) or `V` (female).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "V",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" | "m" => Ok(Gender::Male),
            "V" | "v" | "F" | "f" => Ok(Gender::Female),
            other => Err(format!("Unknown gender code: {}", other)),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ClubRow {
    pub id: Uuid,
    pub name: String,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PersonRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: String,
    pub email: Option<String>,
    pub iban_number: Option<String>,
    pub club_id: Option<Uuid>,
    pub user_id: Uuid,
    pub is_email_confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PersonRow {
    pub fn age_on(&self, date: NaiveDate) -> i32 {
        crate::categories::age_on(self.birth_date, date)
    }
}

/// Login material for a person, joined with the profile role.
#[derive(Debug, Clone, FromRow)]
pub struct PersonCredentialsRow {
    pub id: Uuid,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    pub person_id: Uuid,
    pub role: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct AgeCategoryRow {
    pub id: Uuid,
    pub name: String,
    pub minimum_age: i32,
    pub maximum_age: i32,
}

impl AgeCategoryRow {
    pub fn overlaps(&self, minimum_age: i32, maximum_age: i32) -> bool {
        self.minimum_age <= maximum_age && minimum_age <= self.maximum_age
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CompetitionRow {
    pub id: Uuid,
    pub name: String,
    pub information: Option<String>,
    pub date: DateTime<Utc>,
    pub active: bool,
    pub ranking_active: bool,
    pub img_url: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CompetitionPerCategoryRow {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub age_category_id: Uuid,
    pub distance_name: String,
    pub distance_in_km: f32,
    pub gender: String,
    pub gun_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RegistrationRow {
    pub id: Uuid,
    pub person_id: Uuid,
    pub competition_id: Uuid,
    pub competition_per_category_id: Uuid,
    pub run_number: Option<i16>,
    pub run_time_ms: Option<i64>,
    pub paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RegistrationRow {
    pub fn run_time(&self) -> Option<RunTime> {
        self.run_time_ms.map(RunTime::from_millis)
    }
}

/// A timed registration joined with the runner and the bucket it was run in.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ResultRow {
    pub registration_id: Uuid,
    pub competition_id: Uuid,
    pub competition_name: String,
    pub competition_date: DateTime<Utc>,
    pub person_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub club_id: Option<Uuid>,
    pub competition_per_category_id: Uuid,
    pub distance_name: String,
    pub distance_in_km: f32,
    pub age_category_id: Uuid,
    pub age_category_name: String,
    pub run_number: i16,
    pub run_time_ms: i64,
}
