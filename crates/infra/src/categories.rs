use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::models::{AgeCategoryRow, Gender};

/// A distance offered by a competition.
#[derive(Debug, Clone, PartialEq)]
pub struct Distance {
    pub name: String,
    pub km: f32,
}

/// One result bucket to be created for a competition.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketPlan {
    pub age_category_id: Uuid,
    pub distance_name: String,
    pub distance_in_km: f32,
    pub gender: Gender,
}

/// Age in whole years on `on`. A birthday not yet reached that year counts one less.
pub fn age_on(birth_date: NaiveDate, on: NaiveDate) -> i32 {
    let mut age = on.year() - birth_date.year();
    if (on.month(), on.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Cross product of age categories, distances (shortest first) and genders.
pub fn seed_plan(categories: &[AgeCategoryRow], distances: &[Distance]) -> Vec<BucketPlan> {
    let mut distances: Vec<&Distance> = distances.iter().collect();
    distances.sort_by(|a, b| a.km.total_cmp(&b.km));

    let mut plan = Vec::with_capacity(categories.len() * distances.len() * Gender::ALL.len());
    for category in categories {
        for distance in &distances {
            for gender in Gender::ALL {
                plan.push(BucketPlan {
                    age_category_id: category.id,
                    distance_name: distance.name.clone(),
                    distance_in_km: distance.km,
                    gender,
                });
            }
        }
    }
    plan
}
