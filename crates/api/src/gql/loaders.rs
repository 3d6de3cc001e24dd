use async_graphql::dataloader::Loader;
use infra::db::Db;
use infra::models::{
    AgeCategoryRow, ClubRow, CompetitionPerCategoryRow, CompetitionRow, PersonRow, ProfileRow,
    RegistrationRow,
};
use infra::repos::{
    age_categories, clubs, competition_per_categories, competitions, persons, profiles,
    registrations,
};
use std::{collections::HashMap, future::Future, sync::Arc};
use uuid::Uuid;

/// Declares a DataLoader batching lookups by primary key through a repo `get_by_ids`.
macro_rules! id_loader {
    ($(#[$meta:meta])* $name:ident, $row:ty, $fetch:path) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            pool: Db,
        }

        impl $name {
            pub fn new(pool: Db) -> Self {
                Self { pool }
            }
        }

        impl Loader<Uuid> for $name {
            type Value = $row;
            type Error = Arc<sqlx::Error>;

            fn load(
                &self,
                keys: &[Uuid],
            ) -> impl Future<Output = std::result::Result<HashMap<Uuid, Self::Value>, Self::Error>>
                   + Send {
                let pool = self.pool.clone();
                let ids: Vec<Uuid> = keys.to_vec();

                async move {
                    if ids.is_empty() {
                        return Ok(HashMap::new());
                    }

                    let rows: Vec<$row> = $fetch(&pool, &ids).await.map_err(Arc::new)?;
                    Ok(rows.into_iter().map(|r| (r.id, r)).collect())
                }
            }
        }
    };
}

id_loader!(ClubLoader, ClubRow, clubs::get_by_ids);
id_loader!(PersonLoader, PersonRow, persons::get_by_ids);
id_loader!(CompetitionLoader, CompetitionRow, competitions::get_by_ids);
id_loader!(AgeCategoryLoader, AgeCategoryRow, age_categories::get_by_ids);
id_loader!(
    /// Buckets (competition per category) by id.
    CompetitionPerCategoryLoader,
    CompetitionPerCategoryRow,
    competition_per_categories::get_by_ids
);
id_loader!(RegistrationLoader, RegistrationRow, registrations::get_by_ids);

/// Stored profiles keyed by person id, so role checks inside field resolvers batch.
#[derive(Clone)]
pub struct ProfileLoader {
    pool: Db,
}

impl ProfileLoader {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }
}

impl Loader<Uuid> for ProfileLoader {
    type Value = ProfileRow;
    type Error = Arc<sqlx::Error>;

    fn load(
        &self,
        keys: &[Uuid],
    ) -> impl Future<Output = std::result::Result<HashMap<Uuid, Self::Value>, Self::Error>> + Send
    {
        let pool = self.pool.clone();
        let person_ids: Vec<Uuid> = keys.to_vec();

        async move {
            let rows = profiles::get_by_person_ids(&pool, &person_ids)
                .await
                .map_err(Arc::new)?;
            Ok(rows.into_iter().map(|r| (r.person_id, r)).collect())
        }
    }
}
