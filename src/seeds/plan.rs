//! Plan catalogue seeding
//!
//! Creates the three canonical membership plans when they are missing, so a
//! fresh deployment has something to assign. Existing plans are left alone,
//! including any price edits an admin made.

use anyhow::Result;
use sea_orm::DatabaseConnection;

use crate::repositories::{CreatePlanRequest, PlanRepository};

struct PlanSeed {
    name: &'static str,
    price_cents: i64,
    duration_days: i32,
    description: &'static str,
}

const PLAN_SEEDS: &[PlanSeed] = &[
    PlanSeed {
        name: "BASICO",
        price_cents: 2500,
        duration_days: 30,
        description: "Gym floor access during staffed hours",
    },
    PlanSeed {
        name: "PREMIUM",
        price_cents: 4500,
        duration_days: 30,
        description: "Gym floor plus group classes",
    },
    PlanSeed {
        name: "VIP",
        price_cents: 8000,
        duration_days: 30,
        description: "All access with personal trainer sessions",
    },
];

/// Seeds the plans table with the canonical catalogue, idempotently
pub async fn seed_plans(db: &DatabaseConnection) -> Result<()> {
    let repo = PlanRepository::new(db);

    for seed in PLAN_SEEDS {
        match repo.get_plan_by_name(seed.name).await {
            Ok(Some(_)) => {
                log::info!("Plan '{}' already exists, skipping", seed.name);
            }
            Ok(None) => {
                log::info!("Creating plan: {}", seed.name);
                repo.create_plan(CreatePlanRequest {
                    name: seed.name.to_string(),
                    price_cents: seed.price_cents,
                    duration_days: seed.duration_days,
                    description: Some(seed.description.to_string()),
                })
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create plan '{}': {}", seed.name, e))?;
            }
            Err(e) => {
                log::error!("Error checking if plan '{}' exists: {}", seed.name, e);
                return Err(anyhow::anyhow!(e));
            }
        }
    }

    log::info!("Plan seeding completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        seed_plans(&db).await.unwrap();
        seed_plans(&db).await.unwrap();

        let repo = PlanRepository::new(&db);
        let plans = repo.list_plans().await.unwrap();
        assert_eq!(plans.len(), 3);
        assert!(repo.get_plan_by_name("VIP").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn seeding_preserves_admin_edits() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        seed_plans(&db).await.unwrap();

        let repo = PlanRepository::new(&db);
        let basico = repo.get_plan_by_name("BASICO").await.unwrap().unwrap();
        repo.update_plan(
            basico.id,
            crate::repositories::UpdatePlanRequest {
                price_cents: Some(9999),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        seed_plans(&db).await.unwrap();
        let basico = repo.get_plan_by_name("BASICO").await.unwrap().unwrap();
        assert_eq!(basico.price_cents, 9999);
    }
}
