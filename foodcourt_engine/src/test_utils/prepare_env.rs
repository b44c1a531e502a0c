use std::path::Path;

use fcs_common::Money;
use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};

use crate::{
    db_types::{MenuItem, Seller},
    sqlite::db::catalog,
    SqliteDatabase,
};

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

pub fn random_db_path() -> String {
    format!("sqlite:///tmp/foodcourt_test_{}.db", rand::random::<u64>())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection to database");
    migrate!("./migrations").run(db.pool()).await.expect("Error running DB migrations");
    info!("🚀️ Migrations complete");
}

pub async fn create_database<P: AsRef<Path>>(path: P) {
    let p = path.as_ref().as_os_str().to_str().unwrap();
    if let Err(e) = Sqlite::drop_database(p).await {
        warn!("Error dropping database {p}: {e:?}");
    }
    Sqlite::create_database(p).await.expect("Error creating database");
    info!("Created Sqlite database {p}");
}

/// Inserts a seller for tests. `payout_account: None` exercises the manual settlement path.
pub async fn seed_seller(
    db: &SqliteDatabase,
    name: &str,
    commission_rate: f64,
    payout_account: Option<&str>,
) -> Seller {
    let mut conn = db.pool().acquire().await.expect("Error acquiring connection");
    catalog::insert_seller(name, commission_rate, payout_account, &mut conn).await.expect("Error inserting seller")
}

pub async fn seed_menu_item(db: &SqliteDatabase, seller_id: i64, name: &str, price: i64) -> MenuItem {
    let mut conn = db.pool().acquire().await.expect("Error acquiring connection");
    catalog::insert_menu_item(seller_id, name, Money::from(price), &mut conn).await.expect("Error inserting menu item")
}
