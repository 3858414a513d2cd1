// SPDX-License-Identifier: MIT

use coursetrack::config::Config;
use coursetrack::db::FirestoreDb;
use coursetrack::routes::create_router;
use coursetrack::services::{ObjectStore, PasswordVault, Thumbnailer};
use coursetrack::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Build test state with offline mock dependencies.
#[allow(dead_code)]
pub fn test_state(db: FirestoreDb) -> Arc<AppState> {
    let config = Config::test_default();
    let password_vault = PasswordVault::new(&config.password_key).expect("valid test key");
    let object_store = ObjectStore::new_mock();
    let thumbnailer = Thumbnailer::new_mock();

    Arc::new(AppState::new(
        config,
        db,
        password_vault,
        object_store,
        thumbnailer,
    ))
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state(test_db_offline());
    (create_router(state.clone()), state)
}
