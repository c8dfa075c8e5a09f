//! Integration tests for `DieselUserRepository` against embedded PostgreSQL.

use marketplace::domain::ports::{UserPersistenceError, UserRepository};
use marketplace::domain::{PasswordHash, Username};
use marketplace::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::{handle_cluster_setup_failure, provision_template_database, shared_cluster};

struct TestContext {
    runtime: Runtime,
    repository: DieselUserRepository,
    _database: TemporaryDatabase,
}

fn setup_test_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_template_database(cluster)?;

    let config = PoolConfig::new(database.url().to_string())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        repository: DieselUserRepository::new(pool),
        _database: database,
    })
}

#[fixture]
fn diesel_world() -> Option<TestContext> {
    match setup_test_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn name(raw: &str) -> Username {
    Username::new(raw).expect("valid username")
}

#[rstest]
fn created_accounts_are_found_by_username(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else { return };
    let hash = PasswordHash::new("$2b$04$stored");

    let ada = ctx
        .runtime
        .block_on(ctx.repository.create(&name("ada"), &hash))
        .expect("create ada");
    let bob = ctx
        .runtime
        .block_on(ctx.repository.create(&name("bob"), &hash))
        .expect("create bob");
    assert_ne!(ada, bob);

    let found = ctx
        .runtime
        .block_on(ctx.repository.find_by_username("ada"))
        .expect("lookup")
        .expect("ada exists");
    assert_eq!(found.user.id(), ada);
    assert_eq!(found.user.username().as_ref(), "ada");
    assert_eq!(found.password_hash.as_str(), "$2b$04$stored");
}

#[rstest]
fn unknown_username_is_absent(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else { return };

    let found = ctx
        .runtime
        .block_on(ctx.repository.find_by_username("nobody"))
        .expect("lookup");

    assert!(found.is_none());
}

#[rstest]
fn duplicate_username_is_rejected(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else { return };
    let hash = PasswordHash::new("$2b$04$stored");
    ctx.runtime
        .block_on(ctx.repository.create(&name("ada"), &hash))
        .expect("first");

    let err = ctx
        .runtime
        .block_on(ctx.repository.create(&name("ada"), &hash))
        .expect_err("duplicate");

    assert_eq!(err, UserPersistenceError::duplicate_username("ada"));
}
