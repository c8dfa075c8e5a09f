//! Integration tests for `DieselAssetRepository` against embedded PostgreSQL.
//!
//! Each test gets its own database cloned from the migrated template plus
//! three seeded users. Row-lock behaviour is observed from a second session
//! opened with the synchronous `postgres` client.

use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use marketplace::domain::ports::{
    AssetRepository, AssetRepositoryError, RowLock, with_transaction,
};
use marketplace::domain::{AssetId, AssetService, NewAsset, Price, PurchaseError, UserId};
use marketplace::outbound::persistence::{DbPool, DieselAssetRepository, PoolConfig};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::{Builder, Runtime};

mod support;

use support::embedded_postgres::{connect, insert_user, owner_of};
use support::{handle_cluster_setup_failure, provision_template_database, shared_cluster};

struct TestContext {
    runtime: Runtime,
    pool: DbPool,
    repository: DieselAssetRepository,
    database_url: String,
    users: [UserId; 3],
    _database: TemporaryDatabase,
}

impl TestContext {
    fn service(&self) -> AssetService<DieselAssetRepository> {
        AssetService::new(Arc::new(self.repository.clone()))
    }

    fn seed_asset(&self, owner: UserId) -> AssetId {
        let asset = NewAsset::new(owner, "Lamp", "brass", Price::new(100.0).expect("price"))
            .expect("valid asset");
        self.runtime
            .block_on(self.repository.create(&asset))
            .expect("seed asset")
    }

    fn committed_owner(&self, asset_id: AssetId) -> Option<i64> {
        let mut client = connect(&self.database_url).expect("second session");
        owner_of(&mut client, asset_id.get()).expect("read owner")
    }
}

fn setup_test_context() -> Result<TestContext, String> {
    let runtime = Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_template_database(cluster)?;
    let database_url = database.url().to_string();

    let mut client = connect(&database_url)?;
    let mut users = Vec::with_capacity(3);
    for name in ["ada", "bob", "cyd"] {
        let id = insert_user(&mut client, name)?;
        users.push(UserId::new(id).map_err(|err| err.to_string())?);
    }
    let users: [UserId; 3] = users
        .try_into()
        .map_err(|_| "expected three users".to_owned())?;

    let config = PoolConfig::new(&database_url)
        .with_max_size(4)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;
    let repository = DieselAssetRepository::new(pool.clone());

    Ok(TestContext {
        runtime,
        pool,
        repository,
        database_url,
        users,
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

#[rstest]
fn create_then_read_back(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else { return };
    let [ada, bob, _] = ctx.users;
    let asset_id = ctx.seed_asset(ada);

    let found = ctx
        .runtime
        .block_on(ctx.repository.find_by_id(asset_id))
        .expect("find")
        .expect("asset exists");
    assert_eq!(found.id, asset_id);
    assert_eq!(found.owner_id, ada);
    assert_eq!(found.name, "Lamp");
    assert_eq!(found.description, "brass");
    assert_eq!(found.price.get(), 100.0);

    let listed = ctx
        .runtime
        .block_on(ctx.repository.list_by_owner(ada))
        .expect("list");
    assert_eq!(listed, vec![found]);
    let none = ctx
        .runtime
        .block_on(ctx.repository.list_by_owner(bob))
        .expect("list");
    assert!(none.is_empty());
}

#[rstest]
fn create_for_unknown_owner_violates_constraint(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else { return };
    let stranger = UserId::new(9_999).expect("user id");
    let asset = NewAsset::new(stranger, "Lamp", "", Price::new(1.0).expect("price"))
        .expect("valid asset");

    let err = ctx
        .runtime
        .block_on(ctx.repository.create(&asset))
        .expect_err("foreign key");

    assert!(
        matches!(err, AssetRepositoryError::Constraint { .. }),
        "unexpected error: {err:?}"
    );
}

#[rstest]
fn delete_requires_ownership(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else { return };
    let [ada, bob, _] = ctx.users;
    let asset_id = ctx.seed_asset(ada);

    let err = ctx
        .runtime
        .block_on(ctx.repository.delete_owned(asset_id, bob))
        .expect_err("not owner");
    assert_eq!(err, AssetRepositoryError::not_found_or_not_owned());
    assert_eq!(ctx.committed_owner(asset_id), Some(ada.get()));

    ctx.runtime
        .block_on(ctx.repository.delete_owned(asset_id, ada))
        .expect("owner deletes");
    assert_eq!(ctx.committed_owner(asset_id), None);

    let again = ctx
        .runtime
        .block_on(ctx.repository.delete_owned(asset_id, ada))
        .expect_err("already gone");
    assert_eq!(again, AssetRepositoryError::not_found_or_not_owned());
}

#[rstest]
fn purchase_scenario_round_trips_ownership(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else { return };
    let [ada, bob, _] = ctx.users;
    let asset_id = ctx.seed_asset(ada);
    let service = ctx.service();

    ctx.runtime
        .block_on(service.purchase(asset_id, bob))
        .expect("bob buys");
    assert_eq!(ctx.committed_owner(asset_id), Some(bob.get()));

    let err = ctx
        .runtime
        .block_on(service.purchase(asset_id, bob))
        .expect_err("own asset");
    assert_eq!(err, PurchaseError::OwnAsset { asset_id });

    ctx.runtime
        .block_on(service.purchase(asset_id, ada))
        .expect("ada buys back");
    assert_eq!(ctx.committed_owner(asset_id), Some(ada.get()));
}

#[rstest]
fn purchase_of_missing_asset_is_not_found(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else { return };
    let [_, bob, _] = ctx.users;
    let asset_id = AssetId::new(424_242).expect("asset id");

    let err = ctx
        .runtime
        .block_on(ctx.service().purchase(asset_id, bob))
        .expect_err("missing");

    assert_eq!(err, PurchaseError::AssetNotFound { asset_id });
}

#[rstest]
fn failed_unit_of_work_rolls_back(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else { return };
    let [ada, bob, _] = ctx.users;
    let asset_id = ctx.seed_asset(ada);

    let result: Result<(), AssetRepositoryError> =
        ctx.runtime.block_on(with_transaction(&ctx.repository, |tx| {
            async move {
                tx.find_by_id(asset_id, RowLock::Exclusive).await?;
                tx.reassign_owner(asset_id, bob).await?;
                Err(AssetRepositoryError::query("injected fault"))
            }
            .boxed()
        }));

    assert_eq!(result, Err(AssetRepositoryError::query("injected fault")));
    assert_eq!(ctx.committed_owner(asset_id), Some(ada.get()));
}

#[rstest]
fn dropped_unit_of_work_rolls_back_and_releases_lock(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else { return };
    let [ada, bob, cyd] = ctx.users;
    let asset_id = ctx.seed_asset(ada);

    ctx.runtime.block_on(async {
        let mut unit = ctx.repository.begin().await.expect("begin");
        unit.operations()
            .find_by_id(asset_id, RowLock::Exclusive)
            .await
            .expect("lock row");
        unit.operations()
            .reassign_owner(asset_id, bob)
            .await
            .expect("stage write");
        drop(unit);
    });
    assert_eq!(ctx.committed_owner(asset_id), Some(ada.get()));

    let transfer = ctx
        .runtime
        .block_on(ctx.service().purchase(asset_id, cyd))
        .expect("lock released");
    assert_eq!(transfer.seller_id, ada);
    assert_eq!(ctx.committed_owner(asset_id), Some(cyd.get()));
}

#[rstest]
fn exclusive_read_waits_for_the_lock_holder(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else { return };
    let [ada, bob, cyd] = ctx.users;
    let asset_id = ctx.seed_asset(ada);
    let service = ctx.service();

    let transfer = ctx.runtime.block_on(async {
        let mut holder = ctx.repository.begin().await.expect("begin");
        holder
            .operations()
            .find_by_id(asset_id, RowLock::Exclusive)
            .await
            .expect("lock row");

        let contender = tokio::spawn(async move { service.purchase(asset_id, cyd).await });
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!contender.is_finished(), "second buyer must block");

        holder
            .operations()
            .reassign_owner(asset_id, bob)
            .await
            .expect("first buyer writes");
        holder.commit().await.expect("commit");

        contender.await.expect("join").expect("second purchase")
    });

    // The blocked buyer saw the post-transfer owner, not the original one.
    assert_eq!(transfer.seller_id, bob);
    assert_eq!(ctx.committed_owner(asset_id), Some(cyd.get()));
}

#[rstest]
fn concurrent_purchases_transfer_from_the_original_owner_once(
    diesel_world: Option<TestContext>,
) {
    let Some(ctx) = diesel_world else { return };
    let [ada, bob, cyd] = ctx.users;
    let asset_id = ctx.seed_asset(ada);

    let outcomes = ctx.runtime.block_on(async {
        let first = tokio::spawn({
            let service = ctx.service();
            async move { service.purchase(asset_id, bob).await }
        });
        let second = tokio::spawn({
            let service = ctx.service();
            async move { service.purchase(asset_id, cyd).await }
        });
        [
            first.await.expect("join first"),
            second.await.expect("join second"),
        ]
    });

    let from_original = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Ok(transfer) if transfer.seller_id == ada))
        .count();
    assert_eq!(from_original, 1);
    let owner = ctx.committed_owner(asset_id);
    assert!(
        owner == Some(bob.get()) || owner == Some(cyd.get()),
        "unexpected owner {owner:?}"
    );
}

#[rstest]
fn lock_timeout_bounds_waits_for_a_held_row(diesel_world: Option<TestContext>) {
    let Some(ctx) = diesel_world else { return };
    let [ada, bob, _] = ctx.users;
    let asset_id = ctx.seed_asset(ada);
    let impatient = AssetService::new(Arc::new(
        DieselAssetRepository::new(ctx.pool.clone()).with_lock_timeout(Duration::from_millis(100)),
    ));

    let mut other_session = connect(&ctx.database_url).expect("second session");
    other_session
        .batch_execute(&format!(
            "BEGIN; SELECT id FROM assets WHERE id = {} FOR UPDATE;",
            asset_id.get()
        ))
        .expect("hold row lock");

    let err = ctx
        .runtime
        .block_on(impatient.purchase(asset_id, bob))
        .expect_err("lock wait expires");
    assert!(
        matches!(err, PurchaseError::Store(AssetRepositoryError::Query { .. })),
        "unexpected error: {err:?}"
    );

    other_session.batch_execute("ROLLBACK;").expect("release lock");
    ctx.runtime
        .block_on(impatient.purchase(asset_id, bob))
        .expect("purchase after release");
    assert_eq!(ctx.committed_owner(asset_id), Some(bob.get()));
}
