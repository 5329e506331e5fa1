//! User repository tests against `PostgreSQL`.

use crate::postgres::helpers::{PgContext, pg_context};
use crate::test_helpers::register;
use chrono::TimeDelta;
use mockable::Clock;
use rstest::rstest;
use taskdesk::user::{
    domain::{DisplayName, ExternalId, Role, User, UserId},
    ports::{UserRepository, UserRepositoryError},
};

#[rstest]
fn registered_user_is_found_by_external_id(pg_context: PgContext) {
    let context = pg_context;

    let found = context
        .rt
        .block_on(context.users.find_by_external_id(ExternalId::new(2)))
        .expect("lookup")
        .expect("worker registered by the fixture");

    assert_eq!(found.id(), context.worker);
    assert_eq!(found.display_name().as_str(), "Alice");
    assert_eq!(found.role(), Role::Worker);
    assert!(found.is_active());
    context.cleanup();
}

#[rstest]
fn duplicate_external_id_is_rejected(pg_context: PgContext) {
    let context = pg_context;
    let clash = User::register(
        ExternalId::new(2),
        DisplayName::new("Impostor").expect("valid name"),
        Role::Worker,
        &context.clock,
    );

    let result = context.rt.block_on(context.users.store(&clash));

    assert!(
        matches!(result, Err(UserRepositoryError::DuplicateExternalId(id)) if id == ExternalId::new(2)),
        "expected duplicate, got {result:?}"
    );
    context.cleanup();
}

#[rstest]
fn touch_records_activity_and_reports_unknown_users(pg_context: PgContext) {
    let context = pg_context;
    context.clock.advance(TimeDelta::hours(3));
    let later = context.clock.utc();

    context
        .rt
        .block_on(context.users.touch(context.worker, later))
        .expect("touch");
    let unknown = UserId::new();
    let missing = context.rt.block_on(context.users.touch(unknown, later));

    let stored = context
        .rt
        .block_on(context.users.find_by_id(context.worker))
        .expect("lookup")
        .expect("worker present");
    assert_eq!(stored.last_activity(), later);
    assert!(
        matches!(missing, Err(UserRepositoryError::NotFound(id)) if id == unknown),
        "expected not found, got {missing:?}"
    );
    context.cleanup();
}

#[rstest]
fn active_listing_filters_by_role_in_registration_order(pg_context: PgContext) {
    let context = pg_context;
    context.clock.advance(TimeDelta::minutes(1));
    let second_worker = context
        .rt
        .block_on(register(&context.users, &context.clock, 3, "Bob", Role::Worker))
        .expect("registration");

    let workers = context
        .rt
        .block_on(context.users.list_active(Some(Role::Worker)))
        .expect("worker listing");
    let everyone = context
        .rt
        .block_on(context.users.list_active(None))
        .expect("full listing");

    assert_eq!(
        workers.iter().map(User::id).collect::<Vec<_>>(),
        vec![context.worker, second_worker]
    );
    assert_eq!(everyone.len(), 3);
    context.cleanup();
}
