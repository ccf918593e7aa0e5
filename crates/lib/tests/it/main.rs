/*! Integration tests for lexlist.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - rank: Rank arithmetic across the codec, midpoint and rebalance
 * - list: The ListManager against a real backend
 * - backend: BackendImpl implementations, transactions and persistence
 * - store: Accounts and role-scoped access through Store and Scope
 *
 * Set TEST_BACKEND to `sqlite` or `postgres` to run the backend-agnostic
 * tests against SQL storage (see `helpers::test_backend`).
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("lexlist=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod backend;
mod helpers;
mod list;
mod rank;
mod store;
