// The command pipeline: validation and transaction behaviors composed
// around every handler invocation.
//
// Validation always precedes transaction-opening, so invalid input never
// touches the database. The transactional wrapper commits after the handler
// succeeds and rolls back on any error, returning the original error
// untouched.

use crate::validation::ValidateRequest;
use person_registry_domain::unit_of_work::UnitOfWork;
use person_registry_domain::Result;
use std::future::Future;
use tracing::error;

/// Runs a non-transactional request: validation, then the handler.
pub async fn execute<T, F, Fut>(request: &dyn ValidateRequest, handler: F) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    request.validate()?;
    handler().await
}

/// Runs a transactional command: validation, then the handler inside a
/// transaction scope on the given unit of work.
pub async fn execute_in_tx<T, F, Fut>(
    uow: &dyn UnitOfWork,
    request: &dyn ValidateRequest,
    handler: F,
) -> Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    request.validate()?;

    uow.begin_transaction().await?;
    match handler().await {
        Ok(value) => {
            uow.commit_transaction().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback_transaction().await {
                error!("rollback failed after command error: {rollback_err}");
            }
            Err(err)
        }
    }
}
