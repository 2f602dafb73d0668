// Unit of work: one repository set over a single session, with explicit
// transaction boundaries.

use crate::city::CityRepository;
use crate::lookup::{PersonRelationTypeRepository, PhoneNumberTypeRepository};
use crate::person::PersonRepository;
use crate::relation::PersonRelationRepository;
use crate::shared_kernel::Result;
use async_trait::async_trait;

/// Groups the aggregate repositories over one underlying session and layers
/// explicit transaction control on top. One instance is scoped to one
/// inbound operation.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn cities(&self) -> &dyn CityRepository;
    fn persons(&self) -> &dyn PersonRepository;
    fn person_relations(&self) -> &dyn PersonRelationRepository;
    fn person_relation_types(&self) -> &dyn PersonRelationTypeRepository;
    fn phone_number_types(&self) -> &dyn PhoneNumberTypeRepository;

    /// Opens a transaction. Idempotent: a second call while one is open is a
    /// no-op, guarding re-entry from nested command execution.
    async fn begin_transaction(&self) -> Result<()>;

    /// Commits the open transaction. On failure the transaction is rolled
    /// back before the error propagates; the handle is released either way.
    /// No-op when no transaction is open.
    async fn commit_transaction(&self) -> Result<()>;

    /// Rolls back and releases the open transaction; no-op otherwise.
    async fn rollback_transaction(&self) -> Result<()>;
}
