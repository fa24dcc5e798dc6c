//! Wiring - Builds the production object graph from `AppConfig`.
//!
//! Every handler shares one PostgreSQL pool. The idempotency store is Redis
//! when configured and the in-process store otherwise.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::adapters::memory::InMemoryIdempotencyStore;
use crate::adapters::postgres::{
    PostgresLicenseReader, PostgresMediaRepository, PostgresMembershipChecker,
    PostgresTransactionManager,
};
use crate::adapters::redis::RedisIdempotencyStore;
use crate::adapters::storage::HmacUrlSigner;
use crate::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use crate::application::{
    CreateLicenseHandler, DeleteLicenseHandler, ExpiryScheduler, HandlePaymentWebhookHandler,
    IdempotencyGuard, KycReconciler, ListLicensesHandler, PaymentEventReconciler,
    VerifyLicenseHandler,
};
use crate::config::AppConfig;
use crate::domain::billing::StripeWebhookVerifier;
use crate::domain::foundation::DomainError;
use crate::domain::store::LicensePolicy;
use crate::ports::{
    DocumentUrlSigner, IdempotencyStore, KycReconciliation, LicenseReader, MediaRepository,
    MembershipChecker, PaymentProvider, TransactionManager,
};

/// Startup failures.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis connection failed: {0}")]
    Redis(DomainError),

    #[error("Redis connection timed out")]
    RedisTimeout,
}

/// Every entry point of the crate, ready to be mounted by a host process.
pub struct ComplianceServices {
    pub create_license: CreateLicenseHandler,
    pub verify_license: VerifyLicenseHandler,
    pub delete_license: DeleteLicenseHandler,
    pub list_licenses: ListLicensesHandler,
    pub payment_webhook: HandlePaymentWebhookHandler,
    /// `None` when the scheduler is disabled for this process.
    pub scheduler: Option<ExpiryScheduler>,
}

impl ComplianceServices {
    /// Connects to PostgreSQL and Redis and wires all handlers.
    pub async fn connect(config: &AppConfig) -> Result<Self, BootstrapError> {
        let pool = config.database.connect().await?;
        info!(
            max_connections = config.database.max_connections,
            "Connected to PostgreSQL"
        );

        if config.database.run_migrations {
            sqlx::migrate!().run(&pool).await?;
            info!("Database migrations applied");
        }

        let idempotency = idempotency_store(config).await?;

        let transactions: Arc<dyn TransactionManager> =
            Arc::new(PostgresTransactionManager::new(pool.clone()));
        let reader: Arc<dyn LicenseReader> = Arc::new(PostgresLicenseReader::new(pool.clone()));
        let media: Arc<dyn MediaRepository> = Arc::new(PostgresMediaRepository::new(pool.clone()));
        let memberships: Arc<dyn MembershipChecker> =
            Arc::new(PostgresMembershipChecker::new(pool));

        let stripe = StripeConfig::new(config.payment.stripe_api_key.clone())
            .with_base_url(config.payment.stripe_api_base.clone())
            .with_timeout(config.payment.timeout());
        let provider: Arc<dyn PaymentProvider> = Arc::new(StripePaymentAdapter::new(stripe));

        let signer: Arc<dyn DocumentUrlSigner> = Arc::new(HmacUrlSigner::new(
            config.storage.base_url.clone(),
            config.storage.signing_key.clone(),
        ));

        Ok(Self::wire(
            config,
            Ports {
                transactions,
                reader,
                media,
                memberships,
                provider,
                signer,
                idempotency,
            },
        ))
    }

    fn wire(config: &AppConfig, ports: Ports) -> Self {
        let policy = LicensePolicy::default();
        let kyc: Arc<dyn KycReconciliation> = Arc::new(KycReconciler::new());

        let guard = IdempotencyGuard::new(ports.idempotency, config.idempotency.ttl());
        let verifier = StripeWebhookVerifier::new(config.payment.stripe_webhook_secret.clone());
        let reconciler = PaymentEventReconciler::new(ports.transactions.clone(), ports.provider);

        let scheduler = config.scheduler.enabled.then(|| {
            ExpiryScheduler::new(
                ports.reader.clone(),
                ports.transactions.clone(),
                kyc.clone(),
                config.scheduler.scheduler_config(),
            )
        });

        Self {
            create_license: CreateLicenseHandler::new(
                ports.transactions.clone(),
                ports.memberships.clone(),
                ports.media.clone(),
                policy.clone(),
            ),
            verify_license: VerifyLicenseHandler::new(ports.transactions.clone(), kyc),
            delete_license: DeleteLicenseHandler::new(
                ports.transactions,
                ports.memberships,
                policy,
            ),
            list_licenses: ListLicensesHandler::new(ports.reader, ports.media, ports.signer)
                .with_url_ttl(config.storage.url_ttl()),
            payment_webhook: HandlePaymentWebhookHandler::new(verifier, guard, reconciler)
                .with_scope(config.idempotency.scope.clone()),
            scheduler,
        }
    }
}

struct Ports {
    transactions: Arc<dyn TransactionManager>,
    reader: Arc<dyn LicenseReader>,
    media: Arc<dyn MediaRepository>,
    memberships: Arc<dyn MembershipChecker>,
    provider: Arc<dyn PaymentProvider>,
    signer: Arc<dyn DocumentUrlSigner>,
    idempotency: Arc<dyn IdempotencyStore>,
}

async fn idempotency_store(config: &AppConfig) -> Result<Arc<dyn IdempotencyStore>, BootstrapError> {
    if !config.redis.is_configured() {
        warn!("No Redis URL configured; webhook dedupe is local to this process");
        return Ok(Arc::new(InMemoryIdempotencyStore::new()));
    }

    let store = tokio::time::timeout(
        config.redis.timeout(),
        RedisIdempotencyStore::connect(&config.redis.url),
    )
    .await
    .map_err(|_| BootstrapError::RedisTimeout)?
    .map_err(BootstrapError::Redis)?;

    info!("Connected to Redis");
    Ok(Arc::new(store))
}
