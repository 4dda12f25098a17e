use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use angohost_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        cart::AddToCartRequest,
        orders::CheckoutRequest,
        payments::{CreateReferenceRequest, WebhookPayload},
    },
    entity::{
        domain_extensions::ActiveModel as ExtensionActive,
        invoices::Entity as Invoices,
        payment_references::{Column as RefCol, Entity as PaymentReferences},
        products::ActiveModel as ProductActive,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    gateway::{
        ChargeRequest, ChargeResponse, PaymentGateway,
        credentials::{CredentialCache, StaticTokenSource, SystemClock},
    },
    middleware::auth::AuthUser,
    registry::{NifRegistry, RegistryEntry},
    routes::admin::UpdateOrderStatusRequest,
    services::{
        admin_service, cart_service, invoice_service, order_service, payment_service,
        webhook_service,
    },
    state::AppState,
};
use async_trait::async_trait;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, Statement,
};
use uuid::Uuid;

struct RecordingGateway {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Gateway("gateway returned status 500".into()));
        }
        assert_eq!(request.mobile, "PAYMENT");
        assert_eq!(request.card, "DISABLED");
        Ok(ChargeResponse {
            id: "sess_test".into(),
        })
    }
}

struct AlwaysValidRegistry;

#[async_trait]
impl NifRegistry for AlwaysValidRegistry {
    async fn lookup(&self, _nif: &str) -> anyhow::Result<RegistryEntry> {
        Ok(RegistryEntry {
            valid: true,
            name: Some("CLIENTE TESTE".into()),
        })
    }
}

// Full storefront flow: cart -> checkout -> payment reference (mock
// gateway) -> webhook confirmation -> invoice document assembly, then
// the gateway-failure path against the same database. One test function
// so the truncate-and-seed setup never races a sibling test.
#[tokio::test]
async fn checkout_reference_webhook_and_document_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let user_id = create_user(&state, "user", "cliente@example.ao").await?;
    let admin_id = create_user(&state, "admin", "admin@angohost.ao").await?;

    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set("Hosting Start".into()),
        description: Set(Some("2 GB SSD".into())),
        price: Set(25_000),
        category: Set("hosting".into()),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    ExtensionActive {
        id: Set(Uuid::new_v4()),
        name: Set(".ao".into()),
        base_price: Set(25_000),
        renewal_price: Set(23_000),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let auth_user = AuthUser {
        user_id,
        role: "user".into(),
    };
    let auth_admin = AuthUser {
        user_id: admin_id,
        role: "admin".into(),
    };

    // One hosting plan and one 3-year domain registration.
    cart_service::add_to_cart(
        &state,
        &auth_user,
        AddToCartRequest {
            product_id: Some(product.id),
            quantity: Some(1),
            domain_name: None,
            extension: None,
            years: None,
        },
    )
    .await?;
    cart_service::add_to_cart(
        &state,
        &auth_user,
        AddToCartRequest {
            product_id: None,
            quantity: None,
            domain_name: Some("example".into()),
            extension: Some(".ao".into()),
            years: Some(3),
        },
    )
    .await?;

    let checkout = order_service::checkout(&state, &auth_user, CheckoutRequest::default())
        .await?
        .data
        .unwrap();
    // 25000 + (25000 * 3 * 0.9) = 25000 + 67500
    assert_eq!(checkout.order.total_amount, 92_500);
    assert_eq!(checkout.items.len(), 2);
    assert_eq!(checkout.invoice.status, "draft");

    // Checkout cleared the cart; an immediate second checkout has nothing to buy.
    let empty = order_service::checkout(&state, &auth_user, CheckoutRequest::default()).await;
    assert!(matches!(empty, Err(AppError::Validation(_))));

    // Issue the payment reference against the invoice.
    let created = payment_service::create_reference(
        &state,
        &auth_user,
        CreateReferenceRequest {
            order_id: None,
            invoice_id: Some(checkout.invoice.id),
            amount: checkout.order.total_amount,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(created.reference.len(), 10);
    assert_eq!(created.token.as_deref(), Some("sess_test"));
    assert!(created.expires_at.is_some());

    let invoice = Invoices::find_by_id(checkout.invoice.id)
        .one(&state.orm)
        .await?
        .unwrap();
    assert_eq!(invoice.status, "issued");
    assert_eq!(
        invoice.payment_reference.as_deref(),
        Some(created.reference.as_str())
    );

    // Gateway confirms out-of-band.
    let settled = webhook_service::handle_callback(
        &state,
        WebhookPayload {
            reference: created.reference.clone(),
            status: "confirmed".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(settled.reference.status, "confirmed");

    let order = order_service::get_order(&state, &auth_user, checkout.order.id)
        .await?
        .data
        .unwrap()
        .order;
    assert_eq!(order.status, "paid");

    let invoice = invoice_service::get_invoice(&state, &auth_user, checkout.invoice.id)
        .await?
        .data
        .unwrap();
    assert_eq!(invoice.status, "paid");

    // Replay is idempotent: state is reported, not re-applied.
    let replay = webhook_service::handle_callback(
        &state,
        WebhookPayload {
            reference: created.reference.clone(),
            status: "failed".into(),
        },
    )
    .await?;
    assert_eq!(replay.message, "Already processed");
    assert_eq!(replay.data.unwrap().reference.status, "confirmed");

    // Document assembly with the reference required.
    let document =
        invoice_service::assemble_document(&state, &auth_user, checkout.invoice.id, true)
            .await?
            .data
            .unwrap();
    assert_eq!(document.lines.len(), 2);
    assert_eq!(document.grand_total, 92_500);
    assert_eq!(document.grand_total_display, "KZ 92.500,00");
    assert_eq!(
        document.payment_reference.as_deref(),
        Some(created.reference.as_str())
    );
    assert_eq!(document.customer.nif.as_deref(), Some("5000088927"));

    // Terminal statuses freeze the order for the back office.
    admin_service::update_order_status(
        &state,
        &auth_admin,
        checkout.order.id,
        UpdateOrderStatusRequest {
            status: "completed".into(),
        },
    )
    .await?;
    let frozen = admin_service::update_order_status(
        &state,
        &auth_admin,
        checkout.order.id,
        UpdateOrderStatusRequest {
            status: "processing".into(),
        },
    )
    .await;
    assert!(matches!(frozen, Err(AppError::Validation(_))));

    // Gateway-failure path: same database, gateway that rejects charges.
    let failing = AppState {
        gateway: Arc::new(RecordingGateway {
            calls: AtomicUsize::new(0),
            fail: true,
        }),
        ..state.clone()
    };

    cart_service::add_to_cart(
        &failing,
        &auth_user,
        AddToCartRequest {
            product_id: Some(product.id),
            quantity: Some(1),
            domain_name: None,
            extension: None,
            years: None,
        },
    )
    .await?;
    let second = order_service::checkout(&failing, &auth_user, CheckoutRequest::default())
        .await?
        .data
        .unwrap();

    let result = payment_service::create_reference(
        &failing,
        &auth_user,
        CreateReferenceRequest {
            order_id: Some(second.order.id),
            invoice_id: None,
            amount: second.order.total_amount,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Gateway(_))));

    let rows = PaymentReferences::find()
        .filter(RefCol::OrderId.eq(second.order.id))
        .all(&failing.orm)
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, "failed");

    // Bad targets are rejected before anything is written.
    let invalid = payment_service::create_reference(
        &failing,
        &auth_user,
        CreateReferenceRequest {
            order_id: Some(second.order.id),
            invoice_id: Some(Uuid::new_v4()),
            amount: 100,
        },
    )
    .await;
    assert!(matches!(invalid, Err(AppError::Validation(_))));

    let invalid_amount = payment_service::create_reference(
        &failing,
        &auth_user,
        CreateReferenceRequest {
            order_id: Some(second.order.id),
            invoice_id: None,
            amount: 0,
        },
    )
    .await;
    assert!(matches!(invalid_amount, Err(AppError::Validation(_))));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE payment_references, invoices, order_items, orders, cart_items, audit_logs, domain_extensions, products, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        gateway: Arc::new(RecordingGateway {
            calls: AtomicUsize::new(0),
            fail: false,
        }),
        registry: Arc::new(AlwaysValidRegistry),
        credentials: Arc::new(CredentialCache::new(
            Box::new(StaticTokenSource::new("test-token".into())),
            Box::new(SystemClock),
            chrono::Duration::seconds(60),
        )),
        callback_url: "http://localhost:3000/api/webhooks/appypay".into(),
    })
}

async fn create_user(state: &AppState, role: &str, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        name: Set(Some("Cliente Teste".into())),
        nif: Set(Some("5000088927".into())),
        role: Set(role.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}
