//! Integration tests for the ledger flows.
//!
//! Each test runs against a fresh in-memory SQLite database with a single
//! pooled connection, so transactional flows serialize deterministically.

use chrono::{Duration, Utc};

use agripos_core::ledger::EggGrading;
use agripos_core::{
    Account, AccountKind, CoreError, CreditStatus, PaymentMethod, PaymentType, Product,
    SaleStatus, TaxRate, ValidationError,
};
use agripos_db::repository::{account as account_repo, product as product_repo};
use agripos_db::{Database, DbConfig};
use agripos_ledger::{
    CartLine, CheckoutRequest, CollectionRequest, Ledger, LedgerError, PaymentRequest, Session,
};

// =============================================================================
// Fixtures
// =============================================================================

/// Store tax rate used across the tests: 8%.
const TAX_RATE_BPS: u32 = 800;

async fn test_ledger() -> Ledger {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    Ledger::new(db, TaxRate::from_bps(TAX_RATE_BPS))
}

async fn seed_session(db: &Database) -> Session {
    let staff = db
        .staff()
        .create("maria", "Maria Santos", "4821")
        .await
        .unwrap();
    Session::for_staff(staff.id, staff.name)
}

async fn seed_account(
    db: &Database,
    name: &str,
    kind: AccountKind,
    credit_limit_cents: i64,
) -> Account {
    let now = Utc::now();
    let account = Account {
        id: account_repo::generate_account_id(),
        name: name.to_string(),
        phone: None,
        kind,
        credit_limit_cents,
        credit_balance_cents: 0,
        payment_terms_days: 30,
        total_purchases_cents: 0,
        total_egg_sales_cents: 0,
        is_active: true,
        created_at: now,
        updated_at: now,
        sync_version: 0,
    };
    db.accounts().insert(&account).await.unwrap()
}

async fn seed_product(
    db: &Database,
    sku: &str,
    price_cents: i64,
    wholesale_price_cents: Option<i64>,
    current_stock: Option<i64>,
) -> Product {
    let now = Utc::now();
    let product = Product {
        id: product_repo::generate_product_id(),
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        description: None,
        unit: "piece".to_string(),
        price_cents,
        wholesale_price_cents,
        cost_cents: None,
        track_inventory: current_stock.is_some(),
        allow_negative_stock: false,
        current_stock,
        is_active: true,
        created_at: now,
        updated_at: now,
        sync_version: 0,
    };
    db.products().insert(&product).await.unwrap()
}

fn cart(product_id: &str, quantity: i64) -> Vec<CartLine> {
    vec![CartLine {
        product_id: product_id.to_string(),
        quantity,
    }]
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn walk_in_cash_sale() {
    let ledger = test_ledger().await;
    let session = seed_session(ledger.db()).await;
    // subtotal 2 × $25.00 = $50.00, tax 8% = $4.00 → total $54.00
    let product = seed_product(ledger.db(), "FEED-25KG", 2_500, None, Some(10)).await;

    let receipt = ledger
        .checkout()
        .checkout(
            &session,
            CheckoutRequest {
                customer_id: None,
                lines: cart(&product.id, 2),
                payment_method: PaymentMethod::Cash,
                discount_cents: 0,
                notes: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(receipt.sale.subtotal_cents, 5_000);
    assert_eq!(receipt.sale.tax_cents, 400);
    assert_eq!(receipt.sale.total_cents, 5_400);
    assert_eq!(receipt.sale.paid_cents, 5_400);
    assert_eq!(receipt.sale.balance_cents, 0);
    assert_eq!(receipt.sale.status, SaleStatus::Completed);
    assert!(receipt.sale.due_date.is_none());
    assert_eq!(receipt.items.len(), 1);

    // Stock decremented inside the same transaction
    let product = ledger
        .db()
        .products()
        .get_by_id(&product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.current_stock, Some(8));

    // Sale queued for sync
    assert_eq!(ledger.db().sync_outbox().count_pending().await.unwrap(), 1);
}

#[tokio::test]
async fn farmer_credit_sale_applies_balance_atomically() {
    let ledger = test_ledger().await;
    let session = seed_session(ledger.db()).await;
    let farmer = seed_account(ledger.db(), "Pedro Reyes", AccountKind::Farmer, 1_500_000).await;
    // Farmer buys at wholesale: 2 × $80.00 = $160.00, tax 8% = $12.80
    let product = seed_product(ledger.db(), "FEED-50KG", 10_000, Some(8_000), Some(20)).await;

    let receipt = ledger
        .checkout()
        .checkout(
            &session,
            CheckoutRequest {
                customer_id: Some(farmer.id.clone()),
                lines: cart(&product.id, 2),
                payment_method: PaymentMethod::Credit,
                discount_cents: 0,
                notes: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(receipt.sale.subtotal_cents, 16_000);
    assert_eq!(receipt.sale.total_cents, 17_280);
    assert_eq!(receipt.sale.paid_cents, 0);
    assert_eq!(receipt.sale.balance_cents, 17_280);
    assert_eq!(receipt.sale.status, SaleStatus::Pending);
    assert!(receipt.sale.due_date.is_some());

    let farmer = ledger
        .db()
        .accounts()
        .get_by_id(&farmer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(farmer.credit_balance_cents, 17_280);
    assert_eq!(farmer.total_purchases_cents, 17_280);
}

#[tokio::test]
async fn credit_sale_requires_account() {
    let ledger = test_ledger().await;
    let session = seed_session(ledger.db()).await;
    let product = seed_product(ledger.db(), "MED-1", 1_000, None, None).await;

    let err = ledger
        .checkout()
        .checkout(
            &session,
            CheckoutRequest {
                customer_id: None,
                lines: cart(&product.id, 1),
                payment_method: PaymentMethod::Credit,
                discount_cents: 0,
                notes: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LedgerError::Core(CoreError::Validation(ValidationError::Required { .. }))
    ));
}

#[tokio::test]
async fn insufficient_credit_rejected_without_partial_writes() {
    let ledger = test_ledger().await;
    let session = seed_session(ledger.db()).await;
    // Limit $100.00; sale totals $172.80
    let customer = seed_account(ledger.db(), "Ana Cruz", AccountKind::Regular, 10_000).await;
    let product = seed_product(ledger.db(), "EQUIP-1", 16_000, None, Some(5)).await;

    let before = ledger
        .db()
        .accounts()
        .get_by_id(&customer.id)
        .await
        .unwrap()
        .unwrap();

    let err = ledger
        .checkout()
        .checkout(
            &session,
            CheckoutRequest {
                customer_id: Some(customer.id.clone()),
                lines: cart(&product.id, 1),
                payment_method: PaymentMethod::Credit,
                discount_cents: 0,
                notes: None,
            },
        )
        .await
        .unwrap_err();

    match err {
        LedgerError::Core(CoreError::InsufficientCredit {
            limit_cents,
            requested_cents,
            ..
        }) => {
            assert_eq!(limit_cents, 10_000);
            assert_eq!(requested_cents, 17_280);
        }
        other => panic!("expected InsufficientCredit, got {other:?}"),
    }

    // Idempotence boundary: the account is byte-for-byte the pre-operation
    // state, no sale row or outbox entry survived the rollback.
    let after = ledger
        .db()
        .accounts()
        .get_by_id(&customer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.credit_balance_cents, before.credit_balance_cents);
    assert_eq!(after.total_purchases_cents, before.total_purchases_cents);
    assert_eq!(after.sync_version, before.sync_version);

    assert!(ledger
        .db()
        .sales()
        .list_for_account(&customer.id, 10)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(ledger.db().sync_outbox().count_pending().await.unwrap(), 0);

    let product = ledger
        .db()
        .products()
        .get_by_id(&product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.current_stock, Some(5));
}

#[tokio::test]
async fn combined_credit_sales_cannot_exceed_limit() {
    let ledger = test_ledger().await;
    let session = seed_session(ledger.db()).await;
    // Limit fits one $172.80 sale but not two.
    let customer = seed_account(ledger.db(), "Jose Lim", AccountKind::Regular, 20_000).await;
    let product = seed_product(ledger.db(), "FEED-50KG", 16_000, None, Some(50)).await;

    let request = CheckoutRequest {
        customer_id: Some(customer.id.clone()),
        lines: cart(&product.id, 1),
        payment_method: PaymentMethod::Credit,
        discount_cents: 0,
        notes: None,
    };

    // Concurrent checkouts against the same account: exactly one passes.
    let service = ledger.checkout();
    let (first, second) = tokio::join!(
        service.checkout(&session, request.clone()),
        service.checkout(&session, request.clone()),
    );

    assert_eq!(
        first.is_ok() as u8 + second.is_ok() as u8,
        1,
        "exactly one of two concurrent credit sales must pass the gate"
    );

    let customer = ledger
        .db()
        .accounts()
        .get_by_id(&customer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(customer.credit_balance_cents, 17_280);
}

#[tokio::test]
async fn stock_shortfall_rejects_whole_checkout() {
    let ledger = test_ledger().await;
    let session = seed_session(ledger.db()).await;
    let product = seed_product(ledger.db(), "VIT-B", 500, None, Some(3)).await;

    let err = ledger
        .checkout()
        .checkout(
            &session,
            CheckoutRequest {
                customer_id: None,
                lines: cart(&product.id, 5),
                payment_method: PaymentMethod::Cash,
                discount_cents: 0,
                notes: None,
            },
        )
        .await
        .unwrap_err();

    match err {
        LedgerError::Core(CoreError::InsufficientStock {
            sku,
            available,
            requested,
        }) => {
            assert_eq!(sku, "VIT-B");
            assert_eq!(available, 3);
            assert_eq!(requested, 5);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // The sale insert rolled back with the failed decrement.
    let product = ledger
        .db()
        .products()
        .get_by_id(&product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.current_stock, Some(3));
    assert_eq!(ledger.db().sync_outbox().count_pending().await.unwrap(), 0);
}

#[tokio::test]
async fn discount_applies_before_tax_identity_holds() {
    let ledger = test_ledger().await;
    let session = seed_session(ledger.db()).await;
    let product = seed_product(ledger.db(), "EQUIP-2", 10_000, None, None).await;

    let receipt = ledger
        .checkout()
        .checkout(
            &session,
            CheckoutRequest {
                customer_id: None,
                lines: cart(&product.id, 1),
                payment_method: PaymentMethod::Cash,
                discount_cents: 1_500,
                notes: None,
            },
        )
        .await
        .unwrap();

    // total = subtotal - discount + tax(subtotal)
    assert_eq!(receipt.sale.total_cents, 10_000 - 1_500 + 800);
    assert_eq!(
        receipt.sale.paid_cents + receipt.sale.balance_cents,
        receipt.sale.total_cents
    );
}

// =============================================================================
// Payments
// =============================================================================

#[tokio::test]
async fn customer_payment_reduces_balance_and_settles_sales() {
    let ledger = test_ledger().await;
    let session = seed_session(ledger.db()).await;
    let farmer = seed_account(ledger.db(), "Pedro Reyes", AccountKind::Farmer, 1_500_000).await;
    let product = seed_product(ledger.db(), "FEED-50KG", 10_000, Some(8_000), None).await;

    let receipt = ledger
        .checkout()
        .checkout(
            &session,
            CheckoutRequest {
                customer_id: Some(farmer.id.clone()),
                lines: cart(&product.id, 2),
                payment_method: PaymentMethod::Credit,
                discount_cents: 0,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(receipt.sale.total_cents, 17_280);

    // Over-payment is rejected with no mutation.
    let err = ledger
        .payments()
        .record_payment(
            &session,
            PaymentRequest {
                account_id: farmer.id.clone(),
                payment_type: PaymentType::CustomerPayment,
                method: PaymentMethod::Cash,
                amount_cents: 20_000,
                reference: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Core(CoreError::Validation(ValidationError::ExceedsBalance {
            amount_cents: 20_000,
            balance_cents: 17_280,
        }))
    ));
    assert!(ledger
        .db()
        .payments()
        .list_for_account(&farmer.id, 10)
        .await
        .unwrap()
        .is_empty());

    // Exact payment clears the balance and settles the pending sale.
    ledger
        .payments()
        .record_payment(
            &session,
            PaymentRequest {
                account_id: farmer.id.clone(),
                payment_type: PaymentType::CustomerPayment,
                method: PaymentMethod::Cash,
                amount_cents: 17_280,
                reference: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    let farmer_after = ledger
        .db()
        .accounts()
        .get_by_id(&farmer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(farmer_after.credit_balance_cents, 0);
    // Cumulative counter never decreases
    assert_eq!(farmer_after.total_purchases_cents, 17_280);

    let sale = ledger
        .db()
        .sales()
        .get_by_id(&receipt.sale.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sale.status, SaleStatus::Completed);

    let records = ledger
        .db()
        .payments()
        .list_for_account(&farmer.id, 10)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].amount_cents, 17_280);
}

#[tokio::test]
async fn zero_and_negative_amounts_rejected_for_every_type() {
    let ledger = test_ledger().await;
    let session = seed_session(ledger.db()).await;
    let farmer = seed_account(ledger.db(), "Pedro Reyes", AccountKind::Farmer, 0).await;

    for payment_type in [
        PaymentType::CustomerPayment,
        PaymentType::EggPayment,
        PaymentType::Debit,
    ] {
        for amount in [0, -500] {
            let err = ledger
                .payments()
                .record_payment(
                    &session,
                    PaymentRequest {
                        account_id: farmer.id.clone(),
                        payment_type,
                        method: PaymentMethod::Cash,
                        amount_cents: amount,
                        reference: None,
                        notes: None,
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                LedgerError::Core(CoreError::Validation(ValidationError::MustBePositive { .. }))
            ));
        }
    }
}

/// Pins the payment direction convention: CUSTOMER_PAYMENT decreases the
/// balance, EGG_PAYMENT and DEBIT both increase the farmer's running
/// payable. Changing this test means changing the books.
#[tokio::test]
async fn egg_payment_and_debit_increase_farmer_balance() {
    let ledger = test_ledger().await;
    let session = seed_session(ledger.db()).await;
    let farmer = seed_account(ledger.db(), "Pedro Reyes", AccountKind::Farmer, 0).await;

    ledger
        .payments()
        .record_payment(
            &session,
            PaymentRequest {
                account_id: farmer.id.clone(),
                payment_type: PaymentType::EggPayment,
                method: PaymentMethod::Cash,
                amount_cents: 500,
                reference: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    ledger
        .payments()
        .record_payment(
            &session,
            PaymentRequest {
                account_id: farmer.id.clone(),
                payment_type: PaymentType::Debit,
                method: PaymentMethod::Cash,
                amount_cents: 250,
                reference: Some("feed advance".to_string()),
                notes: None,
            },
        )
        .await
        .unwrap();

    let farmer = ledger
        .db()
        .accounts()
        .get_by_id(&farmer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(farmer.credit_balance_cents, 750);

    let records = ledger
        .db()
        .payments()
        .list_for_account(&farmer.id, 10)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
}

// =============================================================================
// Egg Collections
// =============================================================================

#[tokio::test]
async fn egg_collection_values_and_accrues_in_one_unit() {
    let ledger = test_ledger().await;
    let session = seed_session(ledger.db()).await;
    let farmer = seed_account(ledger.db(), "Pedro Reyes", AccountKind::Farmer, 0).await;
    let egg_product = seed_product(ledger.db(), "EGG-HEN", 30, None, Some(0)).await;
    let ledger = ledger.with_egg_product(egg_product.id.clone());

    let record = ledger
        .collections()
        .record_collection(
            &session,
            CollectionRequest {
                farmer_id: farmer.id.clone(),
                route_id: Some("north".to_string()),
                hen: EggGrading {
                    small: 24,
                    medium: 48,
                    large: 36,
                    xl: 12,
                    damaged: 4,
                },
                duck: EggGrading {
                    small: 12,
                    medium: 18,
                    large: 6,
                    xl: 0,
                    damaged: 0,
                },
                hen_price_cents: 250,
                duck_price_cents: 400,
                collected_at: None,
            },
        )
        .await
        .unwrap();

    // (120/12)*2.50 + (36/12)*4.00 = 37.00; damaged eggs excluded
    assert_eq!(record.total_value_cents, 3_700);
    assert_eq!(record.sellable_eggs(), 156);
    assert!(!record.paid);

    let farmer = ledger
        .db()
        .accounts()
        .get_by_id(&farmer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(farmer.credit_balance_cents, 3_700);
    assert_eq!(farmer.total_egg_sales_cents, 3_700);

    // Sellable eggs landed as stock, in whole eggs
    let egg_product = ledger
        .db()
        .products()
        .get_by_id(&egg_product.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(egg_product.current_stock, Some(156));

    let unpaid = ledger
        .db()
        .collections()
        .unpaid_value_for_farmer(&farmer.id)
        .await
        .unwrap();
    assert_eq!(unpaid, 3_700);
}

#[tokio::test]
async fn collection_rejected_for_non_farmer_account() {
    let ledger = test_ledger().await;
    let session = seed_session(ledger.db()).await;
    let customer = seed_account(ledger.db(), "Ana Cruz", AccountKind::Regular, 0).await;

    let err = ledger
        .collections()
        .record_collection(
            &session,
            CollectionRequest {
                farmer_id: customer.id.clone(),
                route_id: None,
                hen: EggGrading {
                    small: 12,
                    ..Default::default()
                },
                duck: EggGrading::default(),
                hen_price_cents: 250,
                duck_price_cents: 400,
                collected_at: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LedgerError::Core(CoreError::Validation(ValidationError::InvalidFormat { .. }))
    ));

    let customer = ledger
        .db()
        .accounts()
        .get_by_id(&customer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(customer.credit_balance_cents, 0);
    assert_eq!(customer.total_egg_sales_cents, 0);
}

// =============================================================================
// Statements & Credit Status
// =============================================================================

#[tokio::test]
async fn statement_derives_credit_status_from_aging() {
    let ledger = test_ledger().await;
    let session = seed_session(ledger.db()).await;
    let farmer = seed_account(ledger.db(), "Pedro Reyes", AccountKind::Farmer, 1_500_000).await;
    let product = seed_product(ledger.db(), "FEED-50KG", 10_000, Some(8_000), None).await;

    let receipt = ledger
        .checkout()
        .checkout(
            &session,
            CheckoutRequest {
                customer_id: Some(farmer.id.clone()),
                lines: cart(&product.id, 2),
                payment_method: PaymentMethod::Credit,
                discount_cents: 0,
                notes: None,
            },
        )
        .await
        .unwrap();

    // Fresh credit sale is current (due 30 days out).
    let statement = ledger.statements().statement(&farmer.id).await.unwrap();
    assert_eq!(statement.credit_status, CreditStatus::Current);
    assert_eq!(statement.sales.len(), 1);
    assert_eq!(statement.account.credit_balance_cents, 17_280);

    // Age the sale 45 days past due.
    let overdue = Utc::now() - Duration::days(45);
    sqlx::query("UPDATE sales SET due_date = ?1 WHERE id = ?2")
        .bind(overdue)
        .bind(&receipt.sale.id)
        .execute(ledger.db().pool())
        .await
        .unwrap();

    let status = ledger.statements().credit_status(&farmer.id).await.unwrap();
    assert_eq!(status, CreditStatus::Overdue60);

    // Settling the balance makes the account current again.
    ledger
        .payments()
        .record_payment(
            &session,
            PaymentRequest {
                account_id: farmer.id.clone(),
                payment_type: PaymentType::CustomerPayment,
                method: PaymentMethod::Cash,
                amount_cents: 17_280,
                reference: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    let status = ledger.statements().credit_status(&farmer.id).await.unwrap();
    assert_eq!(status, CreditStatus::Current);
}

#[tokio::test]
async fn statement_lists_payments_newest_first() {
    let ledger = test_ledger().await;
    let session = seed_session(ledger.db()).await;
    let farmer = seed_account(ledger.db(), "Pedro Reyes", AccountKind::Farmer, 0).await;

    for amount in [100, 200, 300] {
        ledger
            .payments()
            .record_payment(
                &session,
                PaymentRequest {
                    account_id: farmer.id.clone(),
                    payment_type: PaymentType::EggPayment,
                    method: PaymentMethod::Cash,
                    amount_cents: amount,
                    reference: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
    }

    let statement = ledger.statements().statement(&farmer.id).await.unwrap();
    assert_eq!(statement.payments.len(), 3);
    assert_eq!(statement.account.credit_balance_cents, 600);
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn login_credential_check() {
    let ledger = test_ledger().await;
    ledger
        .db()
        .staff()
        .create("maria", "Maria Santos", "4821")
        .await
        .unwrap();

    let session = Session::login(ledger.db(), "maria", "4821").await.unwrap();
    assert_eq!(session.staff_name, "Maria Santos");

    let err = Session::login(ledger.db(), "maria", "0000")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidCredentials));

    let err = Session::login(ledger.db(), "nobody", "4821")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidCredentials));
}
