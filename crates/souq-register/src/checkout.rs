//! # Sale Commit Workflow
//!
//! Turns a cart into a durable, priced, inventory-adjusted sale.
//!
//! ## The Saga
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. validate            ← refuses before any side effect               │
//! │  2. draw sale number    ← store sequence, duplicate is fatal           │
//! │  3. compute totals      ← from the supplied TaxRate, never hard-coded  │
//! │  4. insert sale header  ─┐                                             │
//! │  5. insert sale lines    │ ordered steps, no compensation              │
//! │  6. per line: decrement  │   one transaction per line;                │
//! │     + applied marker    ─┘   clamp → flag the sale, warn              │
//! │  7. mark sale applied, clear cart, publish invalidations,              │
//! │     format receipt, hand to printer (fire-and-forget)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failure in steps 2-6 surfaces a typed [`CheckoutError`], leaves the
//! cart intact, and rolls nothing back. The durable markers written along
//! the way (`stock_applied` per line and per sale) are what the
//! [reconciler](crate::reconcile) reads to finish a commit that died
//! half-way.
//!
//! Every store call runs under a bounded timeout, so a wedged database
//! surfaces as a retryable [`CheckoutError::Timeout`] instead of a hung
//! register.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use souq_core::{
    format_receipt, validation, Cart, CoreError, PaymentMethod, Sale, SaleLine, TaxRate,
};
use souq_db::{Database, DbError};

use crate::error::{CheckoutError, CheckoutResult, CommitStep};
use crate::events::{Invalidation, InvalidationBus};
use crate::printer::ReceiptPrinter;

/// Default per-step time budget for store calls.
const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// Request / Response
// =============================================================================

/// Everything the commit needs beyond the cart itself.
///
/// The tax rate is threaded in explicitly (loaded from settings by the
/// caller); the workflow never reaches for a global.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    pub tax_rate: TaxRate,
    pub discount_cents: i64,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
}

impl CheckoutRequest {
    /// A cash sale at the given rate with no discount or customer details.
    pub fn cash(tax_rate: TaxRate) -> Self {
        CheckoutRequest {
            payment_method: PaymentMethod::Cash,
            tax_rate,
            discount_cents: 0,
            customer_name: None,
            customer_phone: None,
            notes: None,
        }
    }
}

/// The outcome of a successful commit.
#[derive(Debug, Clone)]
pub struct CommittedSale {
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
    /// The receipt text that was handed to the printer.
    pub receipt: String,
}

// =============================================================================
// Checkout
// =============================================================================

/// The commit workflow.
///
/// Holds the database handle, the printer port, and the invalidation bus;
/// one instance serves the whole register.
pub struct Checkout {
    db: Database,
    printer: Arc<dyn ReceiptPrinter>,
    events: InvalidationBus,
    step_timeout: Duration,
}

impl Checkout {
    /// Creates a checkout workflow.
    pub fn new(db: Database, printer: Arc<dyn ReceiptPrinter>, events: InvalidationBus) -> Self {
        Checkout {
            db,
            printer,
            events,
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    /// Overrides the per-step time budget.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// Commits the cart as a sale.
    ///
    /// On success the cart is cleared and the receipt has been handed to
    /// the printer. On failure the cart is untouched and the error names
    /// the step that failed.
    pub async fn commit(
        &self,
        cart: &mut Cart,
        request: CheckoutRequest,
    ) -> CheckoutResult<CommittedSale> {
        // ---- 1. validate, before any side effect --------------------------
        self.validate(cart, &request)?;

        let subtotal_cents = cart.subtotal_cents();
        let tax_cents = cart.tax_cents(request.tax_rate);
        let total_cents = cart.total_cents(request.tax_rate, request.discount_cents);

        // ---- 2. sale number -----------------------------------------------
        let sale_number = self
            .store_call(CommitStep::DrawSaleNumber, self.db.sales().next_sale_number())
            .await
            .map_err(|e| match e {
                CheckoutError::Timeout { .. } => e,
                other => CheckoutError::SaleNumber(other.to_string()),
            })?;

        debug!(sale_number = %sale_number, total_cents, "Committing sale");

        // ---- 3.-4. sale header --------------------------------------------
        let now = Utc::now();
        let mut sale = Sale {
            id: Uuid::new_v4().to_string(),
            sale_number,
            subtotal_cents,
            tax_cents,
            discount_cents: request.discount_cents,
            total_cents,
            payment_method: request.payment_method,
            sale_date: now,
            customer_name: request.customer_name,
            customer_phone: request.customer_phone,
            notes: request.notes,
            stock_applied: false,
            stock_flagged: false,
            created_at: now,
        };

        let sales = self.db.sales();
        match self
            .store_call(CommitStep::InsertSale, sales.insert_sale(&sale))
            .await
        {
            Ok(()) => {}
            // A duplicate number means the sequence raced something; the
            // next attempt draws a fresh one.
            Err(CheckoutError::Persistence { source, .. }) if source.is_unique_violation() => {
                return Err(CheckoutError::SaleNumber(source.to_string()));
            }
            Err(e) => return Err(e),
        }

        // ---- 5. lines from cart snapshots, no catalog re-read -------------
        let mut lines = Vec::with_capacity(cart.line_count());
        for cart_line in cart.lines() {
            let line = SaleLine {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_id: cart_line.product_id.clone(),
                name_snapshot: cart_line.name.clone(),
                unit_price_cents: cart_line.unit_price_cents,
                quantity: cart_line.quantity,
                line_total_cents: cart_line.line_total_cents(),
                stock_applied: false,
                created_at: now,
            };
            self.store_call(CommitStep::InsertLines, sales.insert_line(&line))
                .await?;
            lines.push(line);
        }

        // ---- 6. stock decrements, clamped at zero --------------------------
        // Decrement and line marker land in one transaction, so a crash
        // here leaves either a fully unapplied line (the reconciler
        // replays it) or a fully applied one, never a decrement the
        // reconciler would repeat.
        let mut clamped_any = false;
        for line in &mut lines {
            let adjustment = self
                .store_call(
                    CommitStep::ApplyStock,
                    sales.apply_line_stock(&line.id, &line.product_id, line.quantity),
                )
                .await?;

            if adjustment.clamped {
                warn!(
                    sale_number = %sale.sale_number,
                    product = %line.name_snapshot,
                    requested = line.quantity,
                    prior = adjustment.prior,
                    "Sold past recorded stock; inventory count flagged"
                );
                clamped_any = true;
            }

            line.stock_applied = true;
        }

        if clamped_any {
            self.store_call(
                CommitStep::ApplyStock,
                sales.flag_stock_discrepancy(&sale.id),
            )
            .await?;
            sale.stock_flagged = true;
        }

        self.store_call(
            CommitStep::ApplyStock,
            sales.mark_sale_stock_applied(&sale.id),
        )
        .await?;
        sale.stock_applied = true;

        // ---- 7. the sale is durable; nothing past here can fail it --------
        cart.clear();
        self.events.publish(Invalidation::Sales);
        self.events.publish(Invalidation::Products);

        // Config is read per commit; a settings hiccup costs receipt
        // cosmetics, not the sale.
        let config = match self
            .store_call(CommitStep::LoadConfig, self.db.settings().store_config())
            .await
        {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Store config unavailable, printing with defaults");
                Default::default()
            }
        };

        let receipt = format_receipt(&sale, &lines, &config);
        self.printer.print(&sale.sale_number, &receipt);

        info!(
            sale_number = %sale.sale_number,
            total_cents = sale.total_cents,
            lines = lines.len(),
            flagged = sale.stock_flagged,
            "Sale committed"
        );

        Ok(CommittedSale {
            sale,
            lines,
            receipt,
        })
    }

    /// Step 1: refuse bad input before any side effect.
    fn validate(&self, cart: &Cart, request: &CheckoutRequest) -> Result<(), CoreError> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        for line in cart.lines() {
            validation::validate_quantity(line.quantity)?;
        }
        validation::validate_discount_cents(request.discount_cents)?;
        validation::validate_tax_rate_bps(request.tax_rate.bps())?;

        let total_cents = cart.total_cents(request.tax_rate, request.discount_cents);
        if total_cents < 0 {
            return Err(CoreError::NegativeTotal { total_cents });
        }

        Ok(())
    }

    /// Wraps one store call in the per-step time budget.
    async fn store_call<T, F>(&self, step: CommitStep, fut: F) -> CheckoutResult<T>
    where
        F: Future<Output = Result<T, DbError>>,
    {
        match tokio::time::timeout(self.step_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(CheckoutError::Persistence { step, source }),
            Err(_) => Err(CheckoutError::Timeout { step }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::testing::RecordingPrinter;
    use souq_core::Product;
    use souq_db::DbConfig;
    use tokio::sync::broadcast::error::TryRecvError;

    struct Harness {
        db: Database,
        checkout: Checkout,
        printer: Arc<RecordingPrinter>,
        events: InvalidationBus,
    }

    async fn harness() -> Harness {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let printer = Arc::new(RecordingPrinter::default());
        let events = InvalidationBus::default();
        let checkout = Checkout::new(db.clone(), printer.clone(), events.clone());
        Harness {
            db,
            checkout,
            printer,
            events,
        }
    }

    async fn insert_product(db: &Database, name: &str, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            barcode: None,
            category_id: None,
            price_cents,
            cost_cents: price_cents / 2,
            stock_quantity: stock,
            min_stock_level: 1,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    #[tokio::test]
    async fn test_commit_happy_path() {
        let h = harness().await;
        let a = insert_product(&h.db, "Galaxy S24", 10_000, 10).await;
        let b = insert_product(&h.db, "USB-C Cable", 5_000, 5).await;

        let mut cart = Cart::new();
        cart.add_line(&a, 2).unwrap();
        cart.add_line(&b, 1).unwrap();

        let mut rx = h.events.subscribe();
        let committed = h
            .checkout
            .commit(&mut cart, CheckoutRequest::cash(TaxRate::from_bps(1500)))
            .await
            .unwrap();

        // totals: 250.00 subtotal, 37.50 tax, 287.50 total
        assert_eq!(committed.sale.sale_number, "INV-000001");
        assert_eq!(committed.sale.subtotal_cents, 25_000);
        assert_eq!(committed.sale.tax_cents, 3_750);
        assert_eq!(committed.sale.total_cents, 28_750);
        assert!(committed.sale.stock_applied);
        assert!(!committed.sale.stock_flagged);
        assert_eq!(committed.lines.len(), 2);
        assert!(committed.lines.iter().all(|l| l.stock_applied));

        // cart cleared on success
        assert!(cart.is_empty());

        // stock decremented
        let a_after = h.db.products().get_by_id(&a.id).await.unwrap().unwrap();
        let b_after = h.db.products().get_by_id(&b.id).await.unwrap().unwrap();
        assert_eq!(a_after.stock_quantity, 8);
        assert_eq!(b_after.stock_quantity, 4);

        // receipt went to the printer
        let printed = h.printer.printed();
        assert_eq!(printed.len(), 1);
        assert_eq!(printed[0].0, "INV-000001");
        assert!(printed[0].1.contains("287.50"));
        assert!(committed.receipt.contains("Galaxy S24"));

        // both invalidations published
        assert_eq!(rx.try_recv().unwrap(), Invalidation::Sales);
        assert_eq!(rx.try_recv().unwrap(), Invalidation::Products);
        assert_eq!(rx.try_recv().unwrap_err(), TryRecvError::Empty);

        // durable: reload from the store
        let loaded = h
            .db
            .sales()
            .get_by_id(&committed.sale.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.total_cents, 28_750);
    }

    #[tokio::test]
    async fn test_empty_cart_is_refused() {
        let h = harness().await;
        let mut cart = Cart::new();

        let err = h
            .checkout
            .commit(&mut cart, CheckoutRequest::cash(TaxRate::from_bps(1500)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Validation(CoreError::EmptyCart)
        ));
        assert!(!err.is_retryable());

        // nothing written
        assert!(h.db.sales().list_recent(10).await.unwrap().is_empty());
        assert!(h.printer.printed().is_empty());
    }

    #[tokio::test]
    async fn test_negative_total_is_refused_and_cart_kept() {
        let h = harness().await;
        let a = insert_product(&h.db, "Case", 1_000, 10).await;

        let mut cart = Cart::new();
        cart.add_line(&a, 1).unwrap();

        let mut request = CheckoutRequest::cash(TaxRate::from_bps(1500));
        request.discount_cents = 5_000; // exceeds the taxed subtotal

        let err = h.checkout.commit(&mut cart, request).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(CoreError::NegativeTotal { .. })
        ));

        // cart untouched, stock untouched, nothing written
        assert_eq!(cart.line_count(), 1);
        let a_after = h.db.products().get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(a_after.stock_quantity, 10);
        assert!(h.db.sales().list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clamped_stock_flags_sale_but_commits() {
        let h = harness().await;
        let a = insert_product(&h.db, "Last Unit", 10_000, 1).await;

        let mut cart = Cart::new();
        cart.add_line(&a, 3).unwrap(); // cart only checks stock > 0

        let committed = h
            .checkout
            .commit(&mut cart, CheckoutRequest::cash(TaxRate::zero()))
            .await
            .unwrap();

        // the sale stands at full price for 3 units
        assert_eq!(committed.sale.total_cents, 30_000);
        assert!(committed.sale.stock_flagged);
        assert!(committed.sale.stock_applied);

        // stock stopped at zero
        let a_after = h.db.products().get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(a_after.stock_quantity, 0);

        let loaded = h
            .db
            .sales()
            .get_by_id(&committed.sale.id)
            .await
            .unwrap()
            .unwrap();
        assert!(loaded.stock_flagged);
    }

    #[tokio::test]
    async fn test_sale_numbers_are_sequential_across_commits() {
        let h = harness().await;
        let a = insert_product(&h.db, "Charger", 2_000, 50).await;

        for expected in ["INV-000001", "INV-000002", "INV-000003"] {
            let mut cart = Cart::new();
            cart.add_line(&a, 1).unwrap();
            let committed = h
                .checkout
                .commit(&mut cart, CheckoutRequest::cash(TaxRate::from_bps(1500)))
                .await
                .unwrap();
            assert_eq!(committed.sale.sale_number, expected);
        }
    }

    #[tokio::test]
    async fn test_duplicate_sale_number_is_retryable() {
        let h = harness().await;
        let a = insert_product(&h.db, "Power Bank", 8_000, 10).await;

        // Occupy the number the sequence will draw next, as if another
        // register had raced this one.
        let now = Utc::now();
        let squatter = Sale {
            id: Uuid::new_v4().to_string(),
            sale_number: "INV-000001".to_string(),
            subtotal_cents: 0,
            tax_cents: 0,
            discount_cents: 0,
            total_cents: 0,
            payment_method: PaymentMethod::Cash,
            sale_date: now,
            customer_name: None,
            customer_phone: None,
            notes: None,
            stock_applied: true,
            stock_flagged: false,
            created_at: now,
        };
        h.db.sales().insert_sale(&squatter).await.unwrap();

        let mut cart = Cart::new();
        cart.add_line(&a, 1).unwrap();

        let err = h
            .checkout
            .commit(&mut cart, CheckoutRequest::cash(TaxRate::from_bps(1500)))
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::SaleNumber(_)));
        assert!(err.is_retryable());

        // cart kept, stock untouched; the retry draws a fresh number
        assert_eq!(cart.line_count(), 1);
        let a_after = h.db.products().get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(a_after.stock_quantity, 10);

        let retried = h
            .checkout
            .commit(&mut cart, CheckoutRequest::cash(TaxRate::from_bps(1500)))
            .await
            .unwrap();
        assert_eq!(retried.sale.sale_number, "INV-000002");
    }

    #[tokio::test]
    async fn test_wedged_store_call_times_out() {
        let h = harness().await;
        let checkout = h.checkout.with_step_timeout(Duration::from_millis(10));

        let err = checkout
            .store_call(
                CommitStep::DrawSaleNumber,
                std::future::pending::<Result<(), DbError>>(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Timeout {
                step: CommitStep::DrawSaleNumber
            }
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_customer_details_reach_the_receipt() {
        let h = harness().await;
        let a = insert_product(&h.db, "Screen Protector", 3_000, 10).await;

        let mut cart = Cart::new();
        cart.add_line(&a, 1).unwrap();

        let mut request = CheckoutRequest::cash(TaxRate::from_bps(1500));
        request.customer_name = Some("Ahmed".to_string());
        request.customer_phone = Some("0555555555".to_string());

        let committed = h.checkout.commit(&mut cart, request).await.unwrap();
        assert!(committed.receipt.contains("Customer: Ahmed"));
        assert_eq!(committed.sale.customer_name.as_deref(), Some("Ahmed"));
    }
}
