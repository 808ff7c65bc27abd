use futures::future::join_all;
use thiserror::Error;

use crate::domain::checkout::{CheckoutField, CheckoutReceipt, CheckoutTotals};
use crate::domain::coupon::{AppliedCoupon, Coupon};
use crate::domain::order::{NewOrder, NewOrderLine};
use crate::domain::shipping::ShippingOption;
use crate::domain::user::AuthenticatedUser;
use crate::forms::checkout::{PersonalDataForm, ShippingAddressForm};
use crate::repository::OrderWriter;
use crate::services::cart::CartLedger;
use crate::services::coupons::{self, CouponError};

pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Errors raised while collecting checkout input or submitting an order.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CheckoutError {
    #[error("the cart is empty")]
    EmptyCart,
    #[error("sign in to complete the purchase")]
    AuthenticationRequired,
    #[error("checkout is incomplete: {}", field_list(.fields))]
    ValidationIncomplete { fields: Vec<CheckoutField> },
    /// The order header was not created. Nothing was written remotely.
    #[error("order could not be created: {reason}")]
    OrderCreationFailed { reason: String },
    /// The header exists remotely but some lines were not stored.
    #[error("order {order_id} is incomplete: {failed} of {total} items failed")]
    PartialOrderFailure {
        order_id: String,
        failed: usize,
        total: usize,
    },
    #[error("an order is already being submitted")]
    SubmissionInProgress,
    /// The submission stopped before an outcome was known; the order may
    /// or may not exist remotely.
    #[error("order submission was interrupted")]
    SubmissionInterrupted,
    #[error("checkout cannot do that in its current state")]
    InvalidState,
    #[error(transparent)]
    Coupon(#[from] CouponError),
}

impl CheckoutError {
    /// Whether submitting the same draft again is allowed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CheckoutError::OrderCreationFailed { .. })
    }
}

fn field_list(fields: &[CheckoutField]) -> String {
    fields
        .iter()
        .map(CheckoutField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Input gathered while the buyer fills in the checkout screens.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutDraft {
    pub user: AuthenticatedUser,
    pub personal: PersonalDataForm,
    pub address: ShippingAddressForm,
    pub shipping: Option<ShippingOption>,
    /// Applied coupon; its discount follows the live subtotal.
    pub coupon: Option<Coupon>,
}

impl CheckoutDraft {
    /// Fresh draft with personal data prefilled from `user`.
    pub fn for_user(user: &AuthenticatedUser) -> Self {
        Self {
            user: user.clone(),
            personal: PersonalDataForm::from(user),
            address: ShippingAddressForm::default(),
            shipping: None,
            coupon: None,
        }
    }

    /// Fields that still block submission, in display order.
    pub fn missing_fields(&self) -> Vec<CheckoutField> {
        let mut fields = self.personal.invalid_fields();

        match &self.shipping {
            None => fields.push(CheckoutField::ShippingOption),
            Some(option) if option.requires_address() => {
                if self.address.clone().into_address().is_err() {
                    fields.push(CheckoutField::ShippingAddress);
                }
            }
            Some(_) => {}
        }

        fields
    }

    /// A coupon whose minimum is no longer met grants nothing.
    fn totals(&self, subtotal: i64) -> CheckoutTotals {
        let shipping = self.shipping.as_ref().map_or(0, |option| option.price);
        let discount = self
            .coupon
            .as_ref()
            .filter(|coupon| subtotal >= coupon.minimum_subtotal)
            .map_or(0, |coupon| coupon.discount_for(subtotal));
        CheckoutTotals::compute(subtotal, shipping, discount)
    }

    /// Re-run the coupon rules against the subtotal being submitted.
    fn recheck_coupon(&self, subtotal: i64) -> CheckoutResult<()> {
        if let Some(coupon) = &self.coupon {
            coupons::apply_coupon(&coupon.code, subtotal, std::slice::from_ref(coupon))?;
        }
        Ok(())
    }

    fn to_new_order(&self, totals: CheckoutTotals) -> CheckoutResult<NewOrder> {
        let incomplete = || CheckoutError::ValidationIncomplete {
            fields: self.missing_fields(),
        };

        let Some(option) = &self.shipping else {
            return Err(incomplete());
        };
        let customer = self
            .personal
            .clone()
            .into_personal_data()
            .map_err(|_| incomplete())?;

        let mut order = NewOrder::new(
            self.user.id.clone(),
            customer,
            option.id,
            option.name.clone(),
            totals,
        );

        if option.requires_address() {
            let address = self
                .address
                .clone()
                .into_address()
                .map_err(|_| incomplete())?;
            order = order.with_address(address);
        }
        if let Some(coupon) = &self.coupon {
            order = order.with_coupon_code(coupon.normalized_code());
        }

        Ok(order)
    }
}

/// Where the checkout flow currently stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CheckoutState {
    #[default]
    Idle,
    Collecting(CheckoutDraft),
    /// Remote writes are in flight. A dropped `submit` leaves `Failed` with
    /// [`CheckoutError::SubmissionInterrupted`] instead.
    Submitting,
    Succeeded(CheckoutReceipt),
    Failed {
        draft: CheckoutDraft,
        error: CheckoutError,
    },
}

/// Drives a single checkout from the first form to the order receipt.
#[derive(Debug, Default)]
pub struct CheckoutOrchestrator {
    state: CheckoutState,
}

impl CheckoutOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn draft(&self) -> Option<&CheckoutDraft> {
        match &self.state {
            CheckoutState::Collecting(draft) | CheckoutState::Failed { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Start collecting input for `cart`.
    ///
    /// Any previous draft, receipt or retryable failure is discarded.
    pub fn begin(
        &mut self,
        cart: &CartLedger,
        user: Option<&AuthenticatedUser>,
    ) -> CheckoutResult<()> {
        match &self.state {
            CheckoutState::Submitting => return Err(CheckoutError::SubmissionInProgress),
            CheckoutState::Failed { error, .. } if !error.is_retryable() => {
                return Err(CheckoutError::InvalidState);
            }
            _ => {}
        }

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let user = user.ok_or(CheckoutError::AuthenticationRequired)?;

        self.state = CheckoutState::Collecting(CheckoutDraft::for_user(user));
        Ok(())
    }

    pub fn set_personal_data(&mut self, form: PersonalDataForm) -> CheckoutResult<()> {
        self.editable_draft()?.personal = form;
        Ok(())
    }

    pub fn set_shipping_address(&mut self, form: ShippingAddressForm) -> CheckoutResult<()> {
        self.editable_draft()?.address = form;
        Ok(())
    }

    pub fn select_shipping(&mut self, option: ShippingOption) -> CheckoutResult<()> {
        self.editable_draft()?.shipping = Some(option);
        Ok(())
    }

    /// Replace the applied coupon with `code`. A rejected code keeps the
    /// previous coupon in place.
    pub fn apply_coupon(
        &mut self,
        code: &str,
        subtotal: i64,
        coupons: &[Coupon],
    ) -> CheckoutResult<AppliedCoupon> {
        let draft = self.editable_draft()?;
        let applied = coupons::apply_coupon(code, subtotal, coupons)?;
        draft.coupon = Some(applied.coupon.clone());
        Ok(applied)
    }

    pub fn remove_coupon(&mut self) -> CheckoutResult<()> {
        self.editable_draft()?.coupon = None;
        Ok(())
    }

    /// Order summary for `cart` with the current shipping and coupon.
    pub fn totals(&self, cart: &CartLedger) -> CheckoutTotals {
        match self.draft() {
            Some(draft) => draft.totals(cart.subtotal()),
            None => CheckoutTotals::compute(cart.subtotal(), 0, 0),
        }
    }

    /// Check the draft without submitting it.
    pub fn validate(&self) -> CheckoutResult<()> {
        let Some(draft) = self.draft() else {
            return Err(self.unavailable());
        };
        let fields = draft.missing_fields();
        if fields.is_empty() {
            Ok(())
        } else {
            Err(CheckoutError::ValidationIncomplete { fields })
        }
    }

    /// Leave the flow without side effects.
    pub fn abandon(&mut self) -> CheckoutResult<()> {
        if matches!(self.state, CheckoutState::Submitting) {
            return Err(CheckoutError::SubmissionInProgress);
        }
        self.state = CheckoutState::Idle;
        Ok(())
    }

    /// Create the order remotely and empty `cart` once every line is stored.
    ///
    /// The header is written first; lines are then written concurrently and
    /// all awaited. The cart is only emptied when every write succeeded.
    pub async fn submit<W>(
        &mut self,
        writer: &W,
        cart: &mut CartLedger,
    ) -> CheckoutResult<CheckoutReceipt>
    where
        W: OrderWriter + ?Sized,
    {
        if let CheckoutState::Failed { error, .. } = &self.state
            && !error.is_retryable()
        {
            return Err(CheckoutError::InvalidState);
        }
        let Some(draft) = self.draft() else {
            return Err(self.unavailable());
        };
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        self.validate()?;
        draft.recheck_coupon(cart.subtotal())?;
        let totals = draft.totals(cart.subtotal());
        let new_order = draft.to_new_order(totals)?;

        let draft = match std::mem::replace(&mut self.state, CheckoutState::Submitting) {
            CheckoutState::Collecting(draft) | CheckoutState::Failed { draft, .. } => draft,
            other => {
                self.state = other;
                return Err(CheckoutError::InvalidState);
            }
        };
        let submission = Submission {
            state: &mut self.state,
            draft: Some(draft),
        };

        let order = match writer.create_order(new_order).await {
            Ok(order) => order,
            Err(err) => {
                log::error!("Failed to create order: {err}");
                return Err(submission.fail(CheckoutError::OrderCreationFailed {
                    reason: err.to_string(),
                }));
            }
        };

        let requests = cart.lines().iter().map(|line| {
            writer.create_order_line(NewOrderLine::new(
                order.id.clone(),
                line.name.clone(),
                line.unit_price,
                line.quantity,
            ))
        });
        let results = join_all(requests).await;

        let total = results.len();
        let failed = results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .inspect(|err| log::error!("Failed to add line to order {}: {err}", order.id))
            .count();

        if failed > 0 {
            log::error!(
                "Order {} stored with {failed} of {total} lines missing",
                order.id
            );
            return Err(submission.fail(CheckoutError::PartialOrderFailure {
                order_id: order.id,
                failed,
                total,
            }));
        }

        cart.empty_cart();

        let receipt = CheckoutReceipt {
            reference: CheckoutReceipt::reference_for(&order.id),
            order_id: order.id,
            totals,
            created_at: order.created_at,
        };
        log::info!(
            "Order {} submitted for a total of {}",
            receipt.order_id,
            receipt.totals.total
        );
        submission.succeed(receipt.clone());

        Ok(receipt)
    }

    /// Draft that input may still change. A retryable failure goes back to
    /// collecting.
    fn editable_draft(&mut self) -> CheckoutResult<&mut CheckoutDraft> {
        let resumable =
            matches!(&self.state, CheckoutState::Failed { error, .. } if error.is_retryable());
        if resumable && let CheckoutState::Failed { draft, .. } = std::mem::take(&mut self.state) {
            self.state = CheckoutState::Collecting(draft);
        }

        match &mut self.state {
            CheckoutState::Collecting(draft) => Ok(draft),
            CheckoutState::Submitting => Err(CheckoutError::SubmissionInProgress),
            _ => Err(CheckoutError::InvalidState),
        }
    }

    fn unavailable(&self) -> CheckoutError {
        match self.state {
            CheckoutState::Submitting => CheckoutError::SubmissionInProgress,
            _ => CheckoutError::InvalidState,
        }
    }
}

/// Owns the draft while remote writes are in flight. Dropping it before an
/// outcome is recorded marks the checkout as interrupted.
struct Submission<'a> {
    state: &'a mut CheckoutState,
    draft: Option<CheckoutDraft>,
}

impl Submission<'_> {
    fn fail(mut self, error: CheckoutError) -> CheckoutError {
        if let Some(draft) = self.draft.take() {
            *self.state = CheckoutState::Failed {
                draft,
                error: error.clone(),
            };
        }
        error
    }

    fn succeed(mut self, receipt: CheckoutReceipt) {
        self.draft = None;
        *self.state = CheckoutState::Succeeded(receipt);
    }
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        if let Some(draft) = self.draft.take() {
            log::warn!("Order submission dropped before completion; outcome unknown");
            *self.state = CheckoutState::Failed {
                draft,
                error: CheckoutError::SubmissionInterrupted,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use futures::FutureExt;

    use super::*;
    use crate::domain::coupon::DiscountType;
    use crate::domain::order::{Order, OrderLine, OrderStatus};
    use crate::domain::product::Product;
    use crate::repository::mock::MockOrderWriter;
    use crate::repository::{MemorySnapshotStore, RepositoryError, RepositoryResult};

    const ORDER_ID: &str = "3f2a9c1d-77aa-4e0b-9d1c-5b6f0e2a1c44";

    fn buyer() -> AuthenticatedUser {
        AuthenticatedUser::new("user-1", "Ana Pérez", "ana@example.com")
            .with_rut("12.345.678-5")
            .with_phone("912345678")
    }

    fn cart_with(products: &[(Product, u32)]) -> CartLedger {
        let mut cart = CartLedger::new(Arc::new(MemorySnapshotStore::new()));
        for (product, quantity) in products {
            cart.add_product(product, *quantity).expect("add to cart");
        }
        cart
    }

    fn ready_orchestrator(cart: &CartLedger) -> CheckoutOrchestrator {
        let mut checkout = CheckoutOrchestrator::new();
        checkout.begin(cart, Some(&buyer())).expect("begin");
        checkout
            .select_shipping(ShippingOption::pickup(1, "Retiro en tienda", 0))
            .expect("select shipping");
        checkout
    }

    fn created_order(total_amount: i64) -> Order {
        Order {
            id: ORDER_ID.to_string(),
            status: OrderStatus::Completed,
            total_amount,
            created_at: NaiveDateTime::default(),
        }
    }

    /// Writer whose calls never complete.
    struct StalledWriter;

    #[async_trait]
    impl OrderWriter for StalledWriter {
        async fn create_order(&self, _new_order: NewOrder) -> RepositoryResult<Order> {
            futures::future::pending().await
        }

        async fn create_order_line(&self, _new_line: NewOrderLine) -> RepositoryResult<OrderLine> {
            futures::future::pending().await
        }
    }

    fn stored_line(new_line: NewOrderLine) -> OrderLine {
        OrderLine {
            id: format!("line-{}", new_line.product_name),
            order_id: new_line.order_id,
            product_name: new_line.product_name,
            unit_price: new_line.unit_price,
            quantity: new_line.quantity,
        }
    }

    #[test]
    fn begin_requires_cart_and_user() {
        let mut checkout = CheckoutOrchestrator::new();
        let empty = cart_with(&[]);
        let cart = cart_with(&[(Product::new(1, "Café", 10000, 3), 1)]);

        assert_eq!(
            checkout.begin(&empty, Some(&buyer())),
            Err(CheckoutError::EmptyCart)
        );
        assert_eq!(
            checkout.begin(&cart, None),
            Err(CheckoutError::AuthenticationRequired)
        );
        assert_eq!(checkout.state(), &CheckoutState::Idle);

        checkout.begin(&cart, Some(&buyer())).expect("begin");
        let draft = checkout.draft().expect("collecting");
        assert_eq!(draft.personal.email, "ana@example.com");
        assert_eq!(draft.personal.rut, "12.345.678-5");
    }

    #[test]
    fn validation_lists_missing_fields() {
        let cart = cart_with(&[(Product::new(1, "Café", 10000, 3), 1)]);
        let mut checkout = CheckoutOrchestrator::new();
        checkout
            .begin(&cart, Some(&AuthenticatedUser::new("u", "Ana", "ana@example.com")))
            .expect("begin");

        assert_eq!(
            checkout.validate(),
            Err(CheckoutError::ValidationIncomplete {
                fields: vec![
                    CheckoutField::Rut,
                    CheckoutField::Phone,
                    CheckoutField::ShippingOption
                ]
            })
        );

        checkout
            .select_shipping(ShippingOption::delivery(2, "Despacho", 2000))
            .expect("select");
        let Err(CheckoutError::ValidationIncomplete { fields }) = checkout.validate() else {
            panic!("expected incomplete checkout");
        };
        assert!(fields.contains(&CheckoutField::ShippingAddress));
    }

    #[test]
    fn pickup_does_not_need_an_address() {
        let cart = cart_with(&[(Product::new(1, "Café", 10000, 3), 1)]);
        let checkout = ready_orchestrator(&cart);

        assert_eq!(checkout.validate(), Ok(()));
    }

    #[test]
    fn coupon_replaces_previous_and_totals_follow() {
        let cart = cart_with(&[(Product::new(1, "Café", 10000, 3), 2)]);
        let mut checkout = ready_orchestrator(&cart);
        let coupons = vec![
            Coupon::new("FIVE", DiscountType::Fixed, 5000),
            Coupon::new("TEN", DiscountType::Percentage, 10),
        ];

        checkout
            .apply_coupon("five", cart.subtotal(), &coupons)
            .expect("first coupon");
        checkout
            .apply_coupon("ten", cart.subtotal(), &coupons)
            .expect("second coupon");
        assert_eq!(checkout.totals(&cart), CheckoutTotals::compute(20000, 0, 2000));

        assert!(matches!(
            checkout.apply_coupon("missing", cart.subtotal(), &coupons),
            Err(CheckoutError::Coupon(CouponError::NotFound { .. }))
        ));
        assert_eq!(checkout.totals(&cart).discount, 2000);

        checkout.remove_coupon().expect("remove");
        assert_eq!(checkout.totals(&cart).total, 20000);
    }

    #[tokio::test]
    async fn coupon_discount_follows_cart_changes() {
        let mut cart = cart_with(&[
            (Product::new(1, "Café", 10000, 3), 2),
            (Product::new(2, "Té", 2500, 5), 2),
        ]);
        let mut checkout = ready_orchestrator(&cart);
        let coupons = vec![
            Coupon::new("SAVE5000", DiscountType::Fixed, 5000).with_minimum_subtotal(15000),
            Coupon::new("TEN", DiscountType::Percentage, 10),
        ];

        checkout
            .apply_coupon("TEN", cart.subtotal(), &coupons)
            .expect("percentage coupon");
        assert_eq!(checkout.totals(&cart).discount, 2500);
        cart.change_quantity(2, -2).expect("drop tea");
        assert_eq!(checkout.totals(&cart).discount, 2000);

        checkout
            .apply_coupon("SAVE5000", cart.subtotal(), &coupons)
            .expect("minimum met");
        assert_eq!(checkout.totals(&cart).discount, 5000);
        cart.change_quantity(1, -1).expect("drop one coffee");
        assert_eq!(checkout.totals(&cart), CheckoutTotals::compute(10000, 0, 0));

        let mut writer = MockOrderWriter::new();
        writer.expect_create_order().never();
        writer.expect_create_order_line().never();

        assert_eq!(
            checkout.submit(&writer, &mut cart).await,
            Err(CheckoutError::Coupon(CouponError::MinimumNotMet {
                minimum: 15000,
                subtotal: 10000,
            }))
        );
        assert!(matches!(checkout.state(), CheckoutState::Collecting(_)));
        assert_eq!(cart.total_item_count(), 1);
    }

    #[test]
    fn dropped_submit_leaves_an_interrupted_failure() {
        let mut cart = cart_with(&[(Product::new(1, "Café", 10000, 3), 1)]);
        let mut checkout = ready_orchestrator(&cart);

        assert!(checkout.submit(&StalledWriter, &mut cart).now_or_never().is_none());

        let CheckoutState::Failed { error, draft } = checkout.state() else {
            panic!("expected a failed checkout, got {:?}", checkout.state());
        };
        assert_eq!(error, &CheckoutError::SubmissionInterrupted);
        assert!(!error.is_retryable());
        assert_eq!(draft.user.id, "user-1");
        assert_eq!(cart.total_item_count(), 1);

        assert_eq!(
            checkout.begin(&cart, Some(&buyer())),
            Err(CheckoutError::InvalidState)
        );
        checkout.abandon().expect("abandon after interruption");
        checkout.begin(&cart, Some(&buyer())).expect("begin again");
    }

    #[tokio::test]
    async fn successful_submit_empties_cart_and_returns_receipt() {
        let mut cart = cart_with(&[
            (Product::new(1, "Café", 10000, 3), 2),
            (Product::new(2, "Té", 2500, 5), 1),
        ]);
        let mut checkout = ready_orchestrator(&cart);
        let mut writer = MockOrderWriter::new();

        writer
            .expect_create_order()
            .times(1)
            .withf(|order| {
                order.status == OrderStatus::Completed
                    && order.total_amount == 22500
                    && order.address.is_none()
                    && order.customer.rut == "12345678-5"
            })
            .returning(|order| Ok(created_order(order.total_amount)));
        writer
            .expect_create_order_line()
            .times(2)
            .withf(|line| line.order_id == ORDER_ID)
            .returning(|line| Ok(stored_line(line)));

        let receipt = checkout
            .submit(&writer, &mut cart)
            .await
            .expect("submit should succeed");

        assert_eq!(receipt.order_id, ORDER_ID);
        assert_eq!(receipt.reference, "3F2A9C1D");
        assert_eq!(receipt.totals.total, 22500);
        assert!(cart.is_empty());
        assert_eq!(checkout.state(), &CheckoutState::Succeeded(receipt));
    }

    #[tokio::test]
    async fn header_failure_is_retryable_and_keeps_cart() {
        let mut cart = cart_with(&[(Product::new(1, "Café", 10000, 3), 1)]);
        let mut checkout = ready_orchestrator(&cart);
        let mut writer = MockOrderWriter::new();

        writer
            .expect_create_order()
            .times(1)
            .returning(|_| Err(RepositoryError::Unavailable("timeout".to_string())));
        writer.expect_create_order_line().never();

        let err = checkout
            .submit(&writer, &mut cart)
            .await
            .expect_err("header creation fails");

        assert!(matches!(err, CheckoutError::OrderCreationFailed { .. }));
        assert!(err.is_retryable());
        assert_eq!(cart.total_item_count(), 1);

        // Editing after a retryable failure resumes collecting.
        checkout.remove_coupon().expect("edit after failure");
        assert!(matches!(checkout.state(), CheckoutState::Collecting(_)));
    }

    #[tokio::test]
    async fn failed_line_yields_partial_failure_and_blocks_resubmit() {
        let mut cart = cart_with(&[
            (Product::new(1, "Café", 10000, 3), 1),
            (Product::new(2, "Té", 2500, 5), 2),
        ]);
        let before = cart.lines().to_vec();
        let mut checkout = ready_orchestrator(&cart);
        let mut writer = MockOrderWriter::new();

        writer
            .expect_create_order()
            .times(1)
            .returning(|order| Ok(created_order(order.total_amount)));
        writer
            .expect_create_order_line()
            .times(2)
            .returning(|line| {
                if line.product_name == "Té" {
                    Err(RepositoryError::Rejected("line refused".to_string()))
                } else {
                    Ok(stored_line(line))
                }
            });

        let err = checkout
            .submit(&writer, &mut cart)
            .await
            .expect_err("second line fails");

        assert_eq!(
            err,
            CheckoutError::PartialOrderFailure {
                order_id: ORDER_ID.to_string(),
                failed: 1,
                total: 2,
            }
        );
        assert!(!err.is_retryable());
        assert_eq!(cart.lines(), before.as_slice());
        assert!(!matches!(checkout.state(), CheckoutState::Succeeded(_)));

        assert_eq!(
            checkout.submit(&writer, &mut cart).await,
            Err(CheckoutError::InvalidState)
        );
        assert_eq!(
            checkout.set_personal_data(PersonalDataForm::default()),
            Err(CheckoutError::InvalidState)
        );

        checkout.abandon().expect("abandon");
        assert_eq!(checkout.state(), &CheckoutState::Idle);
    }

    #[tokio::test]
    async fn submit_rejects_incomplete_draft_without_remote_calls() {
        let mut cart = cart_with(&[(Product::new(1, "Café", 10000, 3), 1)]);
        let mut checkout = CheckoutOrchestrator::new();
        checkout.begin(&cart, Some(&buyer())).expect("begin");
        let mut writer = MockOrderWriter::new();
        writer.expect_create_order().never();

        let result = checkout.submit(&writer, &mut cart).await;

        assert_eq!(
            result,
            Err(CheckoutError::ValidationIncomplete {
                fields: vec![CheckoutField::ShippingOption]
            })
        );
        assert!(matches!(checkout.state(), CheckoutState::Collecting(_)));
    }

    #[test]
    fn input_is_refused_while_submitting() {
        let cart = cart_with(&[(Product::new(1, "Café", 10000, 3), 1)]);
        let mut checkout = CheckoutOrchestrator {
            state: CheckoutState::Submitting,
        };

        assert_eq!(
            checkout.select_shipping(ShippingOption::pickup(1, "Retiro", 0)),
            Err(CheckoutError::SubmissionInProgress)
        );
        assert_eq!(
            checkout.begin(&cart, Some(&buyer())),
            Err(CheckoutError::SubmissionInProgress)
        );
        assert_eq!(checkout.abandon(), Err(CheckoutError::SubmissionInProgress));
        assert_eq!(checkout.validate(), Err(CheckoutError::SubmissionInProgress));
    }
}
