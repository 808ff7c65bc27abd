use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::domain::checkout::{CheckoutReceipt, CheckoutTotals};
use crate::domain::coupon::{AppliedCoupon, Coupon};
use crate::domain::favorite::FavoriteToggle;
use crate::domain::filter::FilterCriteria;
use crate::domain::product::Product;
use crate::domain::shipping::ShippingOption;
use crate::domain::user::AuthenticatedUser;
use crate::forms::checkout::{PersonalDataForm, ShippingAddressForm};
use crate::forms::filters::FilterQuery;
use crate::repository::{
    CatalogReader, FileSnapshotStore, JsonDataSource, OrderWriter, ReferenceDataReader,
    SnapshotStore,
};
use crate::services::cart::CartLedger;
use crate::services::catalog::{CatalogStore, FilteredProducts};
use crate::services::checkout::CheckoutOrchestrator;
use crate::services::favorites::FavoritesSet;
use crate::services::{ServiceError, ServiceResult};

/// One shopping session: catalog, reference data, cart, favorites and the
/// checkout flow, addressed by product id, shipping id and coupon code.
#[derive(Debug)]
pub struct Storefront {
    catalog: CatalogStore,
    coupons: Vec<Coupon>,
    shipping_options: Vec<ShippingOption>,
    cart: CartLedger,
    favorites: FavoritesSet,
    checkout: CheckoutOrchestrator,
}

impl Storefront {
    /// Load catalog and reference data from `source` and restore the cart
    /// and favorites saved in `store`.
    pub fn load<S>(source: &S, store: Arc<dyn SnapshotStore>) -> ServiceResult<Self>
    where
        S: CatalogReader + ReferenceDataReader + ?Sized,
    {
        let catalog = CatalogStore::load(source)?;
        let coupons = source.list_coupons().map_err(|err| {
            log::error!("Failed to load coupons: {err}");
            err
        })?;
        let shipping_options = source.list_shipping_options().map_err(|err| {
            log::error!("Failed to load shipping options: {err}");
            err
        })?;

        let cart = CartLedger::restore(Arc::clone(&store));
        let favorites = FavoritesSet::restore(store);
        log::info!(
            "Storefront ready: {} products, {} cart lines, {} favorites",
            catalog.len(),
            cart.lines().len(),
            favorites.count()
        );

        Ok(Self {
            catalog,
            coupons,
            shipping_options,
            cart,
            favorites,
            checkout: CheckoutOrchestrator::new(),
        })
    }

    /// Wire the file based collaborators named by `config`.
    pub fn from_config(config: &StorefrontConfig) -> ServiceResult<Self> {
        let source = JsonDataSource::new(&config.data_dir);
        let store: Arc<dyn SnapshotStore> = Arc::new(FileSnapshotStore::new(&config.snapshot_dir));
        Self::load(&source, store)
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn cart(&self) -> &CartLedger {
        &self.cart
    }

    pub fn favorites(&self) -> &FavoritesSet {
        &self.favorites
    }

    pub fn checkout(&self) -> &CheckoutOrchestrator {
        &self.checkout
    }

    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    pub fn shipping_options(&self) -> &[ShippingOption] {
        &self.shipping_options
    }

    pub fn browse(&self, criteria: &FilterCriteria) -> FilteredProducts<'_> {
        self.catalog.filter(criteria)
    }

    /// Browse with filter controls encoded as a query string.
    pub fn browse_query(&self, query: &str) -> ServiceResult<FilteredProducts<'_>> {
        let criteria = FilterQuery::from_query_str(query)
            .and_then(FilterQuery::into_criteria)
            .map_err(|err| ServiceError::Form(err.to_string()))?;
        Ok(self.catalog.filter(&criteria))
    }

    pub fn add_to_cart(&mut self, product_id: i32, quantity: u32) -> ServiceResult<u32> {
        let product = find_product(&self.catalog, product_id)?;
        Ok(self.cart.add_product(product, quantity)?)
    }

    pub fn change_cart_quantity(&mut self, product_id: i32, delta: i64) -> ServiceResult<()> {
        Ok(self.cart.change_quantity(product_id, delta)?)
    }

    pub fn set_cart_quantity(&mut self, product_id: i32, quantity: u32) -> ServiceResult<()> {
        Ok(self.cart.set_quantity(product_id, quantity)?)
    }

    pub fn remove_from_cart(&mut self, product_id: i32) {
        self.cart.remove_product(product_id);
    }

    pub fn empty_cart(&mut self) {
        self.cart.empty_cart();
    }

    pub fn toggle_favorite(&mut self, product_id: i32) -> ServiceResult<FavoriteToggle> {
        let product = find_product(&self.catalog, product_id)?;
        Ok(self.favorites.toggle(product))
    }

    pub fn remove_favorite(&mut self, product_id: i32) {
        self.favorites.remove(product_id);
    }

    pub fn clear_favorites(&mut self) {
        self.favorites.clear();
    }

    pub fn begin_checkout(&mut self, user: Option<&AuthenticatedUser>) -> ServiceResult<()> {
        Ok(self.checkout.begin(&self.cart, user)?)
    }

    pub fn set_personal_data(&mut self, form: PersonalDataForm) -> ServiceResult<()> {
        Ok(self.checkout.set_personal_data(form)?)
    }

    pub fn set_shipping_address(&mut self, form: ShippingAddressForm) -> ServiceResult<()> {
        Ok(self.checkout.set_shipping_address(form)?)
    }

    pub fn select_shipping(&mut self, shipping_id: i32) -> ServiceResult<()> {
        let option = self
            .shipping_options
            .iter()
            .find(|option| option.id == shipping_id)
            .cloned()
            .ok_or(ServiceError::ShippingOptionNotFound(shipping_id))?;
        Ok(self.checkout.select_shipping(option)?)
    }

    /// Apply `code` against the current cart subtotal.
    pub fn apply_coupon(&mut self, code: &str) -> ServiceResult<AppliedCoupon> {
        Ok(self
            .checkout
            .apply_coupon(code, self.cart.subtotal(), &self.coupons)?)
    }

    pub fn remove_coupon(&mut self) -> ServiceResult<()> {
        Ok(self.checkout.remove_coupon()?)
    }

    pub fn checkout_totals(&self) -> CheckoutTotals {
        self.checkout.totals(&self.cart)
    }

    pub async fn submit_order<W>(&mut self, writer: &W) -> ServiceResult<CheckoutReceipt>
    where
        W: OrderWriter + ?Sized,
    {
        Ok(self.checkout.submit(writer, &mut self.cart).await?)
    }

    pub fn abandon_checkout(&mut self) -> ServiceResult<()> {
        Ok(self.checkout.abandon()?)
    }
}

fn find_product(catalog: &CatalogStore, product_id: i32) -> ServiceResult<&Product> {
    catalog
        .get(product_id)
        .ok_or(ServiceError::ProductNotFound(product_id))
}
