//! Catalog controller
//!
//! Owns the listing's filter state, pagination and the current working set,
//! and drives the catalog source. Every product fetch carries a generation
//! number and a cancellation token: starting a fetch cancels the previous
//! one, and a result whose generation is no longer current is discarded, so
//! the listing always reflects the latest filter state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::models::{Offer, Product};
use shared::page::{PaginatedResponse, ProductPage};
use shared::request::ProductListRequest;
use shared::util::now_millis;
use tokio_util::sync::CancellationToken;

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::fallback::FallbackCatalog;
use crate::filter::{FacetFilter, FilterChange, FilterState};
use crate::index::CategoryIndex;
use crate::normalize::{NormalizeContext, normalize_categories, normalize_offers, normalize_products};
use crate::pagination::{LoadPhase, PageItem, PaginationReconciler, page_slice, page_window};
use crate::source::CatalogSource;
use crate::text::slugify;
use crate::tree::{CategoryTreeNode, build_forest, forest_from_products};
use crate::variants::merge_variants;

/// Inline notice shown while the bundled dataset stands in for the service
pub const FALLBACK_NOTICE: &str =
    "No pudimos conectar con el catálogo. Mostrando productos disponibles sin conexión.";

/// What the storefront renders for the current filter state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub page: PaginatedResponse<Product>,
    pub phase: LoadPhase,
    /// Non-blocking notice, set while degraded
    pub notice: Option<String>,
}

impl Default for Listing {
    fn default() -> Self {
        Self {
            page: PaginatedResponse::single_page(Vec::new()),
            phase: LoadPhase::Idle,
            notice: None,
        }
    }
}

/// A product fetch that has been issued but not committed
#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: u64,
    request: ProductListRequest,
    token: CancellationToken,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &ProductListRequest {
        &self.request
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Run the fetch against `source`, stopping early once superseded
    pub async fn run<S: CatalogSource + ?Sized>(self, source: &S) -> FetchOutcome {
        let result = tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(CatalogError::Cancelled(self.generation)),
            page = source.list_products(&self.request) => page,
        };
        FetchOutcome {
            generation: self.generation,
            request: self.request,
            result,
        }
    }
}

/// Resolved fetch, waiting to be committed
#[derive(Debug)]
pub struct FetchOutcome {
    pub generation: u64,
    pub request: ProductListRequest,
    pub result: CatalogResult<ProductPage>,
}

/// Result of committing a fetch outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Listing updated from the service
    Remote,
    /// Service failed; listing rebuilt from the bundled dataset
    Fallback,
    /// Outcome belonged to a superseded fetch and was dropped
    Stale,
    /// The requested page was out of range; the page was clamped and the
    /// listing should be fetched again
    Clamped(u32),
}

pub struct CatalogController<S> {
    source: Arc<S>,
    config: CatalogConfig,
    state: FilterState,
    navigation_pending: bool,
    pagination: PaginationReconciler,
    index: CategoryIndex,
    forest: Vec<CategoryTreeNode>,
    offers: Vec<Offer>,
    fallback: FallbackCatalog,
    listing: Listing,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl<S: CatalogSource> CatalogController<S> {
    /// Create a controller with the bundled fallback dataset
    pub fn new(source: S, config: CatalogConfig) -> CatalogResult<Self> {
        let fallback = FallbackCatalog::bundled(&config.api_base)?;
        Ok(Self::with_fallback(source, config, fallback))
    }

    pub fn with_fallback(source: S, config: CatalogConfig, fallback: FallbackCatalog) -> Self {
        let state = FilterState::new(config.default_page_size);
        let pagination = PaginationReconciler::new(state.page_size);
        Self {
            source: Arc::new(source),
            config,
            state,
            // the first fetch keeps whatever page the URL asked for
            navigation_pending: true,
            pagination,
            index: CategoryIndex::default(),
            forest: Vec::new(),
            offers: Vec::new(),
            fallback,
            listing: Listing::default(),
            generation: 0,
            in_flight: None,
        }
    }

    /// Replace the filter state with one parsed from a URL query string
    pub fn restore_query(&mut self, query: &str) {
        self.state = FilterState::from_query(query, &self.config);
        self.navigation_pending = true;
    }

    /// Current filter state as a URL query string
    pub fn to_query(&self) -> String {
        self.state.to_query(&self.config)
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn source(&self) -> Arc<S> {
        Arc::clone(&self.source)
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn pagination(&self) -> &PaginationReconciler {
        &self.pagination
    }

    pub fn index(&self) -> &CategoryIndex {
        &self.index
    }

    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    /// Category navigation tree
    ///
    /// Built from the category list; when none loaded, derived from the
    /// products currently listed.
    pub fn forest(&self) -> Vec<CategoryTreeNode> {
        if !self.forest.is_empty() {
            return self.forest.clone();
        }
        let products: &[Product] = if self.pagination.is_fallback_active() {
            self.fallback.products()
        } else {
            &self.listing.page.data
        };
        forest_from_products(products, &self.config.merchandising)
    }

    /// Page buttons for the current listing
    pub fn page_window(&self) -> Vec<PageItem> {
        page_window(self.pagination.displayed_page(), self.pagination.total_pages())
    }

    /// Load categories, then offers, then the first listing page
    pub async fn initialize(&mut self) -> &Listing {
        self.load_categories().await;
        self.load_offers().await;
        self.refresh().await
    }

    /// Load the category list and rebuild the index and tree
    ///
    /// A failure keeps the previous index; the tree then falls back to
    /// product paths. Returns the number of categories loaded.
    pub async fn load_categories(&mut self) -> usize {
        match self.source.list_categories().await {
            Ok(values) => {
                let categories = normalize_categories(&values);
                self.index = CategoryIndex::new(&categories);
                self.forest = build_forest(&categories, &self.config.merchandising);
                tracing::info!(count = categories.len(), "Categories loaded");
                categories.len()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load categories");
                0
            }
        }
    }

    /// Load offers used for discount overlays; a failure leaves none active
    pub async fn load_offers(&mut self) -> usize {
        match self.source.list_offers().await {
            Ok(values) => {
                self.offers = normalize_offers(&values);
                tracing::debug!(count = self.offers.len(), "Offers loaded");
                self.offers.len()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load offers");
                self.offers.clear();
                0
            }
        }
    }

    /// Apply one filter edit; returns whether the state changed
    ///
    /// Page sizes outside the allowed set fall back to the default.
    pub fn apply_change(&mut self, change: FilterChange) -> bool {
        let change = match change {
            FilterChange::PageSize(size) => FilterChange::PageSize(self.config.page_size_or_default(size)),
            other => other,
        };
        let navigation = change.is_page_navigation();
        let changed = self.state.apply(change);
        if changed {
            self.navigation_pending = navigation;
        }
        changed
    }

    /// Apply an edit and refetch when it changed anything
    pub async fn update(&mut self, change: FilterChange) -> &Listing {
        if self.apply_change(change) {
            self.refresh().await
        } else {
            &self.listing
        }
    }

    pub async fn next_page(&mut self) -> &Listing {
        let page = self.pagination.displayed_page().saturating_add(1);
        let page = page.min(self.pagination.total_pages());
        self.update(FilterChange::Page(page)).await
    }

    pub async fn previous_page(&mut self) -> &Listing {
        let page = self.pagination.displayed_page().saturating_sub(1).max(1);
        self.update(FilterChange::Page(page)).await
    }

    /// Fetch and commit the listing for the current state
    ///
    /// An out-of-range page is clamped and fetched once more.
    pub async fn refresh(&mut self) -> &Listing {
        for _ in 0..2 {
            let ticket = self.begin_fetch();
            let source = Arc::clone(&self.source);
            let outcome = ticket.run(source.as_ref()).await;
            if !matches!(self.commit(outcome), Commit::Clamped(_)) {
                break;
            }
        }
        &self.listing
    }

    /// Issue a fetch for the current state, cancelling the one in flight
    pub fn begin_fetch(&mut self) -> FetchTicket {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }
        self.generation += 1;
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());

        self.pagination
            .begin(self.state.page, self.state.page_size, self.navigation_pending);
        self.state.page = self.pagination.requested_page();
        self.navigation_pending = false;
        self.listing.phase = self.pagination.phase();

        let request = self.build_request();
        tracing::debug!(
            generation = self.generation,
            page = request.page,
            limit = request.limit,
            "Fetching products"
        );
        FetchTicket {
            generation: self.generation,
            request,
            token,
        }
    }

    /// Apply a resolved fetch unless a newer one has been issued since
    pub fn commit(&mut self, outcome: FetchOutcome) -> Commit {
        if outcome.generation != self.generation {
            tracing::warn!(
                generation = outcome.generation,
                current = self.generation,
                "Discarding stale catalog response"
            );
            return Commit::Stale;
        }
        self.in_flight = None;

        match outcome.result {
            Ok(page) => self.commit_remote(&outcome.request, page),
            Err(e) if e.is_cancelled() => {
                tracing::debug!(generation = outcome.generation, "Fetch cancelled");
                Commit::Stale
            }
            Err(e) => {
                tracing::warn!(error = %e, "Catalog fetch failed, using fallback dataset");
                self.commit_fallback();
                Commit::Fallback
            }
        }
    }

    fn build_request(&self) -> ProductListRequest {
        let request = ProductListRequest::new(self.state.page, self.state.page_size)
            .with_query(self.state.query.as_str())
            .with_sort(self.state.sort);

        if let Some(id) = self
            .index
            .resolve_selection(&self.state.category, &self.state.subcategory)
        {
            return request.with_category_id(id);
        }
        let label = if self.state.subcategory.trim().is_empty() {
            self.state.category.trim()
        } else {
            self.state.subcategory.trim()
        };
        if label.is_empty() {
            request
        } else {
            request.with_category_slug(slugify(label))
        }
    }

    fn commit_remote(&mut self, request: &ProductListRequest, page: ProductPage) -> Commit {
        let ctx = NormalizeContext {
            index: &self.index,
            offers: &self.offers,
            api_base: &self.config.api_base,
            now_millis: now_millis(),
        };
        let products = normalize_products(&page.items, &ctx);
        let products = merge_variants(products, &self.config.merchandising.variant_merges);

        let total = page
            .total
            .filter(|t| *t > 0)
            .unwrap_or(products.len() as u64);
        let displayed = self.pagination.on_remote_success(total, page.pages);

        // the service already filtered by category; only size groups are re-checked
        let filter = FacetFilter::new(&self.index, &self.config.merchandising);
        let outcome = filter.apply_with(&products, &self.state, true);

        if displayed != request.page {
            self.state.page = displayed;
            self.navigation_pending = true;
            self.listing.phase = self.pagination.phase();
            return Commit::Clamped(displayed);
        }

        self.listing = Listing {
            page: PaginatedResponse {
                data: outcome.items,
                total,
                page: displayed,
                limit: self.pagination.page_size(),
                total_pages: self.pagination.total_pages(),
            },
            phase: self.pagination.phase(),
            notice: None,
        };
        Commit::Remote
    }

    fn commit_fallback(&mut self) {
        let products = merge_variants(
            self.fallback.products().to_vec(),
            &self.config.merchandising.variant_merges,
        );
        let filter = FacetFilter::new(&self.index, &self.config.merchandising);
        let outcome = filter.apply(&products, &self.state);

        let displayed = self.pagination.on_remote_failure(outcome.total);
        self.state.page = displayed;
        let page_size = self.pagination.page_size();

        self.listing = Listing {
            page: PaginatedResponse {
                data: page_slice(&outcome.items, displayed, page_size).to_vec(),
                total: outcome.total as u64,
                page: displayed,
                limit: page_size,
                total_pages: self.pagination.total_pages(),
            },
            phase: self.pagination.phase(),
            notice: Some(FALLBACK_NOTICE.to_string()),
        };
    }
}
