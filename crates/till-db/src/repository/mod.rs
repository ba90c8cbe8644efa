//! # Repository Module
//!
//! Database repository implementations for Till.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Touches Which Table                              │
//! │                                                                         │
//! │  seed binary, back office                                              │
//! │       │  db.products().upsert(101, "Cola", $50.00, 10)                  │
//! │       ▼                                                                 │
//! │  ProductRepository ──────────► products                                │
//! │                                                                         │
//! │  CheckoutEngine                                                        │
//! │       │  begin / decrease_stock / save_sale / commit                    │
//! │       ▼                                                                 │
//! │  SqliteCheckoutStore ────────► products, sales, sale_items             │
//! │       (one transaction)                                                 │
//! │                                                                         │
//! │  reporting, checkout binary                                            │
//! │       │  db.sales().get_by_id(id)                                       │
//! │       ▼                                                                 │
//! │  SaleRepository ─────────────► sales, sale_items (read only)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product seeding, lookup and restocking
//! - [`SaleRepository`](sale::SaleRepository) - Recorded sales and their lines

pub mod product;
pub mod sale;
