//! plaidflat-core: typed sandbox API records and the flatteners that turn them into CSV rows

pub mod identity;
pub mod items;
pub mod listing;
pub mod model;
pub mod record;
pub mod select;
pub mod transactions;

pub use identity::{flatten_identity, identity_columns};
pub use items::{flatten_available_products, ITEM_PRODUCT_COLUMNS};
pub use listing::flatten_listing;
pub use model::{
    Account, AccountsResponse, Address, AddressData, Balances, ContactPoint, Item, Owner,
    Transaction,
};
pub use record::FlatRecord;
pub use select::{select_primary, select_ranked, Selection};
pub use transactions::{flatten_transactions, BundleMetadata, TransactionBundle};
