//! Pickup-location maintenance commands.
//!
//! The checkout dropdown is built from the values already recorded on orders,
//! so fixing a typo on one order is how a location gets renamed.

use pickup_core::html::escape_attr;
use pickup_core::{BILLING_PICKUP_LOCATION, OrderId, OrderMetadataRepository};
use pickup_storefront::db::PgOrderMetadataRepository;

use super::{CommandError, connect};

/// Print every recorded pickup location with the number of orders using it.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable.
pub async fn list() -> Result<(), CommandError> {
    let repo = PgOrderMetadataRepository::new(connect().await?);
    let counts = repo.value_counts(&BILLING_PICKUP_LOCATION).await?;

    #[allow(clippy::print_stdout)]
    {
        if counts.is_empty() {
            println!("No pickup locations recorded yet.");
        }
        for (location, orders) in &counts {
            println!("{orders:>6}  {location}");
        }
    }

    Ok(())
}

/// Overwrite the pickup location recorded on one order.
///
/// The value is escaped the same way checkout escapes it.
///
/// # Errors
///
/// Returns `CommandError::Metadata` if the order does not exist.
pub async fn set(order_id: OrderId, location: &str) -> Result<(), CommandError> {
    let repo = PgOrderMetadataRepository::new(connect().await?);
    let value = escape_attr(location);

    repo.set(order_id, &BILLING_PICKUP_LOCATION, &value).await?;
    tracing::info!(order_id = %order_id, location = %value, "Pickup location updated");

    Ok(())
}
