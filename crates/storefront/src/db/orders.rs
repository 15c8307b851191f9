//! Order repository backed by `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use pickup_core::{BillingDetails, Email, NewOrder, Order, OrderId};

use super::{OrderRepository, RepositoryError};

const ORDER_COLUMNS: &str = r"
    id, order_key,
    billing_first_name, billing_last_name, billing_email,
    billing_address_1, billing_city, billing_postcode, billing_phone,
    customer_note, created_at
";

/// Row shape of `storefront.orders`.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_key: Uuid,
    billing_first_name: String,
    billing_last_name: String,
    billing_email: String,
    billing_address_1: String,
    billing_city: String,
    billing_postcode: String,
    billing_phone: Option<String>,
    customer_note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.billing_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email on order {}: {e}", row.id))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            order_key: row.order_key,
            billing: BillingDetails {
                first_name: row.billing_first_name,
                last_name: row.billing_last_name,
                email,
                address_1: row.billing_address_1,
                city: row.billing_city,
                postcode: row.billing_postcode,
                phone: row.billing_phone,
            },
            customer_note: row.customer_note,
            created_at: row.created_at,
        })
    }
}

/// Repository for order rows and the metadata written alongside them.
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    /// Insert the order row and every pending metadata entry in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order key already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    async fn create(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let insert = format!(
            r"
            INSERT INTO storefront.orders (
                order_key,
                billing_first_name, billing_last_name, billing_email,
                billing_address_1, billing_city, billing_postcode, billing_phone,
                customer_note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ORDER_COLUMNS}
            "
        );

        let row: OrderRow = sqlx::query_as(&insert)
            .bind(order.order_key)
            .bind(&order.billing.first_name)
            .bind(&order.billing.last_name)
            .bind(order.billing.email.as_str())
            .bind(&order.billing.address_1)
            .bind(&order.billing.city)
            .bind(&order.billing.postcode)
            .bind(order.billing.phone.as_deref())
            .bind(order.customer_note.as_deref())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("order key already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        for (key, value) in order.meta_data() {
            sqlx::query(
                r"
                INSERT INTO storefront.order_meta (order_id, meta_key, meta_value)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(row.id)
            .bind(key.as_str())
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Order::try_from(row)
    }

    /// Get an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let select = format!("SELECT {ORDER_COLUMNS} FROM storefront.orders WHERE id = $1");

        let row: Option<OrderRow> = sqlx::query_as(&select)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Order::try_from).transpose()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
