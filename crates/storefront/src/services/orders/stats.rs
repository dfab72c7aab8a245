//! Dashboard aggregates over the order book.

use chrono::{DateTime, Datelike, Duration, Utc};
use greenhouse_core::{OrderStatus, Price};
use serde::Serialize;

use crate::models::Order;

const RECENT_ORDERS: usize = 5;

/// Orders and revenue over one time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PeriodStats {
    pub orders: usize,
    pub revenue: Price,
}

/// Order counts by status bucket. `pending` includes `pending_payment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub processing: usize,
    pub shipped: usize,
    pub delivered: usize,
    pub cancelled: usize,
}

/// Everything shown on the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: usize,
    /// Excludes cancelled orders.
    pub total_revenue: Price,
    pub total_products: usize,
    pub total_users: usize,
    /// Since the start of the current UTC month.
    pub this_month: PeriodStats,
    /// The last seven days.
    pub this_week: PeriodStats,
    pub orders_by_status: StatusCounts,
    pub recent_orders: Vec<Order>,
}

/// Aggregate `orders` as of `now`.
///
/// `orders` must already be sorted newest first.
#[must_use]
pub fn compute(
    orders: &[Order],
    now: DateTime<Utc>,
    total_products: usize,
    total_users: usize,
) -> DashboardStats {
    let month_start = now
        .date_naive()
        .with_day(1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map_or(now, |start| start.and_utc());
    let week_start = now - Duration::days(7);

    let mut orders_by_status = StatusCounts::default();
    for order in orders {
        match order.status {
            OrderStatus::PendingPayment | OrderStatus::Pending => orders_by_status.pending += 1,
            OrderStatus::Processing => orders_by_status.processing += 1,
            OrderStatus::Shipped => orders_by_status.shipped += 1,
            OrderStatus::Delivered => orders_by_status.delivered += 1,
            OrderStatus::Cancelled => orders_by_status.cancelled += 1,
        }
    }

    DashboardStats {
        total_orders: orders.len(),
        total_revenue: revenue(orders.iter()),
        total_products,
        total_users,
        this_month: period(orders, month_start),
        this_week: period(orders, week_start),
        orders_by_status,
        recent_orders: orders.iter().take(RECENT_ORDERS).cloned().collect(),
    }
}

fn period(orders: &[Order], since: DateTime<Utc>) -> PeriodStats {
    let in_window = || orders.iter().filter(move |order| order.created_at >= since);
    PeriodStats {
        orders: in_window().count(),
        revenue: revenue(in_window()),
    }
}

fn revenue<'a>(orders: impl Iterator<Item = &'a Order>) -> Price {
    orders
        .filter(|order| order.status != OrderStatus::Cancelled)
        .fold(Price::ZERO, |acc, order| acc.saturating_add(order.total))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use greenhouse_core::{Email, OrderId, PaymentMethod, PaymentStatus};

    use super::*;
    use crate::models::{CustomerInfo, ShippingAddress};

    fn order(id: &str, total: i64, status: OrderStatus, created_at: DateTime<Utc>) -> Order {
        Order {
            id: OrderId::new(id),
            customer_info: CustomerInfo {
                name: "Ann".to_string(),
                email: Email::parse("ann@x.com").unwrap(),
                phone: "1".to_string(),
            },
            shipping_address: ShippingAddress {
                address: "1 Road".to_string(),
                landmark: None,
                city: "Pune".to_string(),
                state: "MH".to_string(),
                pincode: "411001".to_string(),
            },
            items: Vec::new(),
            subtotal: Price::from_rupees(total),
            shipping: Price::ZERO,
            tax: Price::ZERO,
            total: Price::from_rupees(total),
            status,
            payment_method: PaymentMethod::Cod,
            payment_status: PaymentStatus::Pending,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_windows_buckets_and_cancelled_revenue() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let orders = vec![
            order("a", 100, OrderStatus::PendingPayment, now - Duration::hours(1)),
            order("b", 200, OrderStatus::Cancelled, now - Duration::days(2)),
            order("c", 300, OrderStatus::Delivered, now - Duration::days(8)),
            order("d", 400, OrderStatus::Pending, now - Duration::days(20)),
        ];

        let stats = compute(&orders, now, 12, 3);

        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.total_revenue, Price::from_rupees(800));
        assert_eq!(
            stats.this_week,
            PeriodStats {
                orders: 2,
                revenue: Price::from_rupees(100)
            }
        );
        assert_eq!(
            stats.this_month,
            PeriodStats {
                orders: 3,
                revenue: Price::from_rupees(400)
            }
        );
        assert_eq!(stats.orders_by_status.pending, 2);
        assert_eq!(stats.orders_by_status.cancelled, 1);
        assert_eq!(stats.orders_by_status.delivered, 1);
        assert_eq!(stats.total_products, 12);
        assert_eq!(stats.total_users, 3);
    }

    #[test]
    fn test_recent_orders_capped_at_five() {
        let now = Utc::now();
        let orders: Vec<Order> = (0..7)
            .map(|i| {
                order(
                    &format!("o{i}"),
                    10,
                    OrderStatus::Processing,
                    now - Duration::minutes(i),
                )
            })
            .collect();

        let stats = compute(&orders, now, 0, 0);
        assert_eq!(stats.recent_orders.len(), 5);
        assert_eq!(stats.recent_orders[0].id.as_str(), "o0");
    }

    #[test]
    fn test_empty_book() {
        let stats = compute(&[], Utc::now(), 0, 0);
        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.total_revenue, Price::ZERO);
        assert!(stats.recent_orders.is_empty());
    }
}
