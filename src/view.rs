//! Derived view state for the listing pages and dashboard.
//!
//! Everything here is a pure function over a loaded collection; nothing reads
//! or writes the store.

use crate::models::{Client, Order, OrderStatus, Warehouse};

/// Records that the listing search box matches against.
pub trait Searchable {
    fn search_fields(&self) -> [&str; 2];
}

impl Searchable for Warehouse {
    fn search_fields(&self) -> [&str; 2] {
        [self.name.as_str(), self.location.as_str()]
    }
}

impl Searchable for Client {
    fn search_fields(&self) -> [&str; 2] {
        [self.name.as_str(), self.email.as_str()]
    }
}

impl Searchable for Order {
    fn search_fields(&self) -> [&str; 2] {
        [self.order_number.as_str(), self.client_name.as_str()]
    }
}

/// Case-insensitive substring search. An empty term matches every record.
pub fn search<'a, T: Searchable>(records: &'a [T], term: &str) -> Vec<&'a T> {
    let term = term.to_lowercase();
    records
        .iter()
        .filter(|record| {
            record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
        })
        .collect()
}

pub const ALL_ORDERS_TAB: &str = "All Orders";

/// Tabs shown above the orders table, in display order.
pub const ORDER_TABS: [&str; 6] = [
    ALL_ORDERS_TAB,
    "Ongoing",
    "Dispatched",
    "Delivered",
    "Return",
    "Cancelled",
];

/// Orders shown under `tab`.
///
/// The "All Orders" tab shows everything; any other tab shows orders whose status
/// name equals the tab label exactly. "Dispatched" and "Return" name no status
/// and therefore show nothing.
pub fn filter_by_tab<'a>(orders: &'a [Order], tab: &str) -> Vec<&'a Order> {
    if tab == ALL_ORDERS_TAB {
        return orders.iter().collect();
    }
    orders
        .iter()
        .filter(|order| order.status.as_str() == tab)
        .collect()
}

/// Headline figures of the orders page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderStats {
    pub total: usize,
    /// Orders in the `Ongoing` state.
    pub dispatched: usize,
    pub delivered: usize,
    /// Orders in the `Rejected` state.
    pub returns: usize,
}

impl OrderStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        Self {
            total: orders.len(),
            dispatched: count_status(orders, OrderStatus::Ongoing),
            delivered: count_status(orders, OrderStatus::Delivered),
            returns: count_status(orders, OrderStatus::Rejected),
        }
    }

    /// `count` as a share of the total, e.g. `"40.00%"`.
    pub fn growth(&self, count: usize) -> String {
        growth_percentage(count, self.total)
    }
}

pub fn count_status(orders: &[Order], status: OrderStatus) -> usize {
    orders.iter().filter(|order| order.status == status).count()
}

/// Count of orders for every status, in [`OrderStatus::ALL`] order.
pub fn status_counts(orders: &[Order]) -> Vec<(OrderStatus, usize)> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| (status, count_status(orders, status)))
        .collect()
}

/// `(count / total) * 100` with two decimals and a percent sign; `"0.00%"` when `total` is zero.
pub fn growth_percentage(count: usize, total: usize) -> String {
    if total == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", count as f64 / total as f64 * 100.0)
}

/// Orders sorted newest first. Orders with unparseable dates sort last.
pub fn sort_by_date_desc(orders: &[Order]) -> Vec<&Order> {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| b.parsed_date().cmp(&a.parsed_date()));
    sorted
}

/// Capacity across all warehouses, as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CapacitySummary {
    pub total_capacity: f64,
    pub used_capacity: f64,
    pub available_capacity: f64,
    /// Used share of the total capacity in percent; zero when there is no capacity.
    pub utilization_rate: f64,
}

impl CapacitySummary {
    pub fn from_warehouses(warehouses: &[Warehouse]) -> Self {
        let total_capacity: f64 = warehouses.iter().map(|w| w.total_capacity).sum();
        let used_capacity: f64 = warehouses.iter().map(|w| w.used_capacity).sum();
        let utilization_rate = if total_capacity <= 0.0 {
            0.0
        } else {
            used_capacity / total_capacity * 100.0
        };

        Self {
            total_capacity,
            used_capacity,
            available_capacity: warehouses.iter().map(Warehouse::available_capacity).sum(),
            utilization_rate,
        }
    }
}

/// Clients allocated to the given warehouse.
pub fn clients_in_warehouse<'a>(clients: &'a [Client], warehouse_id: &str) -> Vec<&'a Client> {
    clients
        .iter()
        .filter(|client| client.warehouse_id == warehouse_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn growth_with_zero_total() {
        assert_eq!(growth_percentage(0, 0), "0.00%");
        assert_eq!(growth_percentage(7, 0), "0.00%");
    }

    #[test]
    fn growth_two_of_five() {
        assert_eq!(growth_percentage(2, 5), "40.00%");
        assert_eq!(growth_percentage(1, 3), "33.33%");
        assert_eq!(growth_percentage(5, 5), "100.00%");
    }

    #[test]
    fn delivered_tab_on_seed() {
        let orders = seed::orders();
        let delivered = filter_by_tab(&orders, "Delivered");
        assert_eq!(delivered.len(), 2);
        assert!(delivered.iter().all(|o| o.status == OrderStatus::Delivered));
    }

    #[test]
    fn all_tab_is_identity_and_unmapped_tabs_are_empty() {
        let orders = seed::orders();
        assert_eq!(filter_by_tab(&orders, ALL_ORDERS_TAB).len(), orders.len());
        assert!(filter_by_tab(&orders, "Dispatched").is_empty());
        assert!(filter_by_tab(&orders, "Return").is_empty());
    }

    #[test]
    fn order_stats_on_seed() {
        let stats = OrderStats::from_orders(&seed::orders());
        assert_eq!(
            stats,
            OrderStats {
                total: 5,
                dispatched: 1,
                delivered: 2,
                returns: 1,
            }
        );
        assert_eq!(stats.growth(stats.delivered), "40.00%");
        assert_eq!(stats.growth(stats.total), "100.00%");
    }

    #[test]
    fn status_counts_cover_every_status() {
        let counts = status_counts(&seed::orders());
        assert_eq!(counts.len(), 5);
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), 5);
        assert!(counts.contains(&(OrderStatus::Cancelled, 0)));
    }

    #[test]
    fn search_is_case_insensitive_over_two_fields() {
        let warehouses = seed::warehouses();
        let by_location = search(&warehouses, "SEATTLE");
        assert_eq!(by_location.len(), 1);
        assert_eq!(by_location[0].id, "1");

        let by_name = search(&warehouses, "distribution");
        assert_eq!(by_name.len(), 2);

        let clients = seed::clients();
        assert_eq!(search(&clients, "techstart.com").len(), 1);
        assert_eq!(search(&clients, "").len(), 3);
        assert!(search(&clients, "zzz").is_empty());
    }

    #[test]
    fn search_orders_by_number_or_client() {
        let orders = seed::orders();
        assert_eq!(search(&orders, "acme").len(), 2);
        assert_eq!(search(&orders, "#100005").len(), 1);
    }

    #[test]
    fn newest_order_first() {
        let orders = seed::orders();
        let sorted = sort_by_date_desc(&orders);
        assert_eq!(sorted[0].id, "3");
        assert_eq!(sorted[4].id, "4");
    }

    #[test]
    fn capacity_summary_of_seed() {
        let summary = CapacitySummary::from_warehouses(&seed::warehouses());
        assert_eq!(summary.total_capacity, 345000.0);
        assert_eq!(summary.used_capacity, 275000.0);
        assert_eq!(summary.available_capacity, 70000.0);
        assert!((summary.utilization_rate - 79.710_144_927_536_23).abs() < 1e-9);
        assert_eq!(CapacitySummary::from_warehouses(&[]).utilization_rate, 0.0);
    }

    #[test]
    fn clients_by_warehouse() {
        let clients = seed::clients();
        assert_eq!(clients_in_warehouse(&clients, "1").len(), 2);
        assert!(clients_in_warehouse(&clients, "4").is_empty());
    }
}
