//! Fixed records written the first time a collection is read.

use chrono::{Duration, SecondsFormat, Utc};

use crate::models::{Client, Order, OrderStatus, PaymentMode, Warehouse};

fn warehouse(id: &str, name: &str, location: &str, total: u32, used: u32) -> Warehouse {
    Warehouse {
        id: id.to_string(),
        name: name.to_string(),
        location: location.to_string(),
        total_capacity: f64::from(total),
        used_capacity: f64::from(used),
    }
}

pub fn warehouses() -> Vec<Warehouse> {
    vec![
        warehouse("1", "North Seattle Warehouse", "Seattle, WA", 50000, 35000),
        warehouse("2", "Portland Distribution Center", "Portland, OR", 75000, 60000),
        warehouse("3", "Bay Area Facility", "San Francisco, CA", 100000, 95000),
        warehouse("4", "LA Distribution Hub", "Los Angeles, CA", 120000, 85000),
    ]
}

fn client(id: &str, name: &str, email: &str, allocated: u32, warehouse_id: &str) -> Client {
    Client {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        allocated_space: f64::from(allocated),
        warehouse_id: warehouse_id.to_string(),
    }
}

pub fn clients() -> Vec<Client> {
    vec![
        client("1", "Acme Corporation", "contact@acme.com", 15000, "1"),
        client("2", "TechStart Industries", "operations@techstart.com", 25000, "2"),
        client("3", "Global Logistics Co", "support@globallogistics.com", 35000, "1"),
    ]
}

struct OrderSeed {
    id: &'static str,
    client_id: &'static str,
    client_name: &'static str,
    days_ago: i64,
    amount: i32,
    payment_mode: PaymentMode,
    status: OrderStatus,
    warehouse_id: &'static str,
}

const ORDER_SEEDS: [OrderSeed; 5] = [
    OrderSeed {
        id: "1",
        client_id: "1",
        client_name: "Acme Corporation",
        days_ago: 2,
        amount: 35000,
        payment_mode: PaymentMode::Credit,
        status: OrderStatus::Delivered,
        warehouse_id: "1",
    },
    OrderSeed {
        id: "2",
        client_id: "2",
        client_name: "TechStart Industries",
        days_ago: 3,
        amount: 42000,
        payment_mode: PaymentMode::Upi,
        status: OrderStatus::Ongoing,
        warehouse_id: "2",
    },
    OrderSeed {
        id: "3",
        client_id: "3",
        client_name: "Global Logistics Co",
        days_ago: 1,
        amount: 28500,
        payment_mode: PaymentMode::Cod,
        status: OrderStatus::Accepted,
        warehouse_id: "1",
    },
    OrderSeed {
        id: "4",
        client_id: "1",
        client_name: "Acme Corporation",
        days_ago: 4,
        amount: 52300,
        payment_mode: PaymentMode::Credit,
        status: OrderStatus::Delivered,
        warehouse_id: "3",
    },
    // Client 4 does not exist in the client seed; the reference dangles.
    OrderSeed {
        id: "5",
        client_id: "4",
        client_name: "Summit Enterprises",
        days_ago: 2,
        amount: 18750,
        payment_mode: PaymentMode::Upi,
        status: OrderStatus::Rejected,
        warehouse_id: "2",
    },
];

/// Order dates are relative to the moment of seeding.
pub fn orders() -> Vec<Order> {
    let now = Utc::now();
    ORDER_SEEDS
        .iter()
        .map(|seed| Order {
            id: seed.id.to_string(),
            client_id: seed.client_id.to_string(),
            client_name: seed.client_name.to_string(),
            order_number: format!("#10000{}", seed.id),
            date: (now - Duration::days(seed.days_ago)).to_rfc3339_opts(SecondsFormat::Millis, true),
            amount: f64::from(seed.amount),
            payment_mode: seed.payment_mode,
            invoice_id: format!("C1000000{}", seed.id),
            status: seed.status,
            warehouse_id: seed.warehouse_id.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_sizes() {
        assert_eq!(warehouses().len(), 4);
        assert_eq!(clients().len(), 3);
        assert_eq!(orders().len(), 5);
    }

    #[test]
    fn order_seed_numbers_and_invoices() {
        let orders = orders();
        assert_eq!(orders[0].order_number, "#100001");
        assert_eq!(orders[4].invoice_id, "C10000005");
        assert!(orders.iter().all(|o| o.parsed_date().is_some()));
        assert!(orders[2].parsed_date() > orders[3].parsed_date());
    }
}
