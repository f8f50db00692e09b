use crate::models::Order;
use serde::Serialize;
use std::collections::HashMap;

/// All pending orders for one symbol plus the one worth showing first
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderGroup {
    pub symbol: String,
    pub best: Order,
    pub all: Vec<Order>, // insertion order
    pub count: usize,
}

impl OrderGroup {
    fn new(order: &Order) -> Self {
        Self {
            symbol: order.symbol.clone(),
            best: order.clone(),
            all: vec![order.clone()],
            count: 1,
        }
    }

    fn push(&mut self, order: &Order) {
        self.all.push(order.clone());
        self.count += 1;

        if order.outranks(&self.best) {
            self.best = order.clone();
        }
    }

    pub fn has_duplicates(&self) -> bool {
        self.count > 1
    }

    /// Every order of the group except the best one (matched by id)
    pub fn others(&self) -> impl Iterator<Item = &Order> {
        self.all.iter().filter(move |o| o.id != self.best.id)
    }
}

/// Orders grouped by symbol, iterated in first-seen symbol order
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct GroupedOrders {
    groups: Vec<OrderGroup>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl GroupedOrders {
    pub fn get(&self, symbol: &str) -> Option<&OrderGroup> {
        self.index.get(symbol).map(|&i| &self.groups[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrderGroup> {
        self.groups.iter()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.symbol.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Sum of group sizes; always equals the number of grouped orders
    pub fn total_orders(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }

    /// Groups holding more than one order for the same symbol
    pub fn duplicate_groups(&self) -> impl Iterator<Item = &OrderGroup> {
        self.groups.iter().filter(|g| g.has_duplicates())
    }
}

/// Group orders by symbol and pick the best order of each group.
///
/// Best is the highest confidence; on equal confidence the most recent
/// `created_at` wins, and exact ties keep the first order seen. Pure: the
/// same input always yields the same groups.
pub fn group_orders(orders: &[Order]) -> GroupedOrders {
    let mut grouped = GroupedOrders::default();

    for order in orders {
        match grouped.index.get(&order.symbol) {
            Some(&i) => grouped.groups[i].push(order),
            None => {
                grouped
                    .index
                    .insert(order.symbol.clone(), grouped.groups.len());
                grouped.groups.push(OrderGroup::new(order));
            }
        }
    }

    let duplicates = grouped.duplicate_groups().count();
    if duplicates > 0 {
        tracing::debug!(
            symbols = grouped.len(),
            duplicates,
            "Grouped pending orders with duplicate symbols"
        );
    }

    grouped
}
