//! # Order splitter
//!
//! A guest's cart may span several independent sellers. Before anything is charged or persisted, the cart is split
//! into one group per seller, each with its own subtotal, service charge, tax and total. The split is
//! all-or-nothing: a single unresolvable line rejects the whole checkout.
//!
//! Totals are recomputed with [`OrderTotals::for_line_totals`] wherever lines change (here and in the line
//! mutation flow), so stored total fields can never drift from line contents.

use fcs_common::Money;

use crate::{
    db_types::{CartLine, GroupId},
    helpers::generate_group_id,
    traits::{CheckoutError, ResolvedItem},
};

/// Service charge applied to each seller group's subtotal.
pub const SERVICE_CHARGE_RATE: f64 = 0.05;
/// Tax applied to each seller group's subtotal.
pub const TAX_RATE: f64 = 0.18;

/// A cart line with its catalog data resolved: price snapshot, owning seller, display name.
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    pub menu_item_id: i64,
    pub seller_id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub note: Option<String>,
}

impl ResolvedLine {
    pub fn from_cart_line(line: &CartLine, item: &ResolvedItem) -> Self {
        Self {
            menu_item_id: item.menu_item_id,
            seller_id: item.seller_id,
            name: item.name.clone(),
            quantity: line.quantity,
            unit_price: item.price,
            note: line.note.clone(),
        }
    }

    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

//--------------------------------------     OrderTotals     ---------------------------------------------------------
/// The monetary components of one order: `total = subtotal + service_charge + tax`, each component rounded
/// independently to the smallest currency unit before summing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub service_charge: Money,
    pub tax: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Compute totals from the line totals of an order or group.
    pub fn for_line_totals<I: IntoIterator<Item = Money>>(line_totals: I) -> Self {
        let subtotal: Money = line_totals.into_iter().sum();
        let service_charge = subtotal.percentage(SERVICE_CHARGE_RATE);
        let tax = subtotal.percentage(TAX_RATE);
        let total = subtotal + service_charge + tax;
        Self { subtotal, service_charge, tax, total }
    }
}

//--------------------------------------     SellerGroup     ---------------------------------------------------------
/// The slice of one checkout belonging to a single seller. Becomes exactly one order at materialization.
#[derive(Debug, Clone)]
pub struct SellerGroup {
    pub seller_id: i64,
    pub lines: Vec<ResolvedLine>,
    pub totals: OrderTotals,
}

//--------------------------------------      CartSplit      ---------------------------------------------------------
/// The result of splitting a cart: one group per seller, in the order sellers were first encountered, plus the
/// combined amounts the guest will be charged.
#[derive(Debug, Clone)]
pub struct CartSplit {
    pub groups: Vec<SellerGroup>,
    /// Present only when the split produced more than one seller group.
    pub group_id: Option<GroupId>,
    pub item_count: i64,
    /// Sum of the per-group components. The combined total is the sum of per-group totals, each of which rounded
    /// its own charges, so this is what the payment intent must be opened for.
    pub combined: OrderTotals,
}

impl CartSplit {
    pub fn combined_total(&self) -> Money {
        self.combined.total
    }
}

/// Split resolved cart lines into per-seller groups with computed totals.
///
/// Seller iteration order in the output is deterministic: the order in which sellers were first encountered in
/// the cart. Fails with `UnresolvableItem` upstream (resolution happens before this call), `EmptyCart` for an
/// empty cart, and `InvalidQuantity` for quantities below 1.
pub fn split_cart(lines: Vec<ResolvedLine>) -> Result<CartSplit, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    if let Some(line) = lines.iter().find(|l| l.quantity < 1) {
        return Err(CheckoutError::InvalidQuantity(line.quantity));
    }
    let item_count = lines.iter().map(|l| l.quantity).sum();
    let mut groups: Vec<SellerGroup> = Vec::new();
    for line in lines {
        match groups.iter_mut().find(|g| g.seller_id == line.seller_id) {
            Some(group) => group.lines.push(line),
            None => {
                groups.push(SellerGroup { seller_id: line.seller_id, lines: vec![line], totals: OrderTotals::default() })
            },
        }
    }
    for group in &mut groups {
        group.totals = OrderTotals::for_line_totals(group.lines.iter().map(ResolvedLine::line_total));
    }
    let combined = OrderTotals {
        subtotal: groups.iter().map(|g| g.totals.subtotal).sum(),
        service_charge: groups.iter().map(|g| g.totals.service_charge).sum(),
        tax: groups.iter().map(|g| g.totals.tax).sum(),
        total: groups.iter().map(|g| g.totals.total).sum(),
    };
    let group_id = (groups.len() > 1).then(generate_group_id);
    Ok(CartSplit { groups, group_id, item_count, combined })
}

#[cfg(test)]
mod test {
    use super::*;

    fn line(seller_id: i64, item_id: i64, price: i64, qty: i64) -> ResolvedLine {
        ResolvedLine {
            menu_item_id: item_id,
            seller_id,
            name: format!("item-{item_id}"),
            quantity: qty,
            unit_price: Money::from(price),
            note: None,
        }
    }

    #[test]
    fn two_seller_cart_splits_into_two_groups() {
        // itemA(seller1, price 100, qty 2), itemB(seller2, price 50, qty 1)
        let split = split_cart(vec![line(1, 10, 100, 2), line(2, 20, 50, 1)]).unwrap();
        assert_eq!(split.groups.len(), 2);
        assert!(split.group_id.is_some());
        assert_eq!(split.item_count, 3);

        let g1 = &split.groups[0];
        assert_eq!(g1.seller_id, 1);
        assert_eq!(g1.totals.subtotal, Money::from(200));
        assert_eq!(g1.totals.service_charge, Money::from(10));
        assert_eq!(g1.totals.tax, Money::from(36));
        assert_eq!(g1.totals.total, Money::from(246));

        let g2 = &split.groups[1];
        assert_eq!(g2.seller_id, 2);
        assert_eq!(g2.totals.subtotal, Money::from(50));
        assert_eq!(g2.totals.service_charge, Money::from(3)); // round(2.5) away from zero
        assert_eq!(g2.totals.tax, Money::from(9));
        assert_eq!(g2.totals.total, Money::from(62));

        assert_eq!(split.combined_total(), Money::from(308));
    }

    #[test]
    fn single_seller_cart_has_no_group_id() {
        let split = split_cart(vec![line(7, 1, 120, 1), line(7, 2, 80, 2)]).unwrap();
        assert_eq!(split.groups.len(), 1);
        assert!(split.group_id.is_none());
        assert_eq!(split.groups[0].totals.subtotal, Money::from(280));
    }

    #[test]
    fn group_subtotals_sum_to_cart_subtotal() {
        let lines =
            vec![line(1, 1, 35, 3), line(2, 2, 120, 1), line(3, 3, 60, 2), line(1, 4, 15, 4), line(2, 5, 99, 1)];
        let cart_subtotal: Money = lines.iter().map(ResolvedLine::line_total).sum();
        let split = split_cart(lines).unwrap();
        assert_eq!(split.groups.len(), 3);
        let group_sum: Money = split.groups.iter().map(|g| g.totals.subtotal).sum();
        assert_eq!(group_sum, cart_subtotal);
        // Sellers appear in first-encounter order
        assert_eq!(split.groups.iter().map(|g| g.seller_id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn empty_cart_is_rejected() {
        assert!(matches!(split_cart(vec![]), Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let result = split_cart(vec![line(1, 1, 100, 0)]);
        assert!(matches!(result, Err(CheckoutError::InvalidQuantity(0))));
    }
}
