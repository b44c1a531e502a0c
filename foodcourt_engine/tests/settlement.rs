mod support;

use fcs_common::Money;
use foodcourt_engine::{
    db_types::{FulfilmentType, SettlementStatus, TransferStatus},
    events::EventProducers,
    helpers::PaymentSignature,
    test_utils::prepare_env::{seed_menu_item, seed_seller},
    traits::FoodCourtDatabase,
    CheckoutApi,
    SettlementApi,
    SqliteDatabase,
};
use support::{cart_line, new_test_db, test_secret, TestGateway};

struct Fixture {
    checkout: CheckoutApi<SqliteDatabase, TestGateway>,
    settlement: SettlementApi<SqliteDatabase, TestGateway>,
    gateway: TestGateway,
}

async fn fixture() -> Fixture {
    let db = new_test_db().await;
    let gateway = TestGateway::new();
    let checkout = CheckoutApi::new(db.clone(), gateway.clone(), test_secret(), EventProducers::default());
    let settlement = SettlementApi::new(db, gateway.clone());
    Fixture { checkout, settlement, gateway }
}

impl Fixture {
    async fn paid_orders(&self, cart: &[foodcourt_engine::db_types::CartLine]) -> foodcourt_engine::order_objects::CheckoutResult {
        let intent = self.checkout.create_payment_intent(cart).await.unwrap();
        let sig = PaymentSignature::create(&intent.intent_id, "txn_settle", &test_secret());
        self.checkout.verify_and_materialize(&sig, cart, FulfilmentType::DineIn, None).await.unwrap()
    }
}

#[tokio::test]
async fn commission_is_rounded_half_away_from_zero() {
    let f = fixture().await;
    let seller = seed_seller(f.checkout.db(), "Biryani Hub", 0.10, Some("acct_biryani")).await;
    let item = seed_menu_item(f.checkout.db(), seller.id, "Chicken Biryani", 100).await;
    // subtotal 200, service charge 10, tax 36 -> total 246; commission 24.6 -> 25
    let result = f.paid_orders(&[cart_line(item.id, 2)]).await;
    let outcomes = f.settlement.settle_order_group(&result.orders, "txn_settle").await;

    assert_eq!(outcomes.len(), 1);
    let o = &outcomes[0];
    assert!(o.succeeded());
    assert_eq!(o.total, Money::from(246));
    assert_eq!(o.commission, Money::from(25));
    assert_eq!(o.transfer_amount, Money::from(221));
    assert_eq!(o.commission + o.transfer_amount, o.total);
    assert_eq!(o.transfer_status, TransferStatus::Success);
    assert_eq!(o.settlement_status, SettlementStatus::Completed);
    assert!(o.transfer_id.is_some());

    let order = f.checkout.db().fetch_order_by_number(&o.order_number).await.unwrap().unwrap();
    assert_eq!(order.commission, Some(Money::from(25)));
    assert_eq!(order.transfer_amount, Some(Money::from(221)));
    assert_eq!(order.transfer_status, TransferStatus::Success);
    assert_eq!(order.settlement_status, SettlementStatus::Completed);
    assert!(order.settled_at.is_some());
}

#[tokio::test]
async fn sellers_without_payout_accounts_are_flagged_for_manual_settlement() {
    let f = fixture().await;
    let seller = seed_seller(f.checkout.db(), "Cash Only Chaat", 0.10, None).await;
    let item = seed_menu_item(f.checkout.db(), seller.id, "Pani Puri", 60).await;
    let result = f.paid_orders(&[cart_line(item.id, 1)]).await;
    let outcomes = f.settlement.settle_order_group(&result.orders, "txn_settle").await;

    let o = &outcomes[0];
    assert!(!o.succeeded());
    assert!(o.error.is_none(), "a missing payout account is not an error");
    assert_eq!(o.transfer_status, TransferStatus::NotAttempted);
    assert_eq!(o.settlement_status, SettlementStatus::Pending);
    assert!(o.transfer_id.is_none());

    // The commission pair is still recorded for the manual run later.
    let order = f.checkout.db().fetch_order_by_number(&o.order_number).await.unwrap().unwrap();
    assert_eq!(order.commission, Some(o.commission));
    assert_eq!(order.transfer_amount, Some(o.transfer_amount));
    assert_eq!(order.transfer_status, TransferStatus::NotAttempted);
    assert!(order.settled_at.is_none());
}

#[tokio::test]
async fn one_failed_transfer_does_not_stop_the_siblings() {
    let f = fixture().await;
    let good = seed_seller(f.checkout.db(), "Good Grills", 0.10, Some("acct_good")).await;
    let bad = seed_seller(f.checkout.db(), "Flaky Falooda", 0.10, Some("acct_flaky")).await;
    let kebab = seed_menu_item(f.checkout.db(), good.id, "Seekh Kebab", 120).await;
    let falooda = seed_menu_item(f.checkout.db(), bad.id, "Royal Falooda", 90).await;
    f.gateway.block_destination("acct_flaky");

    let result = f.paid_orders(&[cart_line(kebab.id, 1), cart_line(falooda.id, 1)]).await;
    let outcomes = f.settlement.settle_order_group(&result.orders, "txn_settle").await;
    assert_eq!(outcomes.len(), 2);

    let good_outcome = outcomes.iter().find(|o| o.seller_id == good.id).unwrap();
    assert!(good_outcome.succeeded());
    assert_eq!(good_outcome.settlement_status, SettlementStatus::Completed);

    let bad_outcome = outcomes.iter().find(|o| o.seller_id == bad.id).unwrap();
    assert!(!bad_outcome.succeeded());
    assert_eq!(bad_outcome.transfer_status, TransferStatus::Failed);
    assert_eq!(bad_outcome.settlement_status, SettlementStatus::Pending);
    assert!(bad_outcome.error.as_deref().unwrap().contains("blocked"));

    let order = f.checkout.db().fetch_order_by_number(&bad_outcome.order_number).await.unwrap().unwrap();
    assert_eq!(order.transfer_status, TransferStatus::Failed);
    assert!(order.settled_at.is_none());
}

#[tokio::test]
async fn replayed_settlement_runs_do_not_move_money_twice() {
    let f = fixture().await;
    let seller = seed_seller(f.checkout.db(), "Momo Mia", 0.10, Some("acct_momo")).await;
    let item = seed_menu_item(f.checkout.db(), seller.id, "Steamed Momos", 80).await;
    let result = f.paid_orders(&[cart_line(item.id, 1)]).await;

    let first = f.settlement.settle_order_group(&result.orders, "txn_settle").await;
    assert!(first[0].succeeded());

    // A duplicate verification refetches the orders, now carrying the recorded settlement.
    let intent_id = result.orders[0].order.intent_id.clone().unwrap();
    let refreshed = f.checkout.db().fetch_orders_for_intent(&intent_id).await.unwrap();
    let second = f.settlement.settle_order_group(&refreshed, "txn_settle").await;
    assert!(second[0].succeeded());
    assert_eq!(second[0].transfer_id, first[0].transfer_id, "no second transfer may be issued");
}

#[tokio::test]
async fn commission_rates_are_per_seller() {
    let f = fixture().await;
    let cheap = seed_seller(f.checkout.db(), "Low Fee Noodles", 0.05, Some("acct_cheap")).await;
    let noodles = seed_menu_item(f.checkout.db(), cheap.id, "Hakka Noodles", 100).await;
    // subtotal 200 -> total 246; commission at 5% = 12.3 -> 12
    let result = f.paid_orders(&[cart_line(noodles.id, 2)]).await;
    let outcomes = f.settlement.settle_order_group(&result.orders, "txn_settle").await;
    assert_eq!(outcomes[0].commission, Money::from(12));
    assert_eq!(outcomes[0].transfer_amount, Money::from(234));
}
