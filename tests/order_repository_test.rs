//! sea-orm order store against in-memory SQLite.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::Utc;
use checkout_api::{
    db,
    entities::OrderStatus,
    errors::ServiceError,
    models::{DeliverySnapshot, Order, OrderItem, PaymentSummary, ShippingAddress},
    repositories::{OrderRepository, OrderStore},
};
use rust_decimal_macros::dec;
use uuid::Uuid;

async fn repository() -> OrderRepository {
    let pool = db::establish_connection("sqlite::memory:")
        .await
        .expect("connect");
    db::run_migrations(&pool).await.expect("migrate");
    OrderRepository::new(Arc::new(pool))
}

fn order(buyer: &str, intent: &str) -> Order {
    Order {
        id: Uuid::new_v4(),
        buyer_email: buyer.to_string(),
        order_date: Utc::now(),
        shipping_address: ShippingAddress {
            name: "Bob Bobbity".into(),
            line1: "10 The Street".into(),
            line2: None,
            city: "New York".into(),
            state: "NY".into(),
            postal_code: "90250".into(),
            country: "US".into(),
        },
        delivery_method: DeliverySnapshot {
            id: 2,
            short_name: "UPS2".into(),
            delivery_time: "2-5 Days".into(),
            price: dec!(5.00),
        },
        payment_summary: PaymentSummary {
            brand: "visa".into(),
            last4: "4242".into(),
            exp_month: 12,
            exp_year: 2030,
        },
        items: vec![
            OrderItem {
                product_id: 1,
                product_name: "Board".into(),
                picture_url: None,
                unit_price: dec!(19.99),
                quantity: 3,
            },
            OrderItem {
                product_id: 2,
                product_name: "Hat".into(),
                picture_url: Some("hat.png".into()),
                unit_price: dec!(10.00),
                quantity: 1,
            },
        ],
        subtotal: dec!(69.97),
        status: OrderStatus::Pending,
        payment_intent_id: intent.to_string(),
    }
}

#[tokio::test]
async fn saved_order_is_found_by_intent_with_lines() {
    let repo = repository().await;
    let saved = order("bob@test.com", "pi_1");
    repo.save(&saved).await.unwrap();

    let found = repo
        .find_by_payment_intent_id("pi_1", true)
        .await
        .unwrap()
        .expect("order exists");

    assert_eq!(found.id, saved.id);
    assert_eq!(found.items.len(), 2);
    assert_eq!(found.subtotal.round_dp(2), dec!(69.97));
    assert_eq!(found.total().round_dp(2), dec!(74.97));
    assert_eq!(found.status, OrderStatus::Pending);

    let header_only = repo
        .find_by_payment_intent_id("pi_1", false)
        .await
        .unwrap()
        .unwrap();
    assert!(header_only.items.is_empty());
}

#[tokio::test]
async fn second_order_for_the_same_intent_fails_and_leaves_no_lines() {
    let repo = repository().await;
    repo.save(&order("bob@test.com", "pi_1")).await.unwrap();

    let duplicate = order("bob@test.com", "pi_1");
    assert_matches!(
        repo.save(&duplicate).await,
        Err(ServiceError::PersistenceFailed(_))
    );

    assert_eq!(repo.find_by_buyer_email("bob@test.com").await.unwrap().len(), 1);
    assert!(repo
        .find_for_buyer("bob@test.com", duplicate.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn transition_only_applies_from_the_expected_status() {
    let repo = repository().await;
    let saved = order("bob@test.com", "pi_1");
    repo.save(&saved).await.unwrap();

    assert!(repo
        .transition_status(saved.id, OrderStatus::Pending, OrderStatus::PaymentReceived)
        .await
        .unwrap());
    assert!(!repo
        .transition_status(saved.id, OrderStatus::Pending, OrderStatus::PaymentMismatch)
        .await
        .unwrap());

    let found = repo
        .find_by_payment_intent_id("pi_1", false)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.status, OrderStatus::PaymentReceived);
}

#[tokio::test]
async fn orders_are_scoped_to_their_buyer() {
    let repo = repository().await;
    let bobs = order("bob@test.com", "pi_1");
    repo.save(&bobs).await.unwrap();
    repo.save(&order("alice@test.com", "pi_2")).await.unwrap();

    let listed = repo.find_by_buyer_email("bob@test.com").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].items.len(), 2);

    assert!(repo
        .find_for_buyer("alice@test.com", bobs.id)
        .await
        .unwrap()
        .is_none());
}
