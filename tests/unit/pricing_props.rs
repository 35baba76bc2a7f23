//! Property tests for pricing derivation.

use boxoffice_rs::boxoffice::pricing::{Discount, breakdown};
use boxoffice_rs::prelude::*;
use proptest::prelude::*;
use rust_decimal::Decimal;

fn arb_items() -> impl Strategy<Value = Vec<CartItem>> {
    prop::collection::vec(
        (1u32..=8, 1i64..=50_000).prop_map(|(quantity, price_cents)| CartItem {
            category_id: CategoryId::new(),
            quantity,
            unit_price: Decimal::new(price_cents, 2),
            max_quantity: 8,
        }),
        0..5,
    )
}

fn arb_promo() -> impl Strategy<Value = Option<PromoCode>> {
    let discount = prop_oneof![
        (0i64..=100).prop_map(|p| Discount::Percentage(Decimal::new(p, 0))),
        (0i64..=100_000).prop_map(|cents| Discount::Fixed(Decimal::new(cents, 2))),
    ];
    prop::option::of(
        (discount, prop::option::of(0i64..=50_000), prop::option::of(0i64..=10_000)).prop_map(
            |(discount, min_cents, cap_cents)| PromoCode {
                code: "PROP".to_string(),
                discount,
                min_purchase: min_cents.map(|c| Decimal::new(c, 2)),
                max_discount: cap_cents.map(|c| Decimal::new(c, 2)),
            },
        ),
    )
}

proptest! {
    #[test]
    fn prop_breakdown_is_deterministic(items in arb_items(), promo in arb_promo()) {
        let first = breakdown(&items, promo.as_ref());
        let second = breakdown(&items, promo.as_ref());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_total_is_never_negative(items in arb_items(), promo in arb_promo()) {
        let pricing = breakdown(&items, promo.as_ref());
        prop_assert!(pricing.total >= Decimal::ZERO);
    }

    #[test]
    fn prop_discount_never_exceeds_subtotal(items in arb_items(), promo in arb_promo()) {
        let pricing = breakdown(&items, promo.as_ref());
        prop_assert!(pricing.discount >= Decimal::ZERO);
        prop_assert!(pricing.discount <= pricing.subtotal);
    }

    #[test]
    fn prop_fees_are_never_negative(items in arb_items(), promo in arb_promo()) {
        let pricing = breakdown(&items, promo.as_ref());
        prop_assert!(pricing.service_fee >= Decimal::ZERO);
        prop_assert!(pricing.processing_fee >= Decimal::ZERO);
    }

    #[test]
    fn prop_components_sum_to_total(items in arb_items(), promo in arb_promo()) {
        let pricing = breakdown(&items, promo.as_ref());
        let summed = pricing.subtotal - pricing.discount
            + pricing.service_fee
            + pricing.processing_fee;
        prop_assert_eq!(pricing.total, summed.max(Decimal::ZERO));
    }

    #[test]
    fn prop_no_promo_means_no_discount(items in arb_items()) {
        let pricing = breakdown(&items, None);
        prop_assert_eq!(pricing.discount, Decimal::ZERO);
    }
}
