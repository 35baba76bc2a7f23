//! End-to-end journeys through cart, checkout, gate, and refund.

use super::common::{AutoApprove, add_category, cart_with, engine};
use boxoffice_rs::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

struct OneCode(PromoCode);

impl PromoRules for OneCode {
    fn validate(
        &self,
        code: &str,
        _festival_id: Uuid,
        _subtotal: Decimal,
    ) -> Result<PromoCode, TicketingError> {
        if code == self.0.code {
            Ok(self.0.clone())
        } else {
            Err(TicketingError::UnknownPromoCode {
                code: code.to_string(),
            })
        }
    }
}

#[test]
fn test_full_attendee_journey() {
    let engine = engine();
    let ga = add_category(&engine, CategoryKind::GeneralAdmission, 5000, 100, 4);
    let camping = add_category(&engine, CategoryKind::Camping, 2500, 50, 2);
    let attendee = OwnerId::new();
    let now = current_time_millis();

    // Build a cart: two GA passes and a camping pitch, 10% off.
    let mut cart = Cart::new();
    cart.add_item(&ga, 2, 100, now);
    cart.add_item(&camping, 1, 50, now);
    let rules = OneCode(PromoCode {
        code: "EARLYBIRD".to_string(),
        discount: Discount::Percentage(Decimal::new(10, 0)),
        min_purchase: None,
        max_discount: None,
    });
    let quote = cart.apply_promo_code("EARLYBIRD", &rules, now).unwrap();
    // subtotal 125.00, discount 12.50
    assert_eq!(quote.subtotal, Decimal::new(12500, 2));
    assert_eq!(quote.discount, Decimal::new(1250, 2));

    // Purchase.
    let sale = engine.checkout(&mut cart, attendee, &AutoApprove).unwrap();
    assert_eq!(sale.ticket_count(), 3);
    assert_eq!(sale.pricing, quote);
    assert!(cart.is_empty());

    // The attendee sees all three tickets; a stranger sees none.
    assert_eq!(engine.tickets_for_owner(attendee).len(), 3);
    assert!(engine.tickets_for_owner(OwnerId::new()).is_empty());

    // Gate: camping ticket admits to the camping grounds, GA does not.
    let by_category: HashMap<CategoryId, &TicketSnapshot> = sale
        .tickets
        .iter()
        .map(|ticket| (ticket.category_id, ticket))
        .collect();
    let camping_ticket = by_category[&camping.id];
    let outcome = engine.scan(&camping_ticket.qr_token, Some(Zone::CampingGrounds));
    assert!(outcome.admitted);

    let ga_ticket = sale
        .tickets
        .iter()
        .find(|ticket| ticket.category_id == ga.id)
        .unwrap();
    let refused = engine.scan(&ga_ticket.qr_token, Some(Zone::CampingGrounds));
    assert!(!refused.admitted);

    // Refund the unused GA ticket; the used camping ticket is locked in.
    engine.cancel(ga_ticket.id, attendee).unwrap();
    assert!(engine.cancel(camping_ticket.id, attendee).is_err());
    assert_eq!(engine.sold(ga.id), Some(1));
    assert_eq!(engine.sold(camping.id), Some(1));
}

#[test]
fn test_cart_expiry_forces_requote() {
    let engine = engine();
    let category = add_category(&engine, CategoryKind::GeneralAdmission, 5000, 10, 4);

    let stale = current_time_millis() - CART_TTL_MILLIS - 60_000;
    let mut cart = Cart::new();
    cart.add_item(&category, 2, 10, stale);

    // Reported expired on read.
    assert!(cart.is_expired(current_time_millis()));

    // Rejected at checkout, cart cleared.
    let err = engine
        .checkout(&mut cart, OwnerId::new(), &AutoApprove)
        .unwrap_err();
    assert_eq!(err, TicketingError::CartExpired);
    assert!(cart.is_empty());

    // Re-quoting works immediately.
    cart.add_item(&category, 2, 10, current_time_millis());
    assert!(engine.checkout(&mut cart, OwnerId::new(), &AutoApprove).is_ok());
}

#[test]
fn test_quota_is_conserved_across_lifecycle() {
    let engine = engine();
    let category = add_category(&engine, CategoryKind::Vip, 12000, 2, 2);
    let buyer = OwnerId::new();

    let sale = engine
        .checkout(&mut cart_with(&engine, &category, 2), buyer, &AutoApprove)
        .unwrap();
    assert_eq!(engine.available(category.id), Some(0));

    // Use one, cancel the other.
    assert!(engine.scan(&sale.tickets[0].qr_token, None).admitted);
    engine.cancel(sale.tickets[1].id, buyer).unwrap();

    assert_eq!(engine.sold(category.id), Some(1));
    assert_eq!(engine.available(category.id), Some(1));

    // The freed unit is sellable again.
    assert!(
        engine
            .checkout(
                &mut cart_with(&engine, &category, 1),
                OwnerId::new(),
                &AutoApprove
            )
            .is_ok()
    );
    assert_eq!(engine.available(category.id), Some(0));
}

#[test]
fn test_snapshot_survives_mid_lifecycle() {
    let engine = engine();
    let category = add_category(&engine, CategoryKind::GeneralAdmission, 5000, 5, 4);
    let owner = OwnerId::new();
    let sale = engine
        .checkout(&mut cart_with(&engine, &category, 2), owner, &AutoApprove)
        .unwrap();
    assert!(engine.scan(&sale.tickets[0].qr_token, None).admitted);

    let package = BoxOfficeSnapshotPackage::new(engine.snapshot()).unwrap();
    let json = package.to_json().unwrap();
    let snapshot = BoxOfficeSnapshotPackage::from_json(&json)
        .unwrap()
        .into_snapshot()
        .unwrap();
    let restored = BoxOffice::restore(&snapshot, b"gate-secret").unwrap();

    // The used ticket stays used; the unused one stays scannable.
    assert!(!restored.scan(&sale.tickets[0].qr_token, None).admitted);
    assert!(restored.scan(&sale.tickets[1].qr_token, None).admitted);
    assert_eq!(restored.sold(category.id), Some(2));
}
