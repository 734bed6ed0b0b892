use giftdraw_core::db::open_db_in_memory;
use giftdraw_core::{
    ParticipantService, ParticipantServiceError, PurchaseAction, SqliteParticipantRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn service(conn: &Connection) -> ParticipantService<SqliteParticipantRepository<'_>> {
    ParticipantService::new(SqliteParticipantRepository::try_new(conn).unwrap())
}

#[test]
fn create_participant_trims_name_and_starts_empty() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let created = service.create_participant("  Ana  ").unwrap();
    assert_eq!(created.name, "Ana");
    assert!(created.wishlist.is_empty());
    assert_eq!(created.assigned_recipient, None);

    let listed = service.list_participants().unwrap();
    assert_eq!(listed, vec![created]);
}

#[test]
fn create_participant_requires_name() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.create_participant(" ").unwrap_err();
    assert!(matches!(err, ParticipantServiceError::Validation(_)));
    assert!(service.list_participants().unwrap().is_empty());
}

#[test]
fn add_wish_appends_exactly_one_unpurchased_item() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let ana = service.create_participant("Ana").unwrap();

    let updated = service.add_wish(ana.id, "wool socks").unwrap();
    assert_eq!(updated.wishlist.len(), 1);

    let reloaded = service.get_participant(ana.id).unwrap();
    assert_eq!(reloaded.wishlist.len(), 1);
    let item = &reloaded.wishlist[0];
    assert_eq!(item.text, "wool socks");
    assert!(!item.purchased);
    assert_eq!(item.purchased_by, None);
}

#[test]
fn add_wish_rejects_blank_text_and_unknown_owner() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let ana = service.create_participant("Ana").unwrap();

    let blank = service.add_wish(ana.id, "\t").unwrap_err();
    assert!(matches!(blank, ParticipantServiceError::Validation(_)));

    let ghost = Uuid::new_v4();
    let missing = service.add_wish(ghost, "book").unwrap_err();
    assert!(matches!(missing, ParticipantServiceError::ParticipantNotFound(id) if id == ghost));
}

#[test]
fn remove_wish_deletes_only_the_target_item() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let ana = service.create_participant("Ana").unwrap();
    service.add_wish(ana.id, "book").unwrap();
    let with_two = service.add_wish(ana.id, "lamp").unwrap();
    let book_id = with_two.wishlist[0].id;

    let updated = service.remove_wish(ana.id, book_id).unwrap();
    assert_eq!(updated.wishlist.len(), 1);
    assert_eq!(updated.wishlist[0].text, "lamp");

    let again = service.remove_wish(ana.id, book_id).unwrap_err();
    assert!(matches!(
        again,
        ParticipantServiceError::ItemNotFound { item_id, .. } if item_id == book_id
    ));
}

#[test]
fn buy_then_release_toggles_purchase_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let ana = service.create_participant("Ana").unwrap();
    let bruno = service.create_participant("Bruno").unwrap();
    let item_id = service.add_wish(ana.id, "book").unwrap().wishlist[0].id;

    let bought = service
        .set_purchase(ana.id, item_id, Some(bruno.id), PurchaseAction::Buy)
        .unwrap();
    assert!(bought.wishlist[0].purchased);
    assert_eq!(bought.wishlist[0].purchased_by, Some(bruno.id));

    let released = service
        .set_purchase(ana.id, item_id, None, PurchaseAction::Release)
        .unwrap();
    assert!(!released.wishlist[0].purchased);
    assert_eq!(released.wishlist[0].purchased_by, None);
    assert_eq!(service.get_participant(ana.id).unwrap(), released);
}

#[test]
fn release_ignores_who_bought_the_item() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let ana = service.create_participant("Ana").unwrap();
    let bruno = service.create_participant("Bruno").unwrap();
    let carla = service.create_participant("Carla").unwrap();
    let item_id = service.add_wish(ana.id, "book").unwrap().wishlist[0].id;
    service
        .set_purchase(ana.id, item_id, Some(bruno.id), PurchaseAction::Buy)
        .unwrap();

    let released = service
        .set_purchase(ana.id, item_id, Some(carla.id), PurchaseAction::Release)
        .unwrap();
    assert!(!released.wishlist[0].purchased);
    assert_eq!(released.wishlist[0].purchased_by, None);
}

#[test]
fn buy_requires_existing_buyer_and_item() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let ana = service.create_participant("Ana").unwrap();
    let bruno = service.create_participant("Bruno").unwrap();
    let item_id = service.add_wish(ana.id, "book").unwrap().wishlist[0].id;

    let no_buyer = service
        .set_purchase(ana.id, item_id, None, PurchaseAction::Buy)
        .unwrap_err();
    assert!(matches!(no_buyer, ParticipantServiceError::Validation(_)));

    let ghost = Uuid::new_v4();
    let unknown_buyer = service
        .set_purchase(ana.id, item_id, Some(ghost), PurchaseAction::Buy)
        .unwrap_err();
    assert!(matches!(unknown_buyer, ParticipantServiceError::BuyerNotFound(id) if id == ghost));

    let unknown_item = service
        .set_purchase(ana.id, Uuid::new_v4(), Some(bruno.id), PurchaseAction::Buy)
        .unwrap_err();
    assert!(matches!(unknown_item, ParticipantServiceError::ItemNotFound { .. }));

    let unknown_recipient = service
        .set_purchase(ghost, item_id, Some(bruno.id), PurchaseAction::Buy)
        .unwrap_err();
    assert!(matches!(
        unknown_recipient,
        ParticipantServiceError::ParticipantNotFound(id) if id == ghost
    ));

    let untouched = service.get_participant(ana.id).unwrap();
    assert!(!untouched.wishlist[0].purchased);
}

#[test]
fn purchase_action_uses_lowercase_wire_names() {
    let buy: PurchaseAction = serde_json::from_str("\"buy\"").unwrap();
    let release: PurchaseAction = serde_json::from_str("\"release\"").unwrap();
    assert_eq!(buy, PurchaseAction::Buy);
    assert_eq!(release, PurchaseAction::Release);
    assert!(serde_json::from_str::<PurchaseAction>("\"steal\"").is_err());
}
