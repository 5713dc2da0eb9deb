use identity_core::models::*;
use identity_core::ContactId;

#[test]
fn request_accepts_string_fields() {
    let req: IdentifyRequest =
        serde_json::from_str(r#"{"email":"a@x.com","phoneNumber":"123456"}"#).unwrap();
    assert_eq!(req.email(), Some("a@x.com"));
    assert_eq!(req.phone_number(), Some("123456"));
    assert!(!req.is_blank());
}

#[test]
fn request_accepts_numeric_phone_number() {
    let req: IdentifyRequest = serde_json::from_str(r#"{"phoneNumber":123456}"#).unwrap();
    assert_eq!(req.phone_number(), Some("123456"));
    assert_eq!(req.email(), None);
}

#[test]
fn null_and_empty_fields_are_absent() {
    let req: IdentifyRequest =
        serde_json::from_str(r#"{"email":null,"phoneNumber":""}"#).unwrap();
    assert!(req.is_blank());

    let req: IdentifyRequest = serde_json::from_str("{}").unwrap();
    assert!(req.is_blank());
}

#[test]
fn response_uses_wire_field_names() {
    let response = IdentifyResponse::from(ConsolidatedView {
        primary_contact_id: ContactId::from("p1"),
        emails: vec!["a@x.com".into()],
        phone_numbers: vec!["111".into(), "222".into()],
        secondary_contact_ids: vec![ContactId::from("s1")],
    });
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["contact"]["primaryContactId"], "p1");
    assert_eq!(json["contact"]["phoneNumbers"][1], "222");
    assert_eq!(json["contact"]["secondaryContactIds"][0], "s1");
    assert_eq!(response.contact.cluster_size(), 2);
}
