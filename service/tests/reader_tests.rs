//! Integration tests for the model reader

mod helpers;

use dezmap_core::error::MappingError;
use dezmap_core::types::{KeyKind, ResolutionWarning};
use dezmap_service::reader::SchemaReader;
use helpers::fixture_text;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_orders_model() {
    let model = SchemaReader::new()
        .parse(&fixture_text("orders.dez"))
        .unwrap();

    let names: Vec<_> = model.entity_names().collect();
    assert_eq!(names, vec!["Orders", "Customers"]);
    assert_eq!(model.attribute_count(), 7);
    assert!(model.warnings.is_empty());

    let orders = model.entity_by_name("Orders").unwrap();
    assert_eq!(orders.description.as_deref(), Some("Customer orders"));
    assert_eq!(orders.schema.as_deref(), Some("sales"));
    assert_eq!(
        orders.properties.get("01_source_database_1").map(String::as_str),
        Some("erp")
    );

    let order_id = orders.attribute_by_name("order_id").unwrap();
    assert_eq!(order_id.nullable, Some(false));
    assert_eq!(order_id.ordinal, 1);
    // UDP_U2 resolves through the property dictionary
    assert_eq!(
        order_id.properties.get("source_table").map(String::as_str),
        Some("erp.orders")
    );

    let amount = orders.attribute_by_name("amount").unwrap();
    assert_eq!(amount.nullable, Some(true));
    assert_eq!(amount.data_type, "DECIMAL(18,2)");
    let ts = orders.attribute_by_name("effective_start_ts").unwrap();
    assert_eq!(ts.nullable, None);

    assert!(orders.is_member_of(order_id.id, KeyKind::Primary));
    let fk = orders.keys_of(KeyKind::Foreign).next().unwrap();
    assert_eq!(fk.name, "FK_Orders_Customers");
    let customer_id = orders.attribute_by_name("customer_id").unwrap();
    assert_eq!(fk.members, vec![customer_id.id]);
    let reference = fk.reference.as_ref().unwrap();
    assert_eq!(reference.target_name.as_deref(), Some("Customers"));
    assert_eq!(reference.target_key.as_deref(), Some("PK_Customers"));
    assert!(!reference.is_dangling());

    assert_eq!(model.diagrams.len(), 1);
    assert_eq!(model.diagrams[0].name, "Sales");
    let customers = model.entity_by_name("Customers").unwrap();
    assert_eq!(model.diagrams[0].entities, vec![customers.id, orders.id]);
}

#[test]
fn test_dangling_foreign_key_is_kept() {
    let model = SchemaReader::new()
        .parse(&fixture_text("orders_dangling.dez"))
        .unwrap();

    assert_eq!(model.entities.len(), 1);
    let orders = &model.entities[0];
    let fk = orders.keys_of(KeyKind::Foreign).next().unwrap();
    assert!(fk.reference.as_ref().unwrap().is_dangling());
    assert_eq!(fk.members.len(), 1);
    assert_eq!(
        fk.warnings,
        vec![ResolutionWarning::DanglingForeignKey {
            key: "FK_Orders_Customers".to_string(),
            target: "E2".to_string(),
        }]
    );
}

#[test]
fn test_attribute_without_data_type() {
    let xml = r"<Model><DATADICT><ENTITIES>
        <ENT><ID>E1</ID><NAME>Orders</NAME><ATTRIBUTES>
          <ATTR><ID>A1</ID><NAME>order_id</NAME><DT><DTLISTNAME>INTEGER</DTLISTNAME></DT></ATTR>
          <ATTR><ID>A2</ID><NAME>broken</NAME></ATTR>
        </ATTRIBUTES></ENT>
    </ENTITIES></DATADICT></Model>";

    match SchemaReader::new().parse(xml).unwrap_err() {
        MappingError::Parse { message, location } => {
            assert!(message.contains("broken"));
            assert_eq!(location.as_deref(), Some("ENTITIES/ENT[1]/ATTRIBUTES/ATTR[2]"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_entity_without_name() {
    let xml = "<Model><DATADICT><ENTITIES><ENT><ID>E1</ID></ENT></ENTITIES></DATADICT></Model>";
    assert!(matches!(
        SchemaReader::new().parse(xml),
        Err(MappingError::Parse { location: Some(loc), .. }) if loc == "ENTITIES/ENT[1]"
    ));
}

#[test]
fn test_malformed_xml() {
    let xml = "<Model><DATADICT><ENTITIES></DATADICT></Model>";
    assert!(matches!(
        SchemaReader::new().parse(xml),
        Err(MappingError::Parse { .. })
    ));
}

#[test]
fn test_model_version_selection() {
    let entity = |name: &str| {
        format!(
            "<DATADICT><ENTITIES><ENT><ID>E1</ID><NAME>{name}</NAME></ENT></ENTITIES></DATADICT>"
        )
    };
    let xml = format!(
        "<Model>\
           <VERSION><VERSIONINFO><VERSIONNUMBER>1</VERSIONNUMBER></VERSIONINFO>{}</VERSION>\
           <VERSION>{}</VERSION>\
         </Model>",
        entity("Old"),
        entity("Current")
    );

    let current = SchemaReader::new().parse(&xml).unwrap();
    assert_eq!(current.entities[0].name, "Current");

    let old = SchemaReader::new().with_version("1").parse(&xml).unwrap();
    assert_eq!(old.entities[0].name, "Old");

    assert!(matches!(
        SchemaReader::new().with_version("7").parse(&xml),
        Err(MappingError::Parse { .. })
    ));
}

fn model_xml(attribute_counts: &[usize]) -> String {
    let mut xml = String::from("<Model><DATADICT><ENTITIES>");
    for (e, count) in attribute_counts.iter().enumerate() {
        xml.push_str(&format!("<ENT><ID>E{e}</ID><NAME>entity_{e}</NAME><ATTRIBUTES>"));
        for a in 0..*count {
            xml.push_str(&format!(
                "<ATTR><ID>E{e}A{a}</ID><NAME>col_{a}</NAME><DT><DTLISTNAME>VARCHAR(10)</DTLISTNAME></DT></ATTR>"
            ));
        }
        xml.push_str("</ATTRIBUTES></ENT>");
    }
    xml.push_str("</ENTITIES></DATADICT></Model>");
    xml
}

proptest! {
    #[test]
    fn prop_entity_count_matches_elements(counts in prop::collection::vec(0usize..6, 0..12)) {
        let model = SchemaReader::new().parse(&model_xml(&counts)).unwrap();
        prop_assert_eq!(model.entities.len(), counts.len());
        prop_assert_eq!(model.attribute_count(), counts.iter().sum::<usize>());
        for (entity, count) in model.entities.iter().zip(&counts) {
            prop_assert_eq!(entity.attributes.len(), *count);
        }
    }
}
