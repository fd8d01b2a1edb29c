use device_inventory::pagination::{PAGE_SIZE, offset_for, total_pages};
use rusqlite::params;

use crate::common::*;

fn search(
    conn: &rusqlite::Connection,
    schema: DeviceSchema,
    term: Option<&str>,
    page: i64,
) -> (Vec<Device>, i64) {
    queries::search_devices(conn, schema, term, PAGE_SIZE, offset_for(page)).unwrap()
}

fn searchable_text(device: &Device, schema: DeviceSchema) -> Vec<String> {
    let mut fields = vec![
        device.serial_number.to_lowercase(),
        device.model.to_lowercase(),
        device.assigned_to.to_lowercase(),
    ];
    match schema {
        DeviceSchema::Asset => {
            fields.push(device.is_active.map(|a| a.to_string()).unwrap_or_default())
        }
        DeviceSchema::Team => {
            fields.push(device.device_type.clone().unwrap_or_default().to_lowercase());
            fields.push(device.team.clone().unwrap_or_default().to_lowercase());
        }
    }
    fields
}

#[test]
fn test_no_term_returns_first_page() {
    let conn = test_conn();
    seed(&conn, &numbered_devices(20));

    let (items, total) = search(&conn, DeviceSchema::Asset, None, 1);
    assert_eq!(total, 20);
    assert_eq!(items.len(), 15);

    let (items, _) = search(&conn, DeviceSchema::Asset, None, 2);
    assert_eq!(items.len(), 5);
    assert_eq!(items[0].serial_number, "SN-0016");
}

#[test]
fn test_every_result_contains_term() {
    let conn = test_conn();
    seed(
        &conn,
        &[
            asset_device("AB-100", "ThinkPad T14", "Giulia Bianchi", true),
            asset_device("CD-200", "MacBook Air", "Paolo", false),
            asset_device("EF-300", "Surface", "Tab Admin", true),
            asset_device("GH-400", "Latitude", "Bianca", false),
        ],
    );

    for term in ["bian", "PAD", "a", "300", "true", "false"] {
        let (items, total) = search(&conn, DeviceSchema::Asset, Some(term), 1);
        assert_eq!(items.len() as i64, total);
        for device in &items {
            let needle = term.to_lowercase();
            assert!(
                searchable_text(device, DeviceSchema::Asset)
                    .iter()
                    .any(|f| f.contains(&needle)),
                "{:?} does not contain {:?}",
                device,
                term
            );
        }
    }

    let (items, _) = search(&conn, DeviceSchema::Asset, Some("BIAN"), 1);
    let serials: Vec<_> = items.iter().map(|d| d.serial_number.as_str()).collect();
    assert_eq!(serials, vec!["AB-100", "GH-400"]);
}

#[test]
fn test_active_flag_is_searchable_as_text() {
    let conn = test_conn();
    seed(
        &conn,
        &[
            asset_device("SN-1", "X", "", true),
            asset_device("SN-2", "Y", "", false),
            asset_device("SN-3", "Z", "", true),
        ],
    );

    let (items, total) = search(&conn, DeviceSchema::Asset, Some("TRUE"), 1);
    assert_eq!(total, 2);
    assert!(items.iter().all(|d| d.is_active == Some(true)));
}

#[test]
fn test_missing_active_flag_matches_neither_word() {
    let conn = test_conn();
    seed(
        &conn,
        &[
            asset_device("SN-1", "ThinkPad", "Anna", false),
            team_device("SN-2", "Pixel", "Phone", "HR"),
        ],
    );

    let (items, total) = search(&conn, DeviceSchema::Asset, Some("false"), 1);
    assert_eq!(total, 1);
    assert_eq!(items[0].serial_number, "SN-1");

    let (_, total) = search(&conn, DeviceSchema::Asset, Some("true"), 1);
    assert_eq!(total, 0);
}

#[test]
fn test_non_ascii_letters_fold_case() {
    let conn = test_conn();
    seed(
        &conn,
        &[
            asset_device("SN-1", "Écran Dell", "Élodie", true),
            asset_device("SN-2", "Monitor", "Øyvind", false),
        ],
    );

    for term in ["écran", "ÉCRAN", "élodie", "ÉLODIE"] {
        let (items, total) = search(&conn, DeviceSchema::Asset, Some(term), 1);
        assert_eq!(total, 1, "term {:?}", term);
        assert_eq!(items[0].serial_number, "SN-1");
    }

    let (items, _) = search(&conn, DeviceSchema::Asset, Some("øyv"), 1);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].serial_number, "SN-2");
}

#[test]
fn test_team_schema_searches_type_and_team() {
    let conn = test_conn();
    seed(
        &conn,
        &[
            team_device("SN-1", "Pixel", "Phone", "Marketing"),
            team_device("SN-2", "XPS", "Laptop", "IT"),
            team_device("SN-3", "iPad", "Tablet", "Sales"),
        ],
    );

    let (items, _) = search(&conn, DeviceSchema::Team, Some("laptop"), 1);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].serial_number, "SN-2");

    let (items, _) = search(&conn, DeviceSchema::Team, Some("sales"), 1);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].serial_number, "SN-3");

    // The asset schema does not look at type or team
    let (items, _) = search(&conn, DeviceSchema::Asset, Some("laptop"), 1);
    assert!(items.is_empty());
}

#[test]
fn test_wildcard_characters_match_literally() {
    let conn = test_conn();
    seed(
        &conn,
        &[
            asset_device("SN_1", "X", "", true),
            asset_device("SN-2", "Y", "100%", true),
        ],
    );

    let (items, _) = search(&conn, DeviceSchema::Asset, Some("_"), 1);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].serial_number, "SN_1");

    let (items, _) = search(&conn, DeviceSchema::Asset, Some("%"), 1);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].serial_number, "SN-2");
}

#[test]
fn test_results_ordered_by_id_not_insertion() {
    let conn = test_conn();
    for id in [30_i64, 10, 20] {
        conn.execute(
            "INSERT INTO devices (id, serial_number, model, assigned_to, purchase_date, is_active)
             VALUES (?1, ?2, 'M', '', '2024-01-01', 1)",
            params![id, format!("SN-{}", id)],
        )
        .unwrap();
    }

    let (items, _) = search(&conn, DeviceSchema::Asset, None, 1);
    let ids: Vec<i64> = items.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![10, 20, 30]);
}

#[test]
fn test_total_pages_counts_filtered_rows() {
    let conn = test_conn();
    let mut devices = numbered_devices(40);
    for device in devices.iter_mut().take(16) {
        device.model = "Precision".into();
    }
    seed(&conn, &devices);

    let (_, total) = search(&conn, DeviceSchema::Asset, Some("precision"), 1);
    assert_eq!(total, 16);
    assert_eq!(total_pages(total), 2);

    let (items, _) = search(&conn, DeviceSchema::Asset, Some("precision"), 2);
    assert_eq!(items.len(), 1);

    let (items, total) = search(&conn, DeviceSchema::Asset, Some("precision"), 3);
    assert!(items.is_empty());
    assert_eq!(total, 16);
}

#[test]
fn test_no_matches() {
    let conn = test_conn();
    seed(&conn, &numbered_devices(5));

    let (items, total) = search(&conn, DeviceSchema::Asset, Some("nothing-like-this"), 1);
    assert!(items.is_empty());
    assert_eq!(total, 0);
    assert_eq!(total_pages(total), 0);
}
