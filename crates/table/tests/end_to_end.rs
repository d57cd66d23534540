use chrono::{Duration, NaiveDate};
use serde_json::json;
use tabula_core::{FieldDescriptor, PageSize, SortIndicator, TableConfig, Value};
use tabula_table::{locale_cmp, paginate, DataTable};

#[derive(Debug, Clone, PartialEq)]
struct Fruit {
    name: &'static str,
    qty: i64,
}

fn fruit_fields() -> Vec<FieldDescriptor<Fruit>> {
    vec![
        FieldDescriptor::new("name", "Name", |f: &Fruit| Value::from(f.name)),
        FieldDescriptor::new("qty", "Quantity", |f: &Fruit| Value::from(f.qty)),
    ]
}

fn fruit() -> Vec<Fruit> {
    vec![
        Fruit { name: "Apple", qty: 5 },
        Fruit { name: "Banana", qty: 10 },
        Fruit { name: "Cherry", qty: 1 },
    ]
}

fn names(rows: &[&Fruit]) -> Vec<&'static str> {
    rows.iter().map(|f| f.name).collect()
}

#[test]
fn sort_by_quantity_then_back_to_insertion_order() {
    let mut t = DataTable::new(fruit(), fruit_fields(), TableConfig::default()).unwrap();
    t.set_query("");
    t.click_sort("qty").unwrap();
    assert_eq!(names(&t.page().unwrap().rows), vec!["Cherry", "Apple", "Banana"]);
    assert_eq!(t.indicator("qty"), SortIndicator::Ascending);
    assert_eq!(t.indicator("name"), SortIndicator::Neutral);

    t.click_sort("qty").unwrap();
    assert_eq!(names(&t.page().unwrap().rows), vec!["Banana", "Apple", "Cherry"]);

    t.click_sort("name").unwrap();
    assert_eq!(names(&t.page().unwrap().rows), vec!["Apple", "Banana", "Cherry"]);
    t.click_sort("name").unwrap();
    t.click_sort("name").unwrap();
    assert_eq!(names(&t.processed().unwrap()), vec!["Apple", "Banana", "Cherry"]);
    assert_eq!(t.view().sort, None);
}

#[test]
fn typo_query_filters_to_the_fuzzy_match() {
    let mut t = DataTable::new(fruit(), fruit_fields(), TableConfig::default()).unwrap();
    t.set_query("Banan");
    assert_eq!(names(&t.processed().unwrap()), vec!["Banana"]);
    t.set_query("chery");
    assert_eq!(names(&t.processed().unwrap()), vec!["Cherry"]);
    // one character is not a filter
    t.set_query("z");
    assert_eq!(t.processed().unwrap().len(), 3);
}

#[test]
fn comma_grouped_numbers_match_plain_values() {
    let rows = vec![
        Fruit { name: "Durian", qty: 1250 },
        Fruit { name: "Elderberry", qty: 87 },
    ];
    let mut t = DataTable::new(rows, fruit_fields(), TableConfig::default()).unwrap();
    t.set_query(" 1,250 ");
    assert_eq!(names(&t.processed().unwrap()), vec!["Durian"]);
}

#[test]
fn json_records_sort_dates_chronologically() {
    let records = vec![
        json!({"id": "c", "due": "2024-03-01", "meta": {"owner": "Zoe"}}),
        json!({"id": "a", "due": "2023-12-31", "meta": {"owner": "amir"}}),
        json!({"id": "b", "due": "2024-01-15T08:00:00Z", "meta": {"owner": "Émile"}}),
    ];
    let fields = vec![
        FieldDescriptor::json("id", "ID"),
        FieldDescriptor::json("due", "Due"),
        FieldDescriptor::json("/meta/owner", "Owner"),
    ];
    let mut t = DataTable::new(records, fields, TableConfig::default()).unwrap();
    t.click_sort("due").unwrap();
    let ids: Vec<&str> = t.processed().unwrap().iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);

    t.click_sort("/meta/owner").unwrap();
    let owners: Vec<&str> = t.processed().unwrap().iter().map(|r| r["meta"]["owner"].as_str().unwrap()).collect();
    assert_eq!(owners, vec!["amir", "Émile", "Zoe"]);
}

#[test]
fn page_size_change_resets_to_first_page() {
    let rows: Vec<Fruit> = (0..45).map(|i| Fruit { name: "Fig", qty: i }).collect();
    let mut t = DataTable::new(rows, fruit_fields(), TableConfig::default()).unwrap();
    t.set_page(5);
    let p = t.page().unwrap();
    assert_eq!((p.rows.len(), p.total_pages), (5, 5));
    t.set_page_size(PageSize::Twenty);
    let p = t.page().unwrap();
    assert_eq!((p.page, p.rows.len(), p.total_pages), (1, 20, 3));
    t.set_page(4);
    assert!(t.page().unwrap().rows.is_empty());
}

#[test]
fn export_uses_current_view() {
    let mut t = DataTable::new(fruit(), fruit_fields(), TableConfig::default()).unwrap();
    t.click_sort("qty").unwrap();
    t.click_sort("qty").unwrap();
    let mut buf = Vec::new();
    t.export_csv(&mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "Name,Quantity\nBanana,10\nApple,5\nCherry,1\n");
}

#[test]
fn quantity_sort_in_pages_of_two() {
    let mut t = DataTable::new(fruit(), fruit_fields(), TableConfig::default()).unwrap();
    t.set_query("");
    t.click_sort("qty").unwrap();
    let rows = t.processed().unwrap();
    let first = paginate(rows.len(), 1, 2);
    assert_eq!(first.total_pages, 2);
    assert_eq!(names(&rows[first.range]), vec!["Cherry", "Apple"]);
    assert_eq!(names(&rows[paginate(rows.len(), 2, 2).range]), vec!["Banana"]);
    assert!(paginate(rows.len(), 3, 2).range.is_empty());
}

fn qty_text(r: &serde_json::Value) -> String {
    Value::from_json(&r["qty"]).to_text()
}

#[test]
fn numbers_mixed_with_numeric_strings_sort_as_text() {
    let records: Vec<serde_json::Value> = (0..500)
        .map(|i| {
            let n = (i * 7919) % 1000;
            if i % 2 == 0 { json!({"id": i, "qty": n}) } else { json!({"id": i, "qty": n.to_string()}) }
        })
        .collect();
    let fields = vec![FieldDescriptor::json("id", "ID"), FieldDescriptor::json("qty", "Qty")];
    let mut t = DataTable::new(records, fields, TableConfig::default()).unwrap();

    t.click_sort("qty").unwrap();
    let asc: Vec<String> = t.processed().unwrap().into_iter().map(qty_text).collect();
    assert_eq!(asc.len(), 500);
    assert!(asc.windows(2).all(|w| locale_cmp(&w[0], &w[1]).is_le()));

    t.click_sort("qty").unwrap();
    let desc: Vec<String> = t.processed().unwrap().into_iter().map(qty_text).collect();
    assert!(desc.windows(2).all(|w| locale_cmp(&w[0], &w[1]).is_ge()));
}

#[test]
fn mixed_date_layouts_sort_chronologically_until_free_text_appears() {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let due = |i: i64, pending: bool| {
        let d = base + Duration::days((i * 7) % 500);
        let layout = if pending { "%Y-%m pending" } else if i % 2 == 0 { "%Y-%m-%d" } else { "%Y/%m/%d" };
        json!({"id": i, "due": d.format(layout).to_string()})
    };
    let fields = || vec![FieldDescriptor::json("id", "ID"), FieldDescriptor::json("due", "Due")];
    let instant = |r: &serde_json::Value| Value::from_json(&r["due"]).as_instant();

    let dated: Vec<serde_json::Value> = (0..500).map(|i| due(i, false)).collect();
    let mut t = DataTable::new(dated, fields(), TableConfig::default()).unwrap();
    t.click_sort("due").unwrap();
    let rows = t.processed().unwrap();
    assert_eq!(rows.len(), 500);
    let instants: Vec<_> = rows.iter().map(|r| instant(*r).unwrap()).collect();
    assert!(instants.windows(2).all(|w| w[0] <= w[1]));

    t.set_records((0..500).map(|i| due(i, i % 5 == 0)).collect());
    let text: Vec<String> = t.processed().unwrap().iter().map(|r| r["due"].as_str().unwrap().to_string()).collect();
    assert_eq!(text.len(), 500);
    assert!(text.windows(2).all(|w| locale_cmp(&w[0], &w[1]).is_le()));
}
