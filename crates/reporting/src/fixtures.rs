//! Small in-memory bundle shared by the page tests.

use chrono::NaiveDate;
use novamart_core::{Column, ColumnKind, Table, TableBundle, TableName, Value};
use std::collections::BTreeMap;

fn date(y: i32, m: u32, d: u32) -> Value {
    Value::from(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

pub fn campaigns() -> Table {
    Table::try_new(vec![
        Column::new(
            "date",
            ColumnKind::Date,
            vec![
                date(2023, 1, 2),
                date(2023, 1, 4),
                date(2023, 4, 10),
                date(2023, 11, 20),
                date(2024, 2, 5),
                date(2024, 2, 6),
            ],
        ),
        Column::texts("channel", ["Email", "Search", "Email", "Social", "Search", "Email"]),
        Column::texts("region", ["North", "South", "North", "South", "North", "South"]),
        Column::texts("campaign_type", ["Promo", "Brand", "Promo", "Brand", "Promo", "Promo"]),
        Column::numbers("revenue", [100.0, 200.0, 300.0, 400.0, 500.0, 600.0]),
        Column::numbers("conversions", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
        Column::numbers("roas", [2.0, 4.0, 3.0, 5.0, 2.5, 3.5]),
        Column::numbers("spend", [50.0, 50.0, 100.0, 80.0, 200.0, 150.0]),
    ])
    .unwrap()
}

pub fn customers() -> Table {
    Table::try_new(vec![
        Column::texts("customer_id", ["C1", "C2", "C3", "C4", "C5", "C6"]),
        Column::numbers("age", [23.0, 31.0, 38.0, 45.0, 52.0, 29.0]),
        Column::texts("segment", ["Budget", "Premium", "Premium", "Budget", "Regular", "Regular"]),
        Column::texts("region", ["North", "North", "South", "South", "North", "South"]),
        Column::texts("channel", ["Email", "Search", "Email", "Social", "Search", "Email"]),
        Column::optional_numbers(
            "lifetime_value",
            [Some(1000.0), Some(5000.0), Some(6000.0), None, Some(3000.0), Some(2500.0)],
        ),
        Column::numbers("income", [30000.0, 90000.0, 110000.0, 40000.0, 60000.0, 55000.0]),
        Column::numbers("satisfaction", [3.0, 9.0, 8.5, 5.0, 7.0, 6.5]),
        Column::numbers("nps", [4.0, 10.0, 9.0, 6.0, 7.0, 8.0]),
    ])
    .unwrap()
}

pub fn products() -> Table {
    Table::try_new(vec![
        Column::texts("category", ["Electronics", "Electronics", "Fashion", "Fashion", "Home"]),
        Column::texts("subcategory", ["Phones", "Laptops", "Shoes", "Shirts", "Decor"]),
        Column::texts("region", ["North", "South", "North", "South", "North"]),
        Column::texts("quarter", ["Q1", "Q2", "Q1", "Q2", "Q1"]),
        Column::numbers("sales", [1000.0, 1500.0, 800.0, 400.0, 300.0]),
        Column::numbers("units", [10.0, 5.0, 40.0, 30.0, 12.0]),
        Column::numbers("profit_margin", [0.1, 0.2, 0.35, 0.15, 0.3]),
    ])
    .unwrap()
}

pub fn leads() -> Table {
    Table::try_new(vec![
        Column::texts("lead_id", ["L1", "L2", "L3", "L4", "L5", "L6"]),
        Column::numbers("actual_converted", [1.0, 1.0, 0.0, 0.0, 1.0, 0.0]),
        Column::numbers("predicted_probability", [0.9, 0.7, 0.6, 0.2, 0.4, 0.1]),
        Column::numbers("predicted_class", [1.0, 1.0, 1.0, 0.0, 0.0, 0.0]),
    ])
    .unwrap()
}

pub fn feature_importance() -> Table {
    Table::try_new(vec![
        Column::texts("feature", ["email_opens", "page_views", "company_size", "industry"]),
        Column::numbers("importance", [0.12, 0.35, 0.28, 0.05]),
        Column::numbers("std", [0.01, 0.03, 0.02, 0.01]),
    ])
    .unwrap()
}

pub fn learning_curve() -> Table {
    Table::try_new(vec![
        Column::numbers("training_size", [100.0, 200.0, 400.0]),
        Column::numbers("training_score", [0.95, 0.9, 0.88]),
        Column::numbers("validation_score", [0.7, 0.78, 0.82]),
        Column::numbers("training_std", [0.02, 0.015, 0.01]),
    ])
    .unwrap()
}

pub fn geographic() -> Table {
    let states = [
        "Maharashtra", "Karnataka", "Delhi", "Tamil Nadu", "Gujarat", "Kerala", "Punjab",
        "Bihar", "Assam", "Goa", "Odisha", "Haryana",
    ];
    let revenue: Vec<f64> = (0..states.len()).map(|i| 1200.0 - i as f64 * 100.0).collect();
    let customers: Vec<f64> = (0..states.len()).map(|i| 50.0 + i as f64 * 3.0).collect();
    let penetration: Vec<f64> = (0..states.len()).map(|i| 0.05 * (i % 4 + 1) as f64).collect();
    let satisfaction: Vec<f64> = (0..states.len()).map(|i| 6.0 + (i % 5) as f64 * 0.5).collect();
    Table::try_new(vec![
        Column::texts("state", states),
        Column::numbers("revenue", revenue),
        Column::numbers("customers", customers),
        Column::numbers("market_penetration", penetration),
        Column::numbers("satisfaction", satisfaction),
    ])
    .unwrap()
}

pub fn attribution() -> Table {
    Table::try_new(vec![
        Column::texts("channel", ["Email", "Search", "Social", "Display"]),
        Column::numbers("first_touch", [20.0, 40.0, 30.0, 10.0]),
        Column::numbers("last_touch", [35.0, 45.0, 10.0, 10.0]),
        Column::numbers("linear", [25.0, 40.0, 20.0, 15.0]),
    ])
    .unwrap()
}

pub fn funnel() -> Table {
    Table::try_new(vec![
        Column::texts(
            "stage",
            ["Interest", "Awareness", "Loyalty", "Purchase", "Consideration"],
        ),
        Column::numbers("visitors", [6000.0, 10000.0, 500.0, 900.0, 3000.0]),
    ])
    .unwrap()
}

pub fn journey() -> Table {
    Table::try_new(vec![
        Column::texts("customer_id", ["C1", "C1", "C2"]),
        Column::texts("touchpoint", ["Email", "Search", "Social"]),
    ])
    .unwrap()
}

pub fn correlation() -> Table {
    Table::try_new(vec![
        Column::numbers("spend", [1.0, 0.8]),
        Column::numbers("revenue", [0.8, 1.0]),
    ])
    .unwrap()
    .with_index(vec!["spend".into(), "revenue".into()])
    .unwrap()
}

fn tables() -> BTreeMap<TableName, Table> {
    BTreeMap::from([
        (TableName::Campaigns, campaigns()),
        (TableName::Customers, customers()),
        (TableName::Products, products()),
        (TableName::Leads, leads()),
        (TableName::FeatureImportance, feature_importance()),
        (TableName::LearningCurve, learning_curve()),
        (TableName::Geographic, geographic()),
        (TableName::Attribution, attribution()),
        (TableName::Funnel, funnel()),
        (TableName::Journey, journey()),
        (TableName::Correlation, correlation()),
    ])
}

pub fn bundle() -> TableBundle {
    TableBundle::new(tables()).unwrap()
}

/// Full bundle with one table swapped out.
pub fn bundle_with(name: TableName, table: Table) -> TableBundle {
    let mut tables = tables();
    tables.insert(name, table);
    TableBundle::new(tables).unwrap()
}

/// A one-column table that matches nothing any page asks for.
pub fn unrelated() -> Table {
    Table::try_new(vec![Column::numbers("unrelated", [1.0, 2.0])]).unwrap()
}
