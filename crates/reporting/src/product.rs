//! Product performance: category hierarchy, category metrics, regional top
//! categories and quarterly trends.

use crate::chart::{ChartKind, ChartSpec, PageReport};
use crate::controller::{present, require, resolve, PageController};
use novamart_analytics::{filter_eq, group_by, sort_by, top_n, Agg};
use novamart_core::{Column, ColumnAlias, ColumnKind, DashboardResult, Table, TableBundle, TableName, Value};
use serde::Deserialize;

const TOP_CATEGORIES: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductMetric {
    #[default]
    Sales,
    Units,
    ProfitMargin,
}

impl ProductMetric {
    fn label(&self) -> &'static str {
        match self {
            ProductMetric::Sales => "Sales",
            ProductMetric::Units => "Units",
            ProductMetric::ProfitMargin => "Profit Margin",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductSelections {
    pub metric: ProductMetric,
    pub region: Option<String>,
}

#[derive(Default)]
pub struct ProductPerformance;

impl ProductPerformance {
    fn hierarchy(&self, products: &Table) -> DashboardResult<Vec<ChartSpec>> {
        require(products, TableName::Products, &["category", "sales"])?;
        let margin = resolve(products, TableName::Products, ColumnAlias::ProfitMargin)?;

        let keys: &[&str] = if products.has_column("subcategory") {
            &["category", "subcategory"]
        } else {
            &["category"]
        };
        let sales = present(group_by(products, keys, "sales", Agg::Sum), TableName::Products, "sales")?;
        let margins = present(group_by(products, keys, margin, Agg::Mean), TableName::Products, margin)?;

        let text = |t: &Table, row: usize, col: &str| t.value(row, col).map(|v| v.to_string()).unwrap_or_default();
        let cell = |t: &Table, row: usize, col: &str| t.value(row, col).cloned().unwrap_or(Value::Missing);

        let mut parent = Vec::new();
        let mut label = Vec::new();
        let mut id = Vec::new();
        let mut sales_col = Vec::new();
        let mut margin_col = Vec::new();
        if keys.len() == 2 {
            // one root tile per category, leaves hang off it by id
            let roots = present(group_by(products, &["category"], "sales", Agg::Sum), TableName::Products, "sales")?;
            let root_margins = present(group_by(products, &["category"], margin, Agg::Mean), TableName::Products, margin)?;
            for r in 0..roots.height() {
                let category = text(&roots, r, "category");
                parent.push(String::new());
                label.push(category.clone());
                id.push(category);
                sales_col.push(cell(&roots, r, "sales"));
                margin_col.push(cell(&root_margins, r, margin));
            }
        }
        for r in 0..sales.height() {
            let category = text(&sales, r, "category");
            if keys.len() == 2 {
                let subcategory = text(&sales, r, "subcategory");
                id.push(format!("{category}_{subcategory}"));
                label.push(subcategory);
                parent.push(category);
            } else {
                parent.push(String::new());
                label.push(category.clone());
                id.push(category);
            }
            sales_col.push(cell(&sales, r, "sales"));
            margin_col.push(cell(&margins, r, margin));
        }

        let data = Table::try_new(vec![
            Column::texts("id", id),
            Column::texts("parent", parent),
            Column::texts("label", label),
            Column::new("sales", ColumnKind::Number, sales_col),
            Column::new(margin, ColumnKind::Number, margin_col),
        ])?;

        Ok(vec![ChartSpec::new(
            "product_hierarchy",
            ChartKind::Treemap,
            "Product Sales Hierarchy by Category and Margin",
            data,
        )
        .y("sales")
        .color(margin)
        .option("ids", "id")
        .option("labels", "label")
        .option("parents", "parent")])
    }

    fn category_metric(&self, products: &Table, metric: ProductMetric) -> DashboardResult<Vec<ChartSpec>> {
        require(products, TableName::Products, &["category", "sales"])?;
        let (column, agg) = match metric {
            ProductMetric::Sales => ("sales", Agg::Sum),
            ProductMetric::Units => {
                require(products, TableName::Products, &["units"])?;
                ("units", Agg::Sum)
            }
            ProductMetric::ProfitMargin => {
                (resolve(products, TableName::Products, ColumnAlias::ProfitMargin)?, Agg::Mean)
            }
        };
        let grouped = group_by(products, &["category"], column, agg).and_then(|t| sort_by(&t, column, true));
        let data = present(grouped, TableName::Products, column)?;

        Ok(vec![ChartSpec::new(
            "category_metric",
            ChartKind::Bar,
            format!("Category Performance by {}", metric.label()),
            data,
        )
        .x(column)
        .y("category")
        .color(column)
        .text(column)
        .horizontal()])
    }

    fn regional_top(&self, products: &Table, region: Option<&str>) -> DashboardResult<Vec<ChartSpec>> {
        require(products, TableName::Products, &["region", "category", "sales"])?;
        let scoped = match region {
            Some(r) => filter_eq(products, "region", &Value::from(r)),
            None => products.clone(),
        };
        let top = group_by(&scoped, &["category"], "sales", Agg::Sum).and_then(|t| top_n(&t, "sales", TOP_CATEGORIES));
        let data = present(top, TableName::Products, "sales")?;

        Ok(vec![ChartSpec::new(
            "regional_top_categories",
            ChartKind::Bar,
            format!("Top Categories by Sales - {}", region.unwrap_or("All Regions")),
            data,
        )
        .x("sales")
        .y("category")
        .color("sales")
        .text("sales")
        .horizontal()])
    }

    fn quarterly(&self, products: &Table) -> DashboardResult<Vec<ChartSpec>> {
        require(products, TableName::Products, &["quarter", "category", "sales"])?;
        let data = present(
            group_by(products, &["quarter", "category"], "sales", Agg::Sum),
            TableName::Products,
            "sales",
        )?;
        Ok(vec![ChartSpec::new("quarterly_sales", ChartKind::Line, "Quarterly Sales by Category", data)
            .x("quarter")
            .y("sales")
            .color("category")
            .option("markers", true)])
    }
}

impl PageController for ProductPerformance {
    type Selections = ProductSelections;

    fn render(&self, bundle: &TableBundle, selections: &ProductSelections) -> PageReport {
        let products = bundle.get(TableName::Products);
        let mut report = PageReport::new("product-performance");

        report.section("Product hierarchy", self.hierarchy(products));
        report.section("Category", self.category_metric(products, selections.metric));
        let region = selections.region.as_deref().filter(|r| *r != "All");
        report.section("Regional product", self.regional_top(products, region));
        report.section("Quarterly", self.quarterly(products));
        report
    }
}
