use dtable_model::{ModelError, Row, Snapshot};
use dtable_stats::{
    group_statistics, label_display, DateGranularity, GroupLabel, GroupOptions, StatisticResult,
    StatisticsQuery, Summary, SummaryMethod,
};
use serde_json::json;

fn snapshot() -> Snapshot {
    Snapshot::from_json_str(
        &json!({
            "tables": [
                {
                    "_id": "t1",
                    "name": "Orders",
                    "columns": [
                        {"key": "0000", "name": "Item", "type": "text"},
                        {"key": "st", "name": "Stage", "type": "single-select",
                         "data": {"options": [
                             {"id": "o-new", "name": "New"},
                             {"id": "o-paid", "name": "Paid"},
                             {"id": "o-sent", "name": "Sent"}
                         ]}},
                        {"key": "tg", "name": "Tags", "type": "multiple-select",
                         "data": {"options": [
                             {"id": "x", "name": "gift"},
                             {"id": "y", "name": "rush"}
                         ]}},
                        {"key": "am", "name": "Amount", "type": "number"},
                        {"key": "dt", "name": "Ordered", "type": "date"},
                        {"key": "cu", "name": "Customer", "type": "link",
                         "data": {"table_id": "t1", "other_table_id": "t2"}},
                        {"key": "tx", "name": "Tax", "type": "formula",
                         "data": {"result_type": "number"}}
                    ],
                    "rows": [
                        {"_id": "r1", "0000": "Lamp", "st": "o-sent", "tg": ["x", "y"], "am": 10, "dt": "2021-01-15"},
                        {"_id": "r2", "0000": "Desk", "st": "o-new", "tg": ["y"], "am": 30, "dt": "2021-01-20"},
                        {"_id": "r3", "0000": "Chair", "st": "o-sent", "tg": [], "am": "n/a", "dt": "2021-03-02"},
                        {"_id": "r4", "0000": "Rug", "st": "o-stale", "am": 5}
                    ],
                    "views": [{"_id": "v1", "name": "Dated", "rows": ["r1", "r2", "r3"]}]
                },
                {
                    "_id": "t2",
                    "name": "Customers",
                    "columns": [{"key": "0000", "name": "Name", "type": "text"}],
                    "rows": [{"_id": "c1", "0000": "Ada"}, {"_id": "c2", "0000": "Lin"}]
                }
            ],
            "links": [
                {"_id": "l1", "table1_id": "t1", "table2_id": "t2",
                 "table1_table2_map": {"r1": ["c1"], "r2": ["c1", "c2"]},
                 "table2_table1_map": {"c1": ["r1", "r2"], "c2": ["r2"]}}
            ],
            "formula_results": {"t1": {
                "r1": {"tx": 1.5}, "r2": {"tx": 4.5}, "r3": {"tx": "x"}
            }}
        })
        .to_string(),
    )
    .unwrap()
}

fn run(snapshot: &Snapshot, query: &StatisticsQuery) -> Vec<StatisticResult> {
    let table = snapshot.get_table("Orders").unwrap();
    let rows: Vec<&Row> = table.rows().iter().collect();
    group_statistics(
        snapshot,
        table,
        &rows,
        snapshot.formula_results_for(&table.id),
        query,
    )
    .unwrap()
}

fn query(group_by: &str, summaries: Vec<Summary>) -> StatisticsQuery {
    StatisticsQuery {
        group_by: group_by.into(),
        summaries,
        ..StatisticsQuery::default()
    }
}

fn labels(results: &[StatisticResult]) -> Vec<Option<GroupLabel>> {
    results.iter().map(|result| result.label.clone()).collect()
}

fn text(s: &str) -> Option<GroupLabel> {
    Some(GroupLabel::Text(s.into()))
}

#[test]
fn test_single_select_groups_follow_option_order() {
    let snapshot = snapshot();
    let results = run(
        &snapshot,
        &query(
            "Stage",
            vec![
                Summary::advanced("Amount", SummaryMethod::Sum),
                Summary::advanced("Tax", SummaryMethod::Mean),
            ],
        ),
    );

    // the stale option id lands in the null group, which sorts first
    assert_eq!(labels(&results), vec![None, text("o-new"), text("o-sent")]);
    let counts: Vec<usize> = results.iter().map(|result| result.count).collect();
    assert_eq!(counts, vec![1, 1, 2]);

    let sent = &results[2];
    assert_eq!(sent.totals["am"], 10.0);
    assert_eq!(sent.totals["tx"], 1.5);
    assert_eq!(results[0].totals["tx"], 0.0);
}

#[test]
fn test_multiple_select_counts_row_in_each_group() {
    let snapshot = snapshot();
    let results = run(&snapshot, &query("Tags", vec![Summary::count("Item")]));

    assert_eq!(labels(&results), vec![None, text("x"), text("y")]);
    let counts: Vec<usize> = results.iter().map(|result| result.count).collect();
    assert_eq!(counts, vec![2, 1, 2]);
    assert_eq!(results[2].totals["0000"], 2.0);
}

#[test]
fn test_link_groups_by_linked_display_value() {
    let snapshot = snapshot();
    let results = run(&snapshot, &query("Customer", vec![]));
    assert_eq!(labels(&results), vec![None, text("Ada"), text("Lin")]);
    let counts: Vec<usize> = results.iter().map(|result| result.count).collect();
    assert_eq!(counts, vec![2, 2, 1]);
}

#[test]
fn test_date_groups_by_month_over_view() {
    let snapshot = snapshot();
    let table = snapshot.get_table("Orders").unwrap();
    let view = table.view_by_name("Dated").unwrap();
    let rows = table.view_rows(view);
    let query = StatisticsQuery {
        group_by: "Ordered".into(),
        options: GroupOptions {
            date_granularity: Some(DateGranularity::Month),
            geo_granularity: None,
        },
        summaries: vec![Summary::advanced("Amount", SummaryMethod::Max)],
    };

    let results = group_statistics(&snapshot, table, &rows, None, &query).unwrap();
    assert_eq!(labels(&results), vec![text("2021-01"), text("2021-03")]);
    assert_eq!(results[0].totals["am"], 30.0);
    // no numeric amount in March
    assert_eq!(results[1].totals["am"], 0.0);
}

#[test]
fn test_number_groups_and_display() {
    let snapshot = snapshot();
    let results = run(&snapshot, &query("Amount", vec![]));
    assert_eq!(
        labels(&results),
        vec![
            None,
            Some(GroupLabel::Number(5.0)),
            Some(GroupLabel::Number(10.0)),
            Some(GroupLabel::Number(30.0)),
        ]
    );

    let table = snapshot.get_table("Orders").unwrap();
    let stage = table.column_by_name("Stage").unwrap();
    assert_eq!(
        label_display(&snapshot, stage, &GroupLabel::Text("o-paid".into())),
        "Paid"
    );
}

#[test]
fn test_unknown_columns_are_errors() {
    let snapshot = snapshot();
    let table = snapshot.get_table("Orders").unwrap();
    let rows: Vec<&Row> = table.rows().iter().collect();

    let err = group_statistics(&snapshot, table, &rows, None, &query("Nope", vec![]));
    assert!(matches!(err, Err(ModelError::ColumnNotFound { .. })));

    let err = group_statistics(
        &snapshot,
        table,
        &rows,
        None,
        &query("Stage", vec![Summary::count("Nope")]),
    );
    assert!(matches!(err, Err(ModelError::ColumnNotFound { .. })));
}

#[test]
fn test_query_from_json() {
    let query: StatisticsQuery = serde_json::from_value(json!({
        "group_by": "Ordered",
        "date_granularity": "year",
        "summaries": [{"column": "Amount", "kind": "advanced", "method": "sum"}]
    }))
    .unwrap();
    assert_eq!(query.options.date_granularity, Some(DateGranularity::Year));
    assert_eq!(query.summaries, vec![Summary::advanced("Amount", SummaryMethod::Sum)]);

    let snapshot = snapshot();
    let results = run(&snapshot, &query);
    assert_eq!(labels(&results), vec![None, text("2021")]);
    assert_eq!(results[1].totals["am"], 40.0);
}
