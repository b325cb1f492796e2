use super::*;
use crate::models::company::CompanyFilter;
use crate::models::job::JobFilter;
use crate::sql::sql;
use serde_json::json;

fn debug_values(clause: &WhereClause) -> Vec<String> {
    clause.params_ref().iter().map(|p| format!("{p:?}")).collect()
}

#[test]
fn company_filter_builds_all_predicates() {
    let filter: CompanyFilter = parse_filter(json!({
        "nameLike": "burton",
        "minEmployees": 400,
        "maxEmployees": 900,
    }))
    .unwrap();
    let clause = filter.where_clause().unwrap();

    assert_eq!(
        clause.build_clause(),
        "name ILIKE $1 AND num_employees >= $2 AND num_employees <= $3"
    );
    assert_eq!(debug_values(&clause), ["\"%burton%\"", "400", "900"]);
}

#[test]
fn unknown_key_is_rejected() {
    let err = parse_filter::<CompanyFilter>(json!({ "logo": "burton" })).unwrap_err();
    assert!(err.is_bad_request());
}

#[test]
fn ill_typed_value_is_rejected() {
    let err = parse_filter::<CompanyFilter>(json!({ "minEmployees": "lots" })).unwrap_err();
    assert!(err.is_bad_request());
}

#[test]
fn inverted_range_is_rejected() {
    let filter: CompanyFilter = parse_filter(json!({
        "minEmployees": 900,
        "maxEmployees": 400,
    }))
    .unwrap();
    let err = filter.where_clause().err().unwrap();
    assert!(err.is_bad_request());
    assert!(err.to_string().contains("minEmployees cannot be greater than maxEmployees"));
}

#[test]
fn equal_bounds_are_allowed() {
    let filter = CompanyFilter {
        min_employees: Some(5),
        max_employees: Some(5),
        ..Default::default()
    };
    assert_eq!(filter.where_clause().unwrap().len(), 2);
}

#[test]
fn empty_filter_renders_nothing() {
    let clause = CompanyFilter::default().where_clause().unwrap();
    assert!(clause.is_empty());
    assert_eq!(clause.build_clause(), "");

    let mut q = sql("SELECT handle FROM companies");
    clause.append_to(&mut q);
    assert_eq!(q.to_sql(), "SELECT handle FROM companies");
}

#[test]
fn raw_predicates_take_no_placeholder() {
    let mut clause = WhereClause::new();
    clause
        .and_contains("title", "eng")
        .and_raw("(equity IS NOT NULL AND equity > 0)")
        .and_gte("salary", 100_i32);

    assert_eq!(
        clause.build_clause(),
        "title ILIKE $1 AND (equity IS NOT NULL AND equity > 0) AND salary >= $2"
    );
    assert_eq!(clause.params_ref().len(), 2);

    let mut q = sql("SELECT id FROM jobs");
    clause.append_to(&mut q);
    q.push(" ORDER BY title");
    assert_eq!(
        q.to_sql(),
        "SELECT id FROM jobs WHERE title ILIKE $1 AND (equity IS NOT NULL AND equity > 0) AND salary >= $2 ORDER BY title"
    );
    assert_eq!(q.param_count(), 2);
}

#[test]
fn query_pairs_stay_text() {
    let value = parse_query_pairs([
        ("nameLike", "net"),
        ("minEmployees", "10"),
        ("hasEquity", "true"),
    ]);
    assert_eq!(
        value,
        json!({ "nameLike": "net", "minEmployees": "10", "hasEquity": "true" })
    );

    let filter: CompanyFilter =
        parse_filter(parse_query_pairs([("nameLike", "net"), ("maxEmployees", "50")])).unwrap();
    assert_eq!(filter.name_like.as_deref(), Some("net"));
    assert_eq!(filter.max_employees, Some(50));
}

#[test]
fn numeric_looking_names_stay_strings() {
    let filter: CompanyFilter = parse_filter(parse_query_pairs([("nameLike", "3")])).unwrap();
    assert_eq!(filter.name_like.as_deref(), Some("3"));

    let filter: JobFilter = parse_filter(parse_query_pairs([("title", "007")])).unwrap();
    let clause = filter.where_clause().unwrap();
    assert_eq!(clause.build_clause(), "title ILIKE $1");
    assert_eq!(debug_values(&clause), ["\"%007%\""]);
}

#[test]
fn numeric_and_flag_fields_parse_from_text() {
    let filter: JobFilter = parse_filter(parse_query_pairs([
        ("minSalary", " 150 "),
        ("hasEquity", "true"),
    ]))
    .unwrap();
    assert_eq!(filter.min_salary, Some(150));
    assert!(filter.has_equity);

    // Typed JSON still works.
    let typed: JobFilter = parse_filter(json!({ "minSalary": 150, "hasEquity": false })).unwrap();
    assert_eq!(typed.min_salary, Some(150));
    assert!(!typed.has_equity);

    for (key, text) in [("minSalary", "lots"), ("hasEquity", "yes"), ("minSalary", "1.5")] {
        let err = parse_filter::<JobFilter>(parse_query_pairs([(key, text)])).unwrap_err();
        assert!(err.is_bad_request(), "{key}={text}");
    }
}
