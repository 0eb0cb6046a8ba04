use chrono::NaiveDate;
use etf_flows::{
    config::{self, PipelineConfig, TotalPolicy},
    views::TabularView,
    Pipeline, PipelineError,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

/// Navigation table, a short summary table with dates, and the long daily table.
fn page() -> String {
    let mut body = String::from(
        r#"<html><body>
        <table><tr><th>Menu</th></tr><tr><td>Home</td></tr></table>
        <table><tr><th>Date</th><th>Note</th></tr>
          <tr><td>05 Jan 2024</td><td>1</td></tr>
          <tr><td>06 Jan 2024</td><td>2</td></tr></table>
        <table>
          <thead><tr><th>Date</th><th>IBIT</th><th>FBTC</th><th>Total</th></tr></thead>
          <tbody>"#,
    );
    body.push_str("<tr><td>01 Jan 2024</td><td>1,000</td><td>(200)</td><td>800</td></tr>");
    body.push_str("<tr><td>03 Jan 2024</td><td>500</td><td>n/a</td><td>999</td></tr>");
    body.push_str("<tr><td>04 Jan 2024</td><td>-</td><td>100.5*</td><td>100.5</td></tr>");
    body.push_str("<tr><td>Total</td><td>1,500</td><td>(99.5)</td><td>1,899.5</td></tr>");
    body.push_str("</tbody></table></body></html>");
    body
}

#[test]
fn test_recompute_end_to_end() {
    let pipeline = Pipeline::new(PipelineConfig {
        total_policy: TotalPolicy::Recompute,
        ..PipelineConfig::default()
    });
    let views = pipeline.run_html(&page()).unwrap();

    assert_eq!(views.wide.funds, vec!["IBIT", "FBTC"]);
    let dates: Vec<_> = views.wide.rows.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![day(1), day(2), day(3), day(4)]);

    let totals: Vec<_> = views.totals.rows.iter().map(|r| r.total).collect();
    assert_eq!(totals, vec![800.0, 0.0, 500.0, 100.5]);
    let cumulative: Vec<_> = views.totals.rows.iter().map(|r| r.cumulative).collect();
    assert_eq!(cumulative, vec![800.0, 800.0, 1300.0, 1400.5]);

    // long view: every fund of a date before the next date
    assert_eq!(views.long.rows.len(), 8);
    assert_eq!(views.long.rows[0].fund, "IBIT");
    assert_eq!(views.long.rows[1].fund, "FBTC");
    assert_eq!(views.long.rows[1].flow, -200.0);
    assert_eq!(views.long.rows[2].date, day(2));
}

#[test]
fn test_trust_site_keeps_published_total() {
    let views = Pipeline::new(PipelineConfig::default())
        .run_html(&page())
        .unwrap();
    let totals: Vec<_> = views.totals.rows.iter().map(|r| r.total).collect();
    assert_eq!(totals, vec![800.0, 0.0, 999.0, 100.5]);
}

#[test]
fn test_csv_views_agree_on_totals() {
    let views = Pipeline::new(PipelineConfig::default())
        .run_html(&page())
        .unwrap();
    let wide = views.wide.to_csv().unwrap();
    let mut lines = wide.lines();
    assert_eq!(lines.next(), Some("date,IBIT,FBTC,Total"));
    assert_eq!(lines.next(), Some("2024-01-01,1000,-200,800"));
    assert_eq!(lines.next(), Some("2024-01-02,0,0,0"));

    let totals = views.totals.to_csv().unwrap();
    assert!(totals.contains("2024-01-03,999,1799\n"));
}

#[test]
fn test_builtin_bitcoin_profile_runs() {
    let profile = config::builtin_profiles()
        .into_iter()
        .find(|p| p.name == "bitcoin")
        .unwrap();
    let views = Pipeline::new(profile.pipeline_config())
        .run_html(&page())
        .unwrap();
    assert_eq!(views.wide.rows.len(), 4);
}

#[test]
fn test_page_without_flow_table() {
    let err = Pipeline::new(PipelineConfig::default())
        .run_html("<html><body><table><tr><th>Menu</th></tr></table></body></html>")
        .unwrap_err();
    assert_eq!(err, PipelineError::TableNotFound);
}
