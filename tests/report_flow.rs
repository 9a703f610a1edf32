//! End-to-end: funding sheet -> store -> reports, through the library and
//! through the interactive binary.

use funding_report::loader::load_funding_csv;
use funding_report::reports::{
    build_project_summaries, generate_detailed_report, generate_summary_report,
};
use funding_report::store::{DataStore, JsonFileRepository, Repository};
use funding_report::validate::{has_errors, validate_funding_rows};
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::TempDir;

const SHEET: &str = "\
项目名称,项目编码,所属区域,项目类别,建设单位,项目主管部门,概算批复金额,资金批复金额,批复日期,资金具体来源,资金性质,财预文号,经办人,经办处室,项目状态,备注
城市道路建设工程1期,2024A0001,市辖区,基础设施,市政府,交通局,8000,100,2024-01-10,地方-一般债券,地方,财预1号,张三,预算处,在建,
城市道路建设工程1期,2024A0001,市辖区,基础设施,市政府,交通局,8000,50,2024-02-10,中央-中央补助,中央,财预2号,张三,预算处,在建,
学校建设新建项目2期,2024B0002,新区,民生工程,区政府,教育局,3000,200,2024-03-01,省级-省级补助,省级,财预3号,李四,经建处,续建,
学校建设新建项目2期,2024B0002,新区,民生工程,区政府,教育局,3000,75.5,2024-03-15,中央-中央综合财力,中央,财预4号,李四,经建处,续建,
体育馆项目3期,2024C0003,新区,体育项目,国有企业,体育局,1200,300,2024-04-01,地方-土地出让金,地方,财预5号,王五,预算处,在建,备注
";

fn workspace() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    std::fs::write(dir.path().join("funding_arrangement.csv"), SHEET)
        .expect("failed to write sheet");
    dir
}

#[test]
fn sheet_to_store_to_reports() {
    let dir = workspace();
    let (rows, report) = load_funding_csv(dir.path().join("funding_arrangement.csv")).unwrap();
    assert_eq!(report.loaded_rows, 5);
    assert!(!has_errors(&validate_funding_rows(&rows)));

    let store_path = dir.path().join("store.json");
    let mut store = DataStore::open(JsonFileRepository::new(&store_path)).unwrap();
    store.set_funding_arrangement(rows).unwrap();

    let reloaded = JsonFileRepository::new(&store_path).load().unwrap();
    let records = &reloaded.funding_arrangement;

    let summaries = build_project_summaries(records);
    let p1 = summaries.get("2024A0001").unwrap();
    assert_eq!(p1.local_funding, 100.0);
    assert_eq!(p1.central_funding, 50.0);
    assert_eq!(p1.total_funding, 150.0);
    assert_eq!(p1.local_general_bonds, 100.0);
    assert_eq!(p1.central_subsidy, 50.0);

    let p2 = summaries.get("2024B0002").unwrap();
    assert_eq!(p2.central_funding, 75.5);
    assert_eq!(p2.provincial_subsidy, 200.0);

    let summary = generate_summary_report(records);
    let t = &summary.total_stats;
    assert_eq!(t.total_projects, 3);
    assert_eq!(t.total_budget, 12200.0);
    assert_eq!(t.total_funding, 725.5);
    for s in &summary.project_summaries {
        assert_eq!(
            s.total_funding,
            s.local_funding + s.central_funding + s.provincial_funding
        );
    }

    let areas: Vec<(&str, usize)> = summary
        .area_stats
        .iter()
        .map(|a| (a.area.as_str(), a.totals.project_count))
        .collect();
    assert_eq!(areas, vec![("市辖区", 1), ("新区", 2)]);
    assert_eq!(summary.category_stats.len(), 3);

    let detailed = generate_detailed_report(records);
    let d = &detailed.detailed_stats;
    assert_eq!(d.local_funding_details.total, t.total_local_funding);
    assert_eq!(d.central_funding_details.total, t.total_central_funding);
    assert_eq!(d.provincial_funding_details.total, t.total_provincial_funding);
    // Comprehensive fiscal capacity counts toward the central total only.
    let central_buckets = d.central_funding_details.budget_investment
        + d.central_funding_details.subsidy
        + d.central_funding_details.special_funds
        + d.central_funding_details.treasury_bonds
        + d.central_funding_details.ultra_long_treasury_bonds
        + d.central_funding_details.anti_epidemic_bonds;
    assert_eq!(d.central_funding_details.total - central_buckets, 75.5);
}

fn run_cli(dir: &TempDir, input: &str) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_funding_report"))
        .args(["--out-dir", "out"])
        .current_dir(dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start funding_report");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait")
}

#[test]
fn cli_refuses_reports_without_data() {
    let dir = TempDir::new().unwrap();
    let output = run_cli(&dir, "2\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No funding data stored"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn cli_loads_and_exports() {
    let dir = workspace();
    let output = run_cli(&dir, "1\n2\nN\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Stored 5 funding records"));
    assert!(stdout.contains("Projects: 3"));
    assert!(stdout.contains("Exiting the program."));

    let out = dir.path().join("out");
    for name in [
        "report_summary.csv",
        "report_detailed.csv",
        "report_area_stats.csv",
        "report_category_stats.csv",
        "report_digest.json",
    ] {
        assert!(out.join(name).exists(), "missing {}", name);
    }
    assert!(dir.path().join("city_construction_data.json").exists());
}

#[test]
fn cli_exports_stored_tables() {
    let dir = workspace();
    let output = run_cli(&dir, "1\n5\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("funding_arrangement_export.csv"));

    let (rows, report) =
        load_funding_csv(dir.path().join("out").join("funding_arrangement_export.csv")).unwrap();
    assert_eq!(report.parse_errors, 0);
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[3].funding_source, "中央-中央综合财力");
    assert!(!dir.path().join("out").join("key_projects_export.csv").exists());
}
