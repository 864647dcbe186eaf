//! End-to-end checks: sheet -> long -> wide, and the numeral converter
//! as the dashboard calls it.

use rmb_dashboard::{
    parse_rmb_upper, read_revenue_csv, reshape_revenue, to_long, to_rmb_upper, to_wide,
    DashboardContext, Month, NumeralError, ReshapeError, MONTHS_PER_YEAR,
};

const SHEET: &str = "\
公司,收入,一月,二月,三月,四月,五月,六月,七月,八月,九月,十月,十一月,十二月
华东分公司,7800000,100000,200000,300000,400000,500000,600000,700000,800000,900000,1000000,1100000,1200000
华南分公司,1230000.5,102500,102500,102500,102500,102500,102500,102500,102500,102500,102500,102500,102500.5
";

#[test]
fn sheet_reshapes_into_twelve_by_n_matrix() {
    let rows = read_revenue_csv(SHEET.as_bytes(), b',').expect("valid sheet");
    let report = reshape_revenue(&rows).expect("complete data");

    assert_eq!(report.long.len(), rows.len() * MONTHS_PER_YEAR);
    assert_eq!(report.wide.month_count(), 12);
    assert_eq!(report.wide.company_count(), rows.len());

    for row in &rows {
        for month in Month::ALL {
            assert_eq!(report.wide.get(month, &row.company), Some(row.month_value(month)));
        }
    }

    let (first_month, first_row) = report.wide.rows().next().expect("january row");
    assert_eq!(first_month, Month::January);
    assert_eq!(first_row, &[100000.0, 102500.0][..]);
}

#[test]
fn reshape_twice_is_bit_identical() {
    let rows = read_revenue_csv(SHEET.as_bytes(), b',').expect("valid sheet");
    let a = reshape_revenue(&rows).expect("first");
    let b = reshape_revenue(&rows).expect("second");

    assert_eq!(a, b);
    assert_eq!(a.digest(), b.digest());
    assert_eq!(
        serde_json::to_string(&a).expect("serialize"),
        serde_json::to_string(&b).expect("serialize")
    );
}

#[test]
fn dropping_one_entry_fails_the_pivot() {
    let rows = read_revenue_csv(SHEET.as_bytes(), b',').expect("valid sheet");
    let long: Vec<_> = to_long(&rows)
        .into_iter()
        .filter(|e| !(e.company == "华南分公司" && e.month == Month::October))
        .collect();

    assert_eq!(
        to_wide(&long),
        Err(ReshapeError::MissingDataPoint {
            company: "华南分公司".to_string(),
            month: 10,
        })
    );
}

#[test]
fn report_json_carries_month_indices() {
    let rows = read_revenue_csv(SHEET.as_bytes(), b',').expect("valid sheet");
    let report = reshape_revenue(&rows).expect("complete data");
    let json: serde_json::Value = serde_json::to_value(&report).expect("serialize");

    assert_eq!(json["long"][0]["month"], 1);
    assert_eq!(json["long"][11]["month"], 12);
    assert_eq!(json["wide"]["companies"][1], "华南分公司");
}

#[test]
fn numeral_reference_values() {
    let reference = [
        (0, "零"),
        (5, "伍"),
        (10, "拾"),
        (20, "贰拾"),
        (105, "壹佰零伍"),
        (1_000, "壹仟"),
        (10_000, "壹万"),
        (100_000_005, "壹亿零伍"),
        (123_456_789, "壹亿贰仟叁佰肆拾伍万陆仟柒佰捌拾玖"),
    ];
    for (value, expected) in reference {
        assert_eq!(to_rmb_upper(value).expect("in range"), expected);
        assert_eq!(parse_rmb_upper(expected).expect("parses"), value);
    }
}

#[test]
fn single_zero_across_empty_group() {
    let numeral = to_rmb_upper(100_000_005).expect("in range");
    assert_eq!(numeral.chars().filter(|&c| c == '零').count(), 1);
}

#[test]
fn converter_widget_behaviour() {
    let ctx = DashboardContext::default();
    assert_eq!(ctx.convert_input("20").expect("valid"), "贰拾");
    assert!(matches!(ctx.convert_input("twenty"), Err(NumeralError::InvalidInput(_))));
    assert_eq!(ctx.convert_amount("100.50").expect("valid"), "壹佰元伍角");
}
