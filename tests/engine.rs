use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::{
    Duration, OffsetDateTime,
    macros::{date, datetime},
};

use premium_recap::{
    Application, Catalog, Clock, DashboardOptions, DurationKind, FixedClock, Granularity,
    LIFETIME_END, Locale, NewSale, Period, RawSaleRecord, SaleRecord, Snapshot,
    SqliteRecordSource, build_dashboard, bucket_series, bucketize, create_application,
    create_sale, expiry_instant, filter_by_period, find_expired, find_expiring_soon,
    initialize_db, is_expiring_soon, load_snapshot, normalize, normalize_all, sort_buckets,
    summarize,
};

const ALL_PERIODS: [Period; 5] = [
    Period::Day,
    Period::Week,
    Period::Month,
    Period::Year,
    Period::All,
];

fn raw(
    id: i64,
    application_id: Option<i64>,
    sale_amount: i64,
    created_at: Option<&str>,
) -> RawSaleRecord {
    RawSaleRecord {
        id,
        application_id,
        sale_amount: Some(sale_amount),
        created_at: created_at.map(str::to_owned),
        ..Default::default()
    }
}

fn catalog() -> Catalog {
    Catalog::new(vec![
        Application {
            id: 1,
            display_name: "A".to_owned(),
        },
        Application {
            id: 2,
            display_name: "B".to_owned(),
        },
    ])
}

fn mixed_records() -> Vec<SaleRecord> {
    normalize_all(vec![
        raw(1, Some(1), 100_000, Some("2024-03-15T08:00:00+07:00")),
        raw(2, Some(2), 50_000, Some("2024-02-04T20:00:00+07:00")),
        raw(3, Some(1), 20_000, Some("2023-12-31T23:30:00+07:00")),
        raw(4, None, 75_000, None),
        raw(5, Some(2), 10_000, Some("2024-03-14T23:59:59+07:00")),
        raw(6, Some(1), 5_000, Some("not a date")),
        raw(7, Some(2), 1_000, Some("2024-03-14T17:30:00Z")),
        raw(8, Some(1), 40_000, Some("9999-12-31T23:00:00-05:00")),
        raw(9, Some(2), 2_500, Some("2024-03-09T00:00:00+07:00")),
    ])
}

#[test]
fn sum_is_conserved_for_every_period_and_granularity() {
    let records = mixed_records();
    let reference = datetime!(2024-03-15 12:00 +07:00);
    let locale = Locale::indonesian();

    for period in ALL_PERIODS {
        let filtered = filter_by_period(&records, period, reference);
        let expected: i64 = filtered.iter().map(|record| record.sale_amount).sum();

        for granularity in [Granularity::Day, Granularity::Month, Granularity::Year] {
            let series =
                bucket_series(filtered.iter().copied(), granularity, reference, &locale).unwrap();

            assert_eq!(
                series.total(),
                expected,
                "{period} bucketed by {granularity}"
            );
        }
    }
}

#[test]
fn filtering_twice_changes_nothing() {
    let records = mixed_records();
    let reference = datetime!(2024-03-15 12:00 +07:00);

    for period in ALL_PERIODS {
        let once = filter_by_period(&records, period, reference);
        let twice = filter_by_period(once.iter().copied(), period, reference);

        assert_eq!(once, twice);
    }
}

#[test]
fn sorted_buckets_follow_the_calendar() {
    let locale = Locale::indonesian();
    let reference = datetime!(2024-03-15 12:00 +07:00);
    let records = normalize_all(vec![
        raw(1, None, 1, Some("2024-05-01T00:00:00+07:00")),
        raw(2, None, 1, Some("2023-12-01T00:00:00+07:00")),
        raw(3, None, 1, Some("2024-01-15T00:00:00+07:00")),
        raw(4, None, 1, Some("2022-08-17T00:00:00+07:00")),
        raw(5, None, 1, Some("2024-10-01T00:00:00+07:00")),
        raw(6, None, 1, Some("2024-02-01T00:00:00+07:00")),
    ]);

    let months = bucket_series(&records, Granularity::Month, reference, &locale).unwrap();
    let years = bucket_series(&records, Granularity::Year, reference, &locale).unwrap();

    assert_eq!(
        months.labels(),
        vec![
            "Agu 2022", "Des 2023", "Jan 2024", "Feb 2024", "Mei 2024", "Okt 2024"
        ]
    );
    assert_eq!(years.labels(), vec!["2022", "2023", "2024"]);
}

#[test]
fn month_names_from_another_locale_are_rejected() {
    let reference = datetime!(2024-05-15 12:00 +07:00);
    let records = normalize_all(vec![raw(1, None, 1, Some("2024-05-01T00:00:00+07:00"))]);
    let buckets = bucketize(&records, Granularity::Month, reference, &Locale::indonesian());

    let result = sort_buckets(buckets, Granularity::Month, &Locale::english());

    assert!(matches!(
        result,
        Err(premium_recap::Error::UnknownMonthKey(key)) if key == "Mei 2024"
    ));
}

#[test]
fn empty_daily_series_has_a_week_of_zeros() {
    let reference = FixedClock(datetime!(2024-03-01 09:00 +07:00)).now();
    let locale = Locale::indonesian();

    let series = bucket_series(
        std::iter::empty::<&SaleRecord>(),
        Granularity::Day,
        reference,
        &locale,
    )
    .unwrap();

    assert_eq!(
        series.labels(),
        vec!["24/02", "25/02", "26/02", "27/02", "28/02", "29/02", "01/03"]
    );
    assert_eq!(series.values(), vec![0; 7]);
}

#[test]
fn expiry_window_bounds() {
    let reference = datetime!(2024-03-15 00:00 +07:00);
    let tick = Duration::nanoseconds(1);
    let horizon = 5;

    assert!(is_expiring_soon(reference, reference, horizon));
    assert!(!is_expiring_soon(reference - tick, reference, horizon));
    assert!(!is_expiring_soon(
        reference + Duration::days(5) + tick,
        reference,
        horizon
    ));

    let ending_today = normalize(RawSaleRecord {
        id: 1,
        period_end: Some("2024-03-15".to_owned()),
        ..Default::default()
    });
    let ending_yesterday = normalize(RawSaleRecord {
        id: 2,
        period_end: Some("2024-03-14".to_owned()),
        ..Default::default()
    });
    let records = [ending_today, ending_yesterday];

    assert_eq!(
        expiry_instant(date!(2024 - 03 - 15), reference.offset()),
        reference
    );
    let expiring: Vec<i64> = find_expiring_soon(&records, reference, horizon)
        .iter()
        .map(|record| record.id)
        .collect();
    let expired: Vec<i64> = find_expired(&records, reference)
        .iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(expiring, vec![1]);
    assert_eq!(expired, vec![2]);
}

#[test]
fn month_totals_and_all_time_series() {
    let reference = datetime!(2024-03-15 10:00 +07:00);
    let today = reference;
    let forty_days_ago = reference - Duration::days(40);
    let records = vec![
        sale_at(1, 100_000, today),
        sale_at(2, 50_000, forty_days_ago),
    ];
    let locale = Locale::english();

    let this_month = filter_by_period(&records, Period::Month, reference);
    let summary = summarize(this_month, &Catalog::default(), &locale);
    let everything = filter_by_period(&records, Period::All, reference);
    let series = bucket_series(everything, Granularity::Month, reference, &locale).unwrap();

    assert_eq!(summary.total_revenue, 100_000);
    assert_eq!(series.labels(), vec!["Feb 2024", "Mar 2024"]);
    assert_eq!(series.total(), 150_000);
}

#[test]
fn undated_sale_is_never_counted() {
    let records = normalize_all(vec![raw(1, Some(1), 75_000, None)]);
    let reference = datetime!(2024-03-15 10:00 +07:00);
    let locale = Locale::indonesian();

    for period in ALL_PERIODS {
        let filtered = filter_by_period(&records, period, reference);
        assert!(filtered.is_empty());
        assert_eq!(summarize(filtered, &catalog(), &locale).total_revenue, 0);
    }

    for granularity in [Granularity::Day, Granularity::Month, Granularity::Year] {
        let series = bucketize(&records, granularity, reference, &locale);
        assert_eq!(series.total(), 0);
    }
}

#[test]
fn most_frequent_application_wins() {
    let records = normalize_all(vec![
        raw(1, Some(1), 10_000, Some("2024-03-01T00:00:00+07:00")),
        raw(2, Some(2), 90_000, Some("2024-03-02T00:00:00+07:00")),
        raw(3, Some(1), 10_000, Some("2024-03-03T00:00:00+07:00")),
    ]);

    let summary = summarize(&records, &catalog(), &Locale::indonesian());

    assert_eq!(summary.top_category.name, "A");
    assert_eq!(summary.top_category.count, 2);
}

#[test]
fn lifetime_grant_never_expires() {
    let lifetime = normalize(RawSaleRecord {
        id: 1,
        period_start: Some("2024-03-01".to_owned()),
        duration_kind: Some("lifetime".to_owned()),
        duration_count: Some(1),
        ..Default::default()
    });
    assert_eq!(lifetime.period_end, Some(LIFETIME_END));
    let records = [lifetime];

    for reference in [
        datetime!(2024-03-15 10:00 +07:00),
        datetime!(2030-01-01 00:00 +07:00),
        datetime!(2099-12-20 00:00 +07:00),
    ] {
        assert!(find_expiring_soon(&records, reference, 5).is_empty());
        assert!(find_expired(&records, reference).is_empty());
    }
}

#[test]
fn dashboard_from_a_sqlite_database() {
    let conn = Connection::open_in_memory().unwrap();
    initialize_db(&conn).unwrap();
    let reference = datetime!(2024-03-15 10:00 +07:00);
    {
        let netflix = create_application("Netflix", &conn).unwrap();
        let spotify = create_application("Spotify", &conn).unwrap();
        create_sale(
            NewSale::build(55_000, date!(2024 - 02 - 17), (DurationKind::Monthly, 1))
                .application_id(Some(netflix.id))
                .cost_amount(35_000)
                .created_at(Some(reference - Duration::hours(1))),
            1,
            &conn,
        )
        .unwrap();
        create_sale(
            NewSale::build(20_000, date!(2024 - 01 - 10), (DurationKind::Monthly, 1))
                .application_id(Some(spotify.id))
                .created_at(Some(datetime!(2024-01-10 09:00 +07:00))),
            1,
            &conn,
        )
        .unwrap();
        create_sale(
            NewSale::build(99_000, date!(2024 - 03 - 01), (DurationKind::Monthly, 1)),
            2,
            &conn,
        )
        .unwrap();
    }
    let source = SqliteRecordSource::new(Arc::new(Mutex::new(conn)));

    let snapshot = load_snapshot(&source, 1);
    let view = build_dashboard(
        &snapshot,
        &DashboardOptions::default(),
        reference,
        &Locale::indonesian(),
    )
    .unwrap();

    assert_eq!(view.summary.total_revenue, 55_000);
    assert_eq!(view.summary.total_profit, 20_000);
    assert_eq!(view.summary.top_category.name, "Netflix");
    assert_eq!(view.series.labels(), vec!["Jan 2024", "Mar 2024"]);
    let expiring: Vec<i64> = view.expiring.iter().map(|record| record.id).collect();
    let expired: Vec<i64> = view.expired.iter().map(|record| record.id).collect();
    assert_eq!(expiring, vec![1]);
    assert_eq!(expired, vec![2]);
}

#[test]
fn empty_snapshot_gives_placeholder_summary() {
    let snapshot = Snapshot::new(Vec::new(), Catalog::default());

    let view = build_dashboard(
        &snapshot,
        &DashboardOptions {
            granularity: Granularity::Day,
            ..Default::default()
        },
        datetime!(2024-03-15 10:00 +07:00),
        &Locale::indonesian(),
    )
    .unwrap();

    assert_eq!(view.summary.top_category.name, "-");
    assert_eq!(view.summary.top_category.count, 0);
    assert_eq!(view.series.len(), 7);
    assert!(view.expiring.is_empty());
}

#[test]
fn creation_time_out_of_range_is_left_out_of_the_dashboard() {
    let records = normalize_all(vec![
        raw(1, Some(1), 100_000, Some("2024-03-15T08:00:00+07:00")),
        raw(2, Some(2), 40_000, Some("9999-12-31T23:00:00-05:00")),
    ]);
    let snapshot = Snapshot::new(records, catalog());
    let reference = datetime!(2024-03-15 12:00 +07:00);

    for granularity in [Granularity::Day, Granularity::Month, Granularity::Year] {
        let view = build_dashboard(
            &snapshot,
            &DashboardOptions {
                card_period: Period::All,
                granularity,
                ..Default::default()
            },
            reference,
            &Locale::indonesian(),
        )
        .unwrap();

        assert_eq!(view.summary.total_revenue, 100_000, "{granularity}");
        assert_eq!(view.series.total(), 100_000, "{granularity}");
    }
}

#[test]
fn very_large_amounts_saturate() {
    let records = normalize_all(vec![
        raw(1, Some(1), i64::MAX, Some("2024-03-15T08:00:00+07:00")),
        raw(2, Some(1), 1, Some("2024-03-15T09:00:00+07:00")),
    ]);
    let snapshot = Snapshot::new(records, catalog());

    let view = build_dashboard(
        &snapshot,
        &DashboardOptions {
            card_period: Period::Day,
            granularity: Granularity::Day,
            ..Default::default()
        },
        datetime!(2024-03-15 12:00 +07:00),
        &Locale::indonesian(),
    )
    .unwrap();

    assert_eq!(view.summary.total_revenue, i64::MAX);
    assert_eq!(view.summary.total_profit, i64::MAX);
    assert_eq!(view.series.get("15/03"), Some(i64::MAX));
    assert_eq!(view.series.total(), i64::MAX);
}

#[test]
fn daily_dashboard_spreads_the_week_over_its_buckets() {
    let records = normalize_all(vec![
        raw(1, Some(1), 100_000, Some("2024-03-15T08:00:00+07:00")),
        raw(2, Some(1), 10_000, Some("2024-03-14T08:00:00+07:00")),
        raw(3, Some(2), 20_000, Some("2024-03-12T08:00:00+07:00")),
        raw(4, Some(2), 5_000, Some("2024-03-08T23:59:59+07:00")),
    ]);
    let snapshot = Snapshot::new(records, catalog());

    let view = build_dashboard(
        &snapshot,
        &DashboardOptions {
            card_period: Period::Week,
            granularity: Granularity::Day,
            ..Default::default()
        },
        datetime!(2024-03-15 12:00 +07:00),
        &Locale::indonesian(),
    )
    .unwrap();

    assert_eq!(
        view.series.labels(),
        vec!["09/03", "10/03", "11/03", "12/03", "13/03", "14/03", "15/03"]
    );
    assert_eq!(
        view.series.values(),
        vec![0, 0, 0, 20_000, 0, 10_000, 100_000]
    );
    assert_eq!(view.summary.total_revenue, view.series.total());
}

fn sale_at(id: i64, sale_amount: i64, created_at: OffsetDateTime) -> SaleRecord {
    let mut record = normalize(RawSaleRecord {
        id,
        sale_amount: Some(sale_amount),
        ..Default::default()
    });
    record.created_at = Some(created_at);
    record
}
