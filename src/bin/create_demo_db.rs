use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration};

use premium_recap::{
    Clock, DurationKind, NewSale, SystemClock, create_application, create_sale, initialize_db,
};

/// A utility for creating a demo sales database for the recap tool.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The admin the demo sales belong to.
    #[arg(long, default_value_t = 1)]
    owner_id: i64,

    /// Canonical timezone the demo sales are entered in.
    #[arg(long, default_value = "Asia/Jakarta")]
    timezone: String,
}

const APPLICATIONS: [(&str, i64, i64); 5] = [
    ("Netflix", 35_000, 55_000),
    ("Spotify", 12_000, 20_000),
    ("YouTube Premium", 10_000, 18_000),
    ("Canva Pro", 8_000, 15_000),
    ("Disney+ Hotstar", 20_000, 35_000),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'sales.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'sales.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating applications...");
    let mut applications = Vec::with_capacity(APPLICATIONS.len());
    for (name, cost, price) in APPLICATIONS {
        applications.push((create_application(name, &conn)?, cost, price));
    }

    println!("Creating sales...");
    let now = SystemClock::for_timezone(&args.timezone)?.now();
    let durations = [
        (DurationKind::Monthly, 1),
        (DurationKind::Monthly, 3),
        (DurationKind::Weekly, 2),
        (DurationKind::Yearly, 1),
    ];

    for i in 0..60_i64 {
        let (application, cost, price) = &applications[(i as usize * 7) % applications.len()];
        let duration = durations[i as usize % durations.len()];
        let created_at = now - Duration::days((i * 13) % 420) - Duration::hours(i % 9);
        let period_start = created_at.date();
        let order_count = 1 + (i % 3) as u32;

        create_sale(
            NewSale::build(
                price * i64::from(order_count),
                period_start,
                duration,
            )
            .application_id(Some(application.id))
            .buyer_phone(&format!("0812{:08}", 1_000_000 + i * 4_271))
            .order_count(order_count)
            .cost_amount(cost * i64::from(order_count))
            .created_at(Some(created_at)),
            args.owner_id,
            &conn,
        )?;
    }

    // Subscriptions that end within the next few days.
    for days_left in 1..=3 {
        let (application, cost, price) = &applications[days_left as usize];
        create_sale(
            NewSale::build(
                *price,
                start_for_days_left(now.date(), days_left),
                (DurationKind::Daily, TRIAL_DAYS),
            )
                .application_id(Some(application.id))
                .buyer_phone("0857-0000-1111")
                .cost_amount(*cost)
                .created_at(Some(now - Duration::days(i64::from(TRIAL_DAYS) - days_left))),
            args.owner_id,
            &conn,
        )?;
    }

    let (canva, _, _) = &applications[3];
    create_sale(
        NewSale::build(150_000, now.date(), (DurationKind::Lifetime, 1))
            .application_id(Some(canva.id))
            .buyer_phone("0821-2222-3333")
            .cost_amount(90_000)
            .created_at(Some(now))
            .note(Some("lifetime")),
        args.owner_id,
        &conn,
    )?;

    println!("Creating legacy sales without timestamps...");
    create_sale(
        NewSale::build(25_000, now.date() - Duration::days(400), (DurationKind::Monthly, 1))
            .buyer_phone("0813-4444-5555"),
        args.owner_id,
        &conn,
    )?;
    conn.execute(
        "INSERT INTO sale (owner_id, sale_amount, order_count, created_at) VALUES (?1, 30000, 1, 'kemarin')",
        (args.owner_id,),
    )?;

    println!("Success!");

    Ok(())
}

const TRIAL_DAYS: u32 = 30;

/// The start date of a [TRIAL_DAYS] day subscription that ends `days_left`
/// days after `today`.
fn start_for_days_left(today: Date, days_left: i64) -> Date {
    today + Duration::days(days_left) - Duration::days(i64::from(TRIAL_DAYS))
}

#[cfg(test)]
mod tests {
    use time::{Duration, macros::date};

    use premium_recap::{DurationKind, compute_period_end};

    use super::{TRIAL_DAYS, start_for_days_left};

    #[test]
    fn subscriptions_end_the_requested_number_of_days_ahead() {
        for today in [
            date!(2024 - 01 - 29),
            date!(2024 - 01 - 31),
            date!(2024 - 02 - 28),
            date!(2024 - 03 - 30),
            date!(2023 - 12 - 31),
        ] {
            for days_left in 1..=3 {
                let start = start_for_days_left(today, days_left);

                assert_eq!(
                    compute_period_end(start, DurationKind::Daily, TRIAL_DAYS),
                    Some(today + Duration::days(days_left)),
                    "{today} + {days_left}"
                );
            }
        }
    }
}
