use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use pocket_ledger::initialize_db;

/// A utility for creating a test database for the REST API server of pocket_ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
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

    let now = OffsetDateTime::now_utc();
    let today = now.date();

    println!("Creating contacts, loans and payments...");
    let contact_id: i64 = conn.query_row(
        "INSERT INTO contact (name, phone, email, created_at) VALUES (?1, ?2, ?3, ?4) RETURNING id",
        ("Aroha Ngata", "021 555 0199", "aroha@example.com", now),
        |row| row.get(0),
    )?;
    let loan_id: i64 = conn.query_row(
        "INSERT INTO loan (contact_id, amount, interest_rate, interest_type, start_date, due_date, status, notes, created_at)
         VALUES (?1, '5000', '6.5', 'simple', ?2, ?3, 'active', 'Car loan', ?4) RETURNING id",
        (
            contact_id,
            today - Duration::days(120),
            today + Duration::days(245),
            now,
        ),
        |row| row.get(0),
    )?;
    for days_ago in [90, 60, 30] {
        conn.execute(
            "INSERT INTO payment (loan_id, amount, payment_date, payment_method, created_at)
             VALUES (?1, '450', ?2, 'bank transfer', ?3)",
            (loan_id, today - Duration::days(days_ago), now),
        )?;
    }

    println!("Creating categories, transactions and budgets...");
    let mut category_ids = Vec::new();
    for (name, kind, limit) in [
        ("Salary", "income", "0"),
        ("Groceries", "expense", "600"),
        ("Transport", "expense", "200"),
        ("Entertainment", "expense", "150"),
    ] {
        let id: i64 = conn.query_row(
            "INSERT INTO category (name, type, budget_limit, created_at) VALUES (?1, ?2, ?3, ?4) RETURNING id",
            (name, kind, limit, now),
            |row| row.get(0),
        )?;
        category_ids.push(id);
    }

    for months_ago in 0..6 {
        let date = today - Duration::days(30 * months_ago);
        for (kind, amount, category, description) in [
            ("income", "4200", "Salary", "Monthly pay"),
            ("expense", "142.37", "Groceries", "Weekly shop"),
            ("expense", "118.90", "Groceries", "Weekly shop"),
            ("expense", "65", "Transport", "Fuel"),
            ("expense", "48.50", "Entertainment", "Cinema"),
        ] {
            conn.execute(
                "INSERT INTO \"transaction\" (type, amount, category, description, payment_method, transaction_date, created_at)
                 VALUES (?1, ?2, ?3, ?4, 'card', ?5, ?6)",
                (kind, amount, category, description, date, now),
            )?;
        }
    }

    for (category_id, name, amount) in [
        (category_ids[1], "Groceries", "600"),
        (category_ids[2], "Transport", "200"),
    ] {
        conn.execute(
            "INSERT INTO budget (category_id, name, amount, period, start_date, end_date, status, created_at)
             VALUES (?1, ?2, ?3, 'yearly', ?4, ?5, 'active', ?6)",
            (
                category_id,
                name,
                amount,
                today - Duration::days(180),
                today + Duration::days(185),
                now,
            ),
        )?;
    }

    println!("Creating borrowers and loan transactions...");
    for (name, given, received) in [("Wiremu", "800", "300"), ("Mere", "250", "250")] {
        let borrower_id: i64 = conn.query_row(
            "INSERT INTO borrower (name, contact, created_at) VALUES (?1, ?2, ?3) RETURNING id",
            (name, "021 555 0100", now),
            |row| row.get(0),
        )?;
        conn.execute(
            "INSERT INTO loan_transaction (borrower_id, type, amount, interest_rate, transaction_date, description, created_at)
             VALUES (?1, 'given', ?2, '5', ?3, 'Money Given', ?4)",
            (borrower_id, given, today - Duration::days(75), now),
        )?;
        conn.execute(
            "INSERT INTO loan_transaction (borrower_id, type, amount, interest_rate, transaction_date, description, created_at)
             VALUES (?1, 'received', ?2, '0', ?3, 'Money Received', ?4)",
            (borrower_id, received, today - Duration::days(20), now),
        )?;
    }

    println!("Success!");

    Ok(())
}
