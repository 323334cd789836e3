//! Queries against a live PostgreSQL database.
//!
//! Run with `DATABASE_URL` set and `cargo test -p database -- --ignored`. Every test
//! works on customers whose names carry a fresh marker, so tests can share one
//! database and run in parallel.

use chrono::NaiveDate;
use configuration::DatabaseSettings;
use core_types::{Customer, InvoiceChanges, InvoiceStatus, NewInvoice};
use database::{DbRepository, SeedData, SeedInvoice, SeedUser, ITEMS_PER_PAGE};
use rust_decimal_macros::dec;
use uuid::Uuid;

async fn repository() -> DbRepository {
    let settings = DatabaseSettings {
        url: std::env::var("DATABASE_URL").unwrap(),
        ..DatabaseSettings::default()
    };
    let pool = database::connect(&settings).await.unwrap();
    database::run_migrations(&pool).await.unwrap();
    DbRepository::new(pool)
}

/// A unique marker that only this test's rows contain.
fn marker() -> String {
    format!("zz{}", Uuid::new_v4().simple())
}

fn customer(marker: &str, name: &str) -> Customer {
    Customer {
        id: Uuid::new_v4(),
        name: format!("{name} {marker}"),
        email: format!("{}.{marker}@example.com", name.to_lowercase()),
        image_url: "/customers/placeholder.png".to_string(),
    }
}

fn invoice(customer_id: Uuid, amount: i32, status: InvoiceStatus, day: u32) -> SeedInvoice {
    SeedInvoice {
        id: Uuid::new_v4(),
        customer_id,
        amount,
        status,
        date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
    }
}

/// Walks every page of a search and keeps one customer's `(amount, status)` rows.
async fn rows_for_customer(
    repo: &DbRepository,
    query: &str,
    customer_id: Uuid,
) -> Vec<(i32, InvoiceStatus)> {
    let pages = repo.fetch_invoices_pages(query).await.unwrap();
    let mut rows = Vec::new();
    for page in 1..=pages {
        rows.extend(
            repo.fetch_filtered_invoices(query, page)
                .await
                .unwrap()
                .into_iter()
                .filter(|row| row.customer_id == customer_id)
                .map(|row| (row.amount, row.status)),
        );
    }
    rows
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn filtered_invoices_paginate_newest_first() {
    let repo = repository().await;
    let marker = marker();
    let evil = customer(&marker, "Evil");
    let invoices = (1..=8)
        .map(|day| invoice(evil.id, 1000 * day as i32, InvoiceStatus::Paid, day))
        .collect();
    repo.seed(&SeedData {
        customers: vec![evil],
        invoices,
        ..SeedData::default()
    })
    .await
    .unwrap();

    let first = repo.fetch_filtered_invoices(&marker, 1).await.unwrap();
    let second = repo.fetch_filtered_invoices(&marker, 2).await.unwrap();
    let third = repo.fetch_filtered_invoices(&marker, 3).await.unwrap();

    assert_eq!(first.len() as i64, ITEMS_PER_PAGE);
    assert_eq!(second.len(), 2);
    assert!(third.is_empty());
    assert_eq!(first[0].date, NaiveDate::from_ymd_opt(2023, 1, 8).unwrap());
    assert!(first.windows(2).all(|w| w[0].date >= w[1].date));
    assert_eq!(repo.fetch_invoices_pages(&marker).await.unwrap(), 2);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn search_matches_status_email_amount_and_date() {
    let repo = repository().await;
    let marker = marker();
    let lee = customer(&marker, "Lee");
    let (lee_id, lee_email) = (lee.id, lee.email.clone());
    repo.seed(&SeedData {
        invoices: vec![
            invoice(lee.id, 500, InvoiceStatus::Pending, 2),
            invoice(lee.id, 700, InvoiceStatus::Paid, 3),
        ],
        customers: vec![lee],
        ..SeedData::default()
    })
    .await
    .unwrap();

    let ours = repo.fetch_filtered_invoices(&marker, 1).await.unwrap();
    assert_eq!(ours.len(), 2);

    let by_status = repo.fetch_filtered_invoices("PEN", 1).await.unwrap();
    assert!(by_status.iter().all(|row| {
        row.status == InvoiceStatus::Pending
            || format!("{} {}", row.name, row.email).to_lowercase().contains("pen")
    }));
    assert_eq!(
        rows_for_customer(&repo, "PEN", lee_id).await,
        vec![(500, InvoiceStatus::Pending)]
    );

    assert_eq!(
        rows_for_customer(&repo, &lee_email.to_uppercase(), lee_id).await,
        vec![(700, InvoiceStatus::Paid), (500, InvoiceStatus::Pending)]
    );
    assert_eq!(
        rows_for_customer(&repo, "500", lee_id).await,
        vec![(500, InvoiceStatus::Pending)]
    );
    assert_eq!(
        rows_for_customer(&repo, "2023-01-03", lee_id).await,
        vec![(700, InvoiceStatus::Paid)]
    );

    assert_eq!(repo.fetch_invoices_pages(&format!("{marker}-absent")).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn invoices_round_trip_through_the_edit_form() {
    let repo = repository().await;
    let marker = marker();
    let (amy, bob) = (customer(&marker, "Amy"), customer(&marker, "Bob"));
    repo.seed(&SeedData {
        customers: vec![amy.clone(), bob.clone()],
        ..SeedData::default()
    })
    .await
    .unwrap();

    let id = repo
        .insert_invoice(&NewInvoice {
            customer_id: amy.id,
            amount_cents: 1999,
            status: InvoiceStatus::Pending,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        })
        .await
        .unwrap();

    let form = repo.fetch_invoice_by_id(id).await.unwrap().unwrap();
    assert_eq!(form.customer_id, amy.id);
    assert_eq!(form.amount, dec!(19.99));
    assert_eq!(form.status, InvoiceStatus::Pending);

    let changed = repo
        .update_invoice(
            id,
            &InvoiceChanges {
                customer_id: bob.id,
                amount_cents: 5000,
                status: InvoiceStatus::Paid,
            },
        )
        .await
        .unwrap();
    assert_eq!(changed, 1);

    let row = &repo.fetch_filtered_invoices(&marker, 1).await.unwrap()[0];
    assert_eq!(row.name, bob.name);
    assert_eq!(row.amount, 5000);
    assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

    assert_eq!(repo.delete_invoice(id).await.unwrap(), 1);
    assert!(repo.fetch_invoice_by_id(id).await.unwrap().is_none());
    assert_eq!(repo.delete_invoice(id).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn customers_table_sums_by_status() {
    let repo = repository().await;
    let marker = marker();
    let (amy, bob) = (customer(&marker, "Amy"), customer(&marker, "Bob"));
    repo.seed(&SeedData {
        invoices: vec![
            invoice(amy.id, 15795, InvoiceStatus::Pending, 4),
            invoice(amy.id, 20348, InvoiceStatus::Pending, 5),
            invoice(amy.id, 3040, InvoiceStatus::Paid, 6),
        ],
        customers: vec![amy.clone(), bob.clone()],
        ..SeedData::default()
    })
    .await
    .unwrap();

    let rows = repo.fetch_filtered_customers(&marker.to_uppercase()).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, amy.name);
    assert_eq!(rows[0].total_invoices, 3);
    assert_eq!(rows[0].total_pending, "$361.43");
    assert_eq!(rows[0].total_paid, "$30.40");
    assert_eq!(rows[1].name, bob.name);
    assert_eq!(rows[1].total_invoices, 0);
    assert_eq!(rows[1].total_pending, "$0.00");

    let options = repo.fetch_customers().await.unwrap();
    assert!(options.iter().any(|c| c.id == bob.id));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn seeded_users_are_found_by_exact_email() {
    let repo = repository().await;
    let marker = marker();
    let email = format!("user.{marker}@nextmail.com");
    let seed = SeedData {
        users: vec![SeedUser {
            id: Uuid::new_v4(),
            name: "User".to_string(),
            email: email.clone(),
            password: "$argon2id$v=19$stub".to_string(),
        }],
        ..SeedData::default()
    };

    assert_eq!(repo.seed(&seed).await.unwrap().users, 1);
    assert_eq!(repo.seed(&seed).await.unwrap().users, 0);

    let user = repo.get_user(&email).await.unwrap().unwrap();
    assert_eq!(user.name, "User");
    assert!(repo.get_user(&email.to_uppercase()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn reseeding_skips_existing_invoices() {
    let repo = repository().await;
    let marker = marker();
    let amy = customer(&marker, "Amy");
    let seed = SeedData {
        invoices: vec![
            invoice(amy.id, 1200, InvoiceStatus::Paid, 9),
            invoice(amy.id, 3400, InvoiceStatus::Pending, 10),
        ],
        customers: vec![amy],
        ..SeedData::default()
    };

    let first = repo.seed(&seed).await.unwrap();
    assert_eq!((first.customers, first.invoices), (1, 2));

    let second = repo.seed(&seed).await.unwrap();
    assert_eq!((second.customers, second.invoices), (0, 0));
    assert_eq!(repo.fetch_filtered_invoices(&marker, 1).await.unwrap().len(), 2);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance via DATABASE_URL"]
async fn card_data_counts_every_invoice() {
    let repo = repository().await;
    let before = repo.fetch_card_data().await.unwrap();

    let marker = marker();
    let amy = customer(&marker, "Amy");
    repo.seed(&SeedData {
        invoices: vec![invoice(amy.id, 100, InvoiceStatus::Paid, 7)],
        customers: vec![amy],
        ..SeedData::default()
    })
    .await
    .unwrap();

    let after = repo.fetch_card_data().await.unwrap();
    assert!(after.number_of_invoices >= 1);
    assert!(after.number_of_customers > before.number_of_customers);
    assert!(after.total_paid_invoices.starts_with('$'));

    let latest = repo.fetch_latest_invoices().await.unwrap();
    assert!(latest.len() <= 5);
    assert!(latest.iter().all(|i| i.amount.starts_with('$')));
}
