//! Seed the database with sample events and a demo student account so the
//! portal has something to show on a fresh install. Safe to re-run: it
//! exits early when events already exist.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;

use campus_events::config::Config;
use campus_events::models::event::{NewEvent, STATUS_ACTIVE};
use campus_events::models::student::NewStudent;
use campus_events::store::{PgStore, Store};
use campus_events::utils::password;

fn sample_events() -> Vec<NewEvent> {
    vec![
        NewEvent {
            title: "Tech Innovation Summit 2025".to_string(),
            description: "A day of cutting-edge technology discussions, workshops, and networking."
                .to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            duration: 8,
            location: "Main Auditorium".to_string(),
            category: "Technology".to_string(),
            capacity: 200,
            price: Decimal::new(150_000, 2),
            image: "https://images.unsplash.com/photo-1540575467063-178a50c2df87?w=500".to_string(),
            organizer: "Tech Club".to_string(),
            status: STATUS_ACTIVE.to_string(),
            tags: vec![
                "Technology".to_string(),
                "Innovation".to_string(),
                "Networking".to_string(),
            ],
        },
        NewEvent {
            title: "Cultural Diversity Festival".to_string(),
            description: "Celebrate the cultural diversity of our campus with performances and food."
                .to_string(),
            date: NaiveDate::from_ymd_opt(2025, 4, 20).unwrap(),
            time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            duration: 6,
            location: "Campus Grounds".to_string(),
            category: "Cultural".to_string(),
            capacity: 500,
            price: Decimal::ZERO,
            image: "https://images.unsplash.com/photo-1530103862676-de8c9debad1d?w=500".to_string(),
            organizer: "Cultural Committee".to_string(),
            status: STATUS_ACTIVE.to_string(),
            tags: vec!["Cultural".to_string(), "Festival".to_string()],
        },
        NewEvent {
            title: "Career Fair 2025".to_string(),
            description: "Connect with top companies and explore internship and job opportunities."
                .to_string(),
            date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            duration: 7,
            location: "Conference Center".to_string(),
            category: "Career".to_string(),
            capacity: 300,
            price: Decimal::new(80_000, 2),
            image: "https://images.unsplash.com/photo-1552664730-d307ca884978?w=500".to_string(),
            organizer: "Career Services".to_string(),
            status: STATUS_ACTIVE.to_string(),
            tags: vec!["Career".to_string(), "Jobs".to_string()],
        },
    ]
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));

    if store.count_events().await.expect("count failed") > 0 {
        tracing::info!("Events already present, nothing to seed");
        return;
    }

    for event in sample_events() {
        let created = store.insert_event(event).await.expect("seed event failed");
        tracing::info!(event_id = created.id, title = %created.title, "seeded event");
    }

    let demo = NewStudent {
        id: "1RV22CS001".to_string(),
        name: "Asha Rao".to_string(),
        email: "asha.rao@example.edu".to_string(),
        phone: "9876543210".to_string(),
        usn: "1RV22CS001".to_string(),
        semester: 4,
        branch: "Computer Science".to_string(),
        password_hash: password::hash("changeme123").expect("hash failed"),
        is_active: true,
    };
    match store.insert_student(demo).await {
        Ok(student) => tracing::info!(usn = %student.usn, "seeded demo student"),
        Err(e) => tracing::warn!("demo student not seeded: {e}"),
    }
}
