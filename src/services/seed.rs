//! Synthetic user generation for populating the store

use crate::model::user::{NewUser, LANGUAGES};
use crate::services::store::{StoreError, UserStore};
use chrono::{DateTime, Duration, Utc};
use log::info;
use rand::seq::IndexedRandom;
use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Amy", "Bob", "Bruno", "Carla", "Chen", "Dalia", "Emil", "Fatima", "Gustav", "Hana",
    "Ivan", "Joanna", "John", "Karim", "Lena", "Maya", "Nils", "Olga", "Pedro", "Quinn", "Rosa",
    "Sami", "Tariq", "Uma", "Viktor", "Wen", "Yusuf", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Andersen", "Benali", "Carvalho", "Dubois", "Eriksen", "Fischer", "Garcia", "Haddad", "Ito",
    "Jensen", "Kowalski", "Lopez", "Moreau", "Novak", "Okafor", "Petrov", "Rossi", "Sato",
    "Tanaka", "Weber",
];

const COUNTRIES: &[&str] = &[
    "Norway", "Portugal", "China", "United Arab Emirates", "Czechia", "Nigeria", "Sweden", "Japan",
    "Germany", "France", "Algeria", "Spain", "Brazil", "Canada",
];

const CITIES: &[&str] = &[
    "Oslo", "Lisbon", "Shanghai", "Dubai", "Prague", "Lagos", "Stockholm", "Osaka", "Berlin",
    "Lyon", "Algiers", "Madrid", "Recife", "Toronto",
];

const STREETS: &[&str] = &["Maple", "Harbor", "Station", "Mill", "Church", "Park", "Bridge", "King"];

const COMPANIES: &[&str] = &[
    "Northwind Traders", "Contoso Ltd", "Fabrikam Inc", "Tailspin Toys", "Wide World Importers",
    "Adventure Works", "Litware Inc", "Proseware",
];

const DOMAINS: &[&str] = &["example.com", "mail.example", "inbox.example", "post.example"];

fn pick<'a, R: Rng>(rng: &mut R, items: &'a [&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// One synthetic user. `serial` keeps generated emails unique.
pub fn fake_user<R: Rng>(rng: &mut R, serial: usize, now: DateTime<Utc>) -> (NewUser, DateTime<Utc>) {
    let first = pick(rng, FIRST_NAMES);
    let last = pick(rng, LAST_NAMES);
    let email = format!(
        "{}.{}{}@{}",
        first.to_lowercase(),
        last.to_lowercase(),
        serial,
        pick(rng, DOMAINS)
    );

    let user = NewUser {
        name: format!("{} {}", first, last),
        email,
        phone: Some(format!(
            "+{} {:03} {:03} {:04}",
            rng.random_range(1..99),
            rng.random_range(100..999),
            rng.random_range(100..999),
            rng.random_range(0..9999)
        )),
        address: Some(format!("{} {} Street", rng.random_range(1..400), pick(rng, STREETS))),
        country: Some(pick(rng, COUNTRIES).to_string()),
        avatar: Some(format!("https://avatars.githubusercontent.com/u/{}", rng.random_range(1..100_000))),
        language: Some(pick(rng, &LANGUAGES).to_string()),
        city: Some(pick(rng, CITIES).to_string()),
        company: Some(pick(rng, COMPANIES).to_string()),
    };

    // spread creation dates over the past year
    let age = Duration::seconds(rng.random_range(0..365 * 24 * 3600));
    (user, now - age)
}

/// Insert `total` generated users in batches of `batch_size`.
///
/// Returns the number of rows inserted.
pub fn seed_users<R: Rng>(
    store: &mut UserStore,
    rng: &mut R,
    total: usize,
    batch_size: usize,
) -> Result<usize, StoreError> {
    let batch_size = batch_size.max(1);
    let offset = store.count()?;
    let now = Utc::now();
    let mut inserted = 0;

    let mut serial = offset;
    while serial < offset + total {
        let end = (serial + batch_size).min(offset + total);
        let batch: Vec<_> = (serial..end).map(|n| fake_user(rng, n, now)).collect();
        inserted += store.insert_batch(&batch)?;
        serial = end;
        info!("Inserted {} users...", inserted);
    }

    info!("Seeding completed: {} users", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fake_user_is_valid() {
        let mut rng = StdRng::seed_from_u64(1);
        let now = Utc::now();
        let (user, created) = fake_user(&mut rng, 0, now);
        assert!(user.validate().is_ok());
        assert!(LANGUAGES.contains(&user.language_or_default().as_str()));
        assert!(created <= now);
        assert!(now - created <= Duration::days(365));
    }

    #[test]
    fn test_seed_users_in_batches() {
        let mut store = UserStore::open_in_memory().unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let inserted = seed_users(&mut store, &mut rng, 25, 10).unwrap();
        assert_eq!(inserted, 25);
        assert_eq!(store.count().unwrap(), 25);

        // a second run keeps emails unique
        seed_users(&mut store, &mut rng, 5, 10).unwrap();
        assert_eq!(store.count().unwrap(), 30);
    }
}
