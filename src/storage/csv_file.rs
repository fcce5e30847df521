//! Append-only CSV backend.
//!
//! Layout: a `Name,Email,Country,City,Password` header followed by one row per
//! user. Every insert opens the file, appends one row, flushes and closes it.

use super::{StorageError, UserStorage};
use crate::users::User;
use async_trait::async_trait;
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::{debug, instrument};

pub const HEADER: [&str; 5] = ["Name", "Email", "Country", "City", "Password"];

#[derive(Debug)]
pub struct CsvFileStorage {
    path: PathBuf,
    // held by the blocking append itself, so a dropped request cannot release it early
    write_lock: Arc<Mutex<()>>,
}

impl CsvFileStorage {
    /// Open `path`, writing the header when the file is missing or empty.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        init_file(&path)?;

        Ok(Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }
}

fn init_file(path: &Path) -> Result<(), StorageError> {
    let is_empty = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => return Err(e.into()),
    };

    if is_empty {
        debug!(path = %path.display(), "writing csv header");
        append_record(path, &HEADER)?;
    }

    Ok(())
}

fn append_record(path: &Path, record: &[&str]) -> Result<(), StorageError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);
    writer.write_record(record)?;
    writer.flush()?;
    Ok(())
}

fn find_by_email(path: &Path, email: &str) -> Result<Option<User>, StorageError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    for (index, record) in reader.records().enumerate() {
        let record = record?;

        if record.get(1) != Some(email) {
            continue;
        }

        // name, email, country, city, password
        let field = |i: usize| {
            record.get(i).map(ToString::to_string).ok_or_else(|| {
                StorageError::Corrupt(format!("row {} has {} fields", index + 2, record.len()))
            })
        };

        return Ok(Some(User {
            name: field(0)?,
            email: field(1)?,
            country: field(2)?,
            city: field(3)?,
            password: field(4)?,
        }));
    }

    Ok(None)
}

async fn blocking<T, F>(f: F) -> Result<T, StorageError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
}

#[async_trait]
impl UserStorage for CsvFileStorage {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create_user(&self, user: &User) -> Result<(), StorageError> {
        let write_lock = Arc::clone(&self.write_lock);
        let path = self.path.clone();
        let row = [
            user.name.clone(),
            user.email.clone(),
            user.country.clone(),
            user.city.clone(),
            user.password.clone(),
        ];

        blocking(move || {
            let _guard = write_lock
                .lock()
                .map_err(|_| StorageError::Task("csv write lock poisoned".to_string()))?;
            let record: Vec<&str> = row.iter().map(String::as_str).collect();
            append_record(&path, &record)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let path = self.path.clone();
        let email = email.to_string();

        blocking(move || find_by_email(&path, &email)).await
    }

    async fn health(&self) -> Result<(), StorageError> {
        let path = self.path.clone();
        blocking(move || fs::metadata(path).map(|_| ()).map_err(StorageError::from)).await
    }

    fn kind(&self) -> &'static str {
        "csv"
    }
}
