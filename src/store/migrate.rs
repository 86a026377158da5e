use crate::constants::MIN_CATALOG_SIZE;
use crate::store::catalog::SEED_COURSES;
use crate::store::keys::SCHEMA_VERSION_KEY;
use crate::store::{Store, StoreError};

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_seed_course_catalog", m002_seed_course_catalog),
    ]
}

/// Applies every migration newer than the persisted schema version.
///
/// Each migration must be idempotent: a crash between running it and
/// persisting its version re-runs it on the next start. Versions only move
/// forward.
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    let all = migrations();

    for (index, (name, func)) in all.iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.meta.get(SCHEMA_VERSION_KEY.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().map_err(|_| StoreError::Corrupt {
                tree: crate::store::trees::META.to_string(),
                message: "schema version is not a u32".to_string(),
            })?;
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .meta
        .insert(SCHEMA_VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

fn m002_seed_course_catalog(store: &Store) -> Result<(), StoreError> {
    seed_course_catalog(store).map(|_| ())
}

/// Tops up the catalog with any missing built-in course while it holds
/// fewer than `MIN_CATALOG_SIZE` entries. Returns how many were added.
pub fn seed_course_catalog(store: &Store) -> Result<usize, StoreError> {
    if store.count_courses() >= MIN_CATALOG_SIZE {
        return Ok(0);
    }

    let mut added = 0;
    for (title, description, category) in SEED_COURSES {
        if store.has_course_title(title)? {
            continue;
        }
        match store.insert_course(title, description, category) {
            Ok(_) => added += 1,
            Err(StoreError::Conflict { .. }) => continue,
            Err(e) => return Err(e),
        }
    }

    tracing::info!(added, total = store.count_courses(), "Course catalog seeded");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn migration_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        run(&store).unwrap();
        let first = get_current_version(&store).unwrap();
        let courses = store.count_courses();
        run(&store).unwrap();
        let second = get_current_version(&store).unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 2);
        assert_eq!(courses, SEED_COURSES.len() as u64);
        assert_eq!(store.count_courses(), courses);
    }

    #[test]
    fn downgrade_is_rejected() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db2").to_str().unwrap()).unwrap();

        set_version(&store, 3).unwrap();
        let err = set_version(&store, 2).unwrap_err();
        assert!(matches!(err, StoreError::Migration { .. }));
    }

    #[test]
    fn seeding_skips_existing_titles() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db3").to_str().unwrap()).unwrap();

        let (title, description, category) = SEED_COURSES[0];
        store.insert_course(title, description, category).unwrap();

        let added = seed_course_catalog(&store).unwrap();
        assert_eq!(added, SEED_COURSES.len() - 1);
        assert_eq!(store.count_courses(), SEED_COURSES.len() as u64);
    }

    #[test]
    fn seeding_is_skipped_for_a_full_catalog() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db4").to_str().unwrap()).unwrap();

        for i in 0..MIN_CATALOG_SIZE {
            store.insert_course(&format!("Custom {i}"), "", "Other").unwrap();
        }
        assert_eq!(seed_course_catalog(&store).unwrap(), 0);
    }
}
