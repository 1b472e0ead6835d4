use linkleaf_core::db::migrations::latest_version;
use linkleaf_core::db::open_db_in_memory;
use linkleaf_core::{Person, PersonListQuery, PersonRepository, RepoError, SqlitePersonRepository};
use rusqlite::Connection;
use std::collections::HashSet;

#[test]
fn create_assigns_storage_id_and_get_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut person = Person::new("Ada Lovelace");
    let id = repo.create_person(&mut person).unwrap();

    assert_eq!(person.id(), Some(id));
    let loaded = repo.get_person(id).unwrap().unwrap();
    assert_eq!(loaded, person);
}

#[test]
fn null_name_is_persisted_as_null() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut person = Person::default();
    let id = repo.create_person(&mut person).unwrap();

    let loaded = repo.get_person(id).unwrap().unwrap();
    assert_eq!(loaded.name(), None);
}

#[test]
fn distinct_persons_never_share_an_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut ids = HashSet::new();
    for _ in 0..20 {
        let mut person = Person::new("same name");
        assert!(ids.insert(repo.create_person(&mut person).unwrap()));
    }
    assert_eq!(repo.count_persons().unwrap(), 20);
}

#[test]
fn ids_of_deleted_rows_are_not_reused() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut first = Person::new("first");
    let mut second = Person::new("second");
    repo.create_person(&mut first).unwrap();
    let second_id = repo.create_person(&mut second).unwrap();
    repo.delete_person(second_id).unwrap();

    let mut third = Person::new("third");
    let third_id = repo.create_person(&mut third).unwrap();
    assert!(third_id > second_id);
}

#[test]
fn create_rejects_already_persisted_person() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut person = Person::new("twice");
    let id = repo.create_person(&mut person).unwrap();

    let err = repo.create_person(&mut person).unwrap_err();
    assert!(matches!(err, RepoError::AlreadyPersisted(existing) if existing == id));
    assert_eq!(repo.count_persons().unwrap(), 1);
}

#[test]
fn update_changes_name_and_keeps_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut person = Person::new("draft");
    let id = repo.create_person(&mut person).unwrap();

    person.set_name(Some("final".to_string()));
    repo.update_person(&person).unwrap();

    let loaded = repo.get_person(id).unwrap().unwrap();
    assert_eq!(loaded.id(), Some(id));
    assert_eq!(loaded.name(), Some("final"));

    person.set_name(None);
    repo.update_person(&person).unwrap();
    assert_eq!(repo.get_person(id).unwrap().unwrap().name(), None);
}

#[test]
fn update_requires_identity_and_existing_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let err = repo.update_person(&Person::new("never saved")).unwrap_err();
    assert!(matches!(err, RepoError::MissingIdentity));

    let err = repo
        .update_person(&Person::with_id(999, Some("ghost".to_string())))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(999)));
}

#[test]
fn delete_removes_row_and_reports_missing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut person = Person::new("temporary");
    let id = repo.create_person(&mut person).unwrap();

    repo.delete_person(id).unwrap();
    assert!(repo.get_person(id).unwrap().is_none());

    let err = repo.delete_person(id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));
}

#[test]
fn list_is_ordered_by_id_and_paginates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::try_new(&conn).unwrap();

    let mut ids = Vec::new();
    for name in ["c", "a", "b", "d"] {
        let mut person = Person::new(name);
        ids.push(repo.create_person(&mut person).unwrap());
    }

    let all = repo.list_persons(&PersonListQuery::default()).unwrap();
    let listed = all.iter().filter_map(Person::id).collect::<Vec<_>>();
    assert_eq!(listed, ids);

    let page = repo
        .list_persons(&PersonListQuery {
            limit: Some(2),
            offset: 1,
        })
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].name(), Some("a"));
    assert_eq!(page[1].name(), Some("b"));

    let tail = repo
        .list_persons(&PersonListQuery {
            limit: None,
            offset: 3,
        })
        .unwrap();
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].name(), Some("d"));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqlitePersonRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_person_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqlitePersonRepository::try_new(&conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("table_1"))));
}

#[test]
fn repository_rejects_table_missing_name_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE table_1 (id INTEGER PRIMARY KEY AUTOINCREMENT);")
        .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqlitePersonRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "table_1",
            column: "name"
        })
    ));
}

#[test]
fn repository_rejects_table_with_non_integer_key() {
    for ddl in [
        "CREATE TABLE table_1 (id TEXT, name TEXT);",
        "CREATE TABLE table_1 (id TEXT PRIMARY KEY, name TEXT);",
        "CREATE TABLE table_1 (id INTEGER, name TEXT);",
    ] {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(ddl).unwrap();
        conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
            .unwrap();

        let result = SqlitePersonRepository::try_new(&conn);
        match result {
            Err(RepoError::ColumnMismatch {
                table: "table_1",
                column: "id",
                expected,
                ..
            }) => assert_eq!(expected, "INTEGER PRIMARY KEY"),
            Err(other) => panic!("unexpected error for `{ddl}`: {other}"),
            Ok(_) => panic!("table `{ddl}` should be rejected"),
        }
    }
}

#[test]
fn repository_rejects_name_column_with_wrong_type() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE table_1 (id INTEGER PRIMARY KEY AUTOINCREMENT, name BLOB);")
        .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqlitePersonRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::ColumnMismatch {
            table: "table_1",
            column: "name",
            ..
        })
    ));
}
